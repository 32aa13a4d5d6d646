//! Options handed to the wallet-connection library when it is initialized.

use alloy_primitives::ChainId;
use serde::{Deserialize, Serialize};

/// A network the wallet-connection library offers in its chain selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The chain id of the network.
    pub id: ChainId,
    /// Symbol of the native token, e.g. `ETH`.
    pub token: String,
    /// Human readable name shown in the wallet UI.
    pub label: String,
    /// JSON-RPC endpoint used for reads before a wallet is connected.
    pub rpc_url: String,
}

impl NetworkConfig {
    /// Returns the chain id in the `0x`-prefixed hex form wallet libraries expect, e.g. `0x89`.
    pub fn hex_id(&self) -> String {
        format!("{:#x}", self.id)
    }

    /// The networks the swap page registers by default.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: 1,
                token: "ETH".to_string(),
                label: "Ethereum Mainnet".to_string(),
                rpc_url: "https://ethereum.kyberengineering.io".to_string(),
            },
            Self {
                id: 137,
                token: "MATIC".to_string(),
                label: "Polygon".to_string(),
                rpc_url: "https://polygon.kyberengineering.io".to_string(),
            },
        ]
    }
}

/// A wallet suggested to users that have no injected wallet installed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedWallet {
    pub name: String,
    pub url: String,
}

/// Metadata about the dapp displayed by the wallet selection modal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub icon: String,
    pub logo: String,
    pub description: String,
    #[serde(default)]
    pub recommended_injected_wallets: Vec<RecommendedWallet>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "JP3G Swap".to_string(),
            icon: "/logo.png".to_string(),
            logo: "/logo.png".to_string(),
            description: "JP3G Swap".to_string(),
            recommended_injected_wallets: vec![RecommendedWallet {
                name: "MetaMask".to_string(),
                url: "https://metamask.io".to_string(),
            }],
        }
    }
}

/// Everything the wallet-connection library needs at initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletLibraryOptions {
    pub app: AppMetadata,
    pub chains: Vec<NetworkConfig>,
}

impl WalletLibraryOptions {
    /// Returns the registered network with the given chain id, if any.
    pub fn network(&self, chain_id: ChainId) -> Option<&NetworkConfig> {
        self.chains.iter().find(|network| network.id == chain_id)
    }
}
