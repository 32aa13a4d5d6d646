//! # swap-config
//!
//! Configuration for the swap page's wallet session.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. the built-in defaults ([`SwapConfig::default`]),
//! 2. a TOML file, `swap.toml` in the working directory or the file named by `SWAP_CONFIG`,
//! 3. environment variables prefixed with `SWAP_`, e.g. `SWAP_DEFAULT_CHAIN_ID=1`.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, ChainId};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod error;
pub use error::{ExtractConfigError, FAILED_TO_EXTRACT_CONFIG_MSG};

mod network;
pub use network::{AppMetadata, NetworkConfig, RecommendedWallet, WalletLibraryOptions};

/// A default output token configured for a chain, overriding or extending the built-in table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub chain_id: ChainId,
    pub address: Address,
}

/// Wallet session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// The storage key the connected wallet labels are persisted under.
    pub storage_key: String,
    /// The chain id assumed until the active provider reports its network.
    pub default_chain_id: ChainId,
    /// Directory for durable storage. Defaults to [`SwapConfig::default_data_dir`].
    pub data_dir: Option<PathBuf>,
    /// Client identifier passed to the embedded swap widget.
    pub widget_client: String,
    /// Additional or replacement default output tokens.
    pub default_tokens: Vec<TokenEntry>,
    /// Dapp metadata shown by the wallet selection modal.
    pub app: AppMetadata,
    /// Networks registered with the wallet-connection library.
    pub chains: Vec<NetworkConfig>,
}

impl SwapConfig {
    /// The default config file name.
    pub const FILE_NAME: &'static str = "swap.toml";

    /// Environment variable naming an alternative config file.
    pub const CONFIG_PATH_ENV: &'static str = "SWAP_CONFIG";

    /// Prefix of environment variables that override config values.
    pub const ENV_PREFIX: &'static str = "SWAP_";

    /// The storage key deployed pages already write, so returning users are restored.
    pub const DEFAULT_STORAGE_KEY: &'static str = "connectedWallets";

    /// Polygon.
    pub const DEFAULT_CHAIN_ID: ChainId = 137;

    /// The file inside [`data_dir`](Self::data_dir) holding persisted key/value pairs.
    pub const STORAGE_FILE_NAME: &'static str = "storage.json";

    /// Loads the config from all sources.
    ///
    /// See [`figment`](Self::figment) for the order of precedence.
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::from_provider(Self::figment())
    }

    /// Extracts a config from `provider`.
    pub fn from_provider<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        let figment = Figment::from(provider);
        let config: Self = figment.extract().map_err(ExtractConfigError::new)?;
        trace!(
            storage_key = %config.storage_key,
            default_chain_id = config.default_chain_id,
            "loaded swap config"
        );
        Ok(config)
    }

    /// Returns the default figment: defaults, then the TOML file, then `SWAP_` env vars.
    pub fn figment() -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(Env::var_or(Self::CONFIG_PATH_ENV, Self::FILE_NAME)))
            .merge(Env::prefixed(Self::ENV_PREFIX))
    }

    /// Returns the directory durable storage lives in.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Self::default_data_dir)
    }

    /// Returns the path of the key/value storage file.
    pub fn storage_file(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join(Self::STORAGE_FILE_NAME))
    }

    /// Returns the platform data directory for the swap page: `<data dir>/swap`.
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("swap"))
    }

    /// Returns the options the wallet-connection library is initialized with.
    pub fn wallet_library_options(&self) -> WalletLibraryOptions {
        WalletLibraryOptions { app: self.app.clone(), chains: self.chains.clone() }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            storage_key: Self::DEFAULT_STORAGE_KEY.to_string(),
            default_chain_id: Self::DEFAULT_CHAIN_ID,
            data_dir: None,
            widget_client: "JP3Gvault".to_string(),
            default_tokens: Vec::new(),
            app: AppMetadata::default(),
            chains: NetworkConfig::defaults(),
        }
    }
}

impl Provider for SwapConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Swap Config")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
