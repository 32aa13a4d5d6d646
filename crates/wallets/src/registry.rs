//! Default output tokens per chain.

use alloy_primitives::{Address, ChainId, address};
use std::collections::BTreeMap;
use swap_config::SwapConfig;

/// The token pre-selected as the "buy" side of a swap on each supported chain.
pub const DEFAULT_OUTPUT_TOKENS: [(ChainId, Address); 12] = [
    // Ethereum
    (1, address!("0xdeFA4e8a7bcBA345F687a2f1456F5Edd9CE97202")),
    // Polygon
    (137, address!("0x4BFcE5A1aCC3B847AFa9579bA91DA33b08e66fb7")),
    // BNB Chain
    (56, address!("0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56")),
    // Avalanche
    (43114, address!("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E")),
    // Fantom
    (250, address!("0x049d68029688eAbF473097a2fC38ef61633A3C7A")),
    // Cronos
    (25, address!("0x66e428c3f67a68878562e79A0234c1F83c208770")),
    // Arbitrum
    (42161, address!("0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9")),
    // BitTorrent
    (199, address!("0x9B5F27f6ea9bBD753ce3793a07CbA3C74644330d")),
    // Velas
    (106, address!("0x01445C31581c354b7338AC35693AB2001B50b9aE")),
    // Aurora
    (1313161554, address!("0x4988a896b1227218e4a686fde5eabdcabd91571f")),
    // Oasis Emerald
    (42262, address!("0x6Cb9750a92643382e020eA9a170AbB83Df05F30B")),
    // Optimism
    (10, address!("0x94b008aA00579c1307B0EF2c499aD98a8ce58e58")),
];

/// Immutable lookup table from chain id to default output token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainRegistry {
    tokens: BTreeMap<ChainId, Address>,
}

impl ChainRegistry {
    /// Creates a registry holding exactly the given entries.
    pub fn new(tokens: impl IntoIterator<Item = (ChainId, Address)>) -> Self {
        Self { tokens: tokens.into_iter().collect() }
    }

    /// Creates the default registry extended with the config's `default_tokens`.
    ///
    /// Configured entries replace built-in ones for the same chain.
    pub fn from_config(config: &SwapConfig) -> Self {
        let mut registry = Self::default();
        for entry in &config.default_tokens {
            if let Some(previous) = registry.tokens.insert(entry.chain_id, entry.address) {
                debug!(
                    chain_id = entry.chain_id,
                    %previous,
                    token = %entry.address,
                    "overriding default output token"
                );
            }
        }
        registry
    }

    /// Returns the default output token for `chain_id`, if the chain is known.
    pub fn lookup(&self, chain_id: ChainId) -> Option<Address> {
        self.tokens.get(&chain_id).copied()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_TOKENS)
    }
}
