//! Seams to the wallet-connection library and the providers it hands out.

use crate::error::{ConnectorError, ProviderError};
use alloy_primitives::ChainId;
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tokio::sync::broadcast;

/// A chain-aware provider exposed by a connected wallet.
#[async_trait]
pub trait NetworkProvider: Send + Sync + fmt::Debug {
    /// Queries the chain id of the network the provider currently points at.
    async fn chain_id(&self) -> Result<ChainId, ProviderError>;
}

/// A connected wallet, as reported by the wallet-connection library.
///
/// Cloning is cheap; all clones share the same provider.
#[derive(Clone)]
pub struct WalletHandle {
    label: String,
    provider: Arc<dyn NetworkProvider>,
}

impl WalletHandle {
    pub fn new(label: impl Into<String>, provider: Arc<dyn NetworkProvider>) -> Self {
        Self { label: label.into(), provider }
    }

    /// The stable, human readable name of the wallet, e.g. `MetaMask`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn provider(&self) -> &Arc<dyn NetworkProvider> {
        &self.provider
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Options for [`WalletConnector::connect`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Connect this wallet directly instead of showing the selection flow.
    pub auto_select: Option<String>,
    /// Never show a modal, fail instead.
    pub disable_modals: bool,
}

impl ConnectOptions {
    /// Options for silently reconnecting the wallet with the given label.
    pub fn auto_select(label: impl Into<String>) -> Self {
        Self { auto_select: Some(label.into()), disable_modals: true }
    }

    pub fn is_silent(&self) -> bool {
        self.auto_select.is_some() && self.disable_modals
    }
}

/// Notifications pushed by the wallet-connection library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of connected wallets changed; re-read it with
    /// [`WalletConnector::connected_wallets`].
    WalletsChanged,
    /// The provider of the wallet with this label switched networks.
    NetworkChanged { label: String },
}

/// The wallet-connection library.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Opens the wallet selection flow, or connects `options.auto_select` directly.
    ///
    /// Returns `Ok(None)` if the user cancelled or the requested wallet is unavailable.
    async fn connect(&self, options: ConnectOptions) -> Result<Option<WalletHandle>, ConnectorError>;

    /// Tears down the connection to the wallet with the given label.
    async fn disconnect(&self, label: &str) -> Result<(), ConnectorError>;

    /// The currently connected wallets, in connection order.
    fn connected_wallets(&self) -> Vec<WalletHandle>;

    /// Subscribes to library events.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Adapts an alloy [`Provider`](alloy_provider::Provider) to a [`NetworkProvider`].
#[cfg(feature = "alloy")]
#[derive(Clone)]
pub struct AlloyNetwork<P>(pub P);

#[cfg(feature = "alloy")]
impl<P> fmt::Debug for AlloyNetwork<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AlloyNetwork").finish_non_exhaustive()
    }
}

#[cfg(feature = "alloy")]
#[async_trait]
impl<P> NetworkProvider for AlloyNetwork<P>
where
    P: alloy_provider::Provider,
{
    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        self.0.get_chain_id().await.map_err(|err| ProviderError::Other(eyre::Report::new(err)))
    }
}
