use crate::widget::ConnectAction;
use alloy_primitives::{Address, ChainId};
use serde::Serialize;
use std::fmt;

/// Where the session is in its connection lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No wallet is connected.
    #[default]
    Disconnected,
    /// A wallet is active but its chain id has not been resolved yet.
    Connecting,
    /// A wallet is active on the given chain.
    Connected(ChainId),
}

impl SessionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected(chain_id) => write!(f, "connected to chain {chain_id}"),
        }
    }
}

/// A point-in-time view of the session, handed to subscribers and the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    /// The last resolved chain id, or the default one.
    pub chain_id: ChainId,
    /// Human readable name of [`chain_id`](Self::chain_id), if known.
    pub network: Option<String>,
    /// Label of the active wallet.
    pub active_wallet: Option<String>,
    /// Labels of all connected wallets, in connection order.
    pub wallets: Vec<String>,
    /// Default output token for [`chain_id`](Self::chain_id).
    pub default_token_out: Option<Address>,
}

impl SessionSnapshot {
    /// The action the connect button performs in this state.
    pub fn connect_action(&self) -> ConnectAction {
        if self.active_wallet.is_some() { ConnectAction::Disconnect } else { ConnectAction::Connect }
    }
}
