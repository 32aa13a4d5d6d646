//! # swap-wallets
//!
//! Wallet session lifecycle for the swap page.
//!
//! The [`SessionController`] connects and disconnects wallets through a [`WalletConnector`],
//! resolves the active wallet's chain id, remembers connected wallets across sessions through a
//! [`KeyValueStore`] and derives the props of the embedded swap widget.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod connector;
pub use connector::{ConnectOptions, NetworkProvider, WalletConnector, WalletEvent, WalletHandle};
#[cfg(feature = "alloy")]
pub use connector::AlloyNetwork;

pub mod error;
pub use error::{ConnectorError, ProviderError, SessionError, StorageError};

pub mod registry;
pub use registry::{ChainRegistry, DEFAULT_OUTPUT_TOKENS};

mod session;
pub use session::{
    Listener, SessionController, SessionControllerBuilder, SessionSnapshot, SessionStatus,
    SubscriptionId,
};

pub mod storage;
pub use storage::{FileStore, KeyValueStore, LabelStore, MemoryStore};

mod widget;
pub use widget::{ConnectAction, WidgetProps};

#[cfg(test)]
mod test_utils;
