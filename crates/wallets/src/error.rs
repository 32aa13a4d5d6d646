use std::{io, path::PathBuf};

/// Errors raised by durable key/value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access wallet storage at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("could not find a data directory for wallet storage")]
    NoDataDir,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Errors raised by a wallet's provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider is not connected to a network")]
    Disconnected,
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

/// Errors raised by the wallet-connection library.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("wallet `{0}` is not available")]
    Unavailable(String),
    #[error("wallet `{label}` rejected the request: {reason}")]
    Rejected { label: String, reason: String },
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

/// Errors surfaced by [`SessionController`](crate::SessionController) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
