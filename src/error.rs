//! Error types for the appdock host.

use thiserror::Error;

/// Result type alias for host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the host binary and listener management
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, e.g. a listener failing to bind its address
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// App registration error from the connector
    #[error("Connector error: {0}")]
    Connector(#[from] crate::connector::ConnectorError),

    /// A listener with this id is already running
    #[error("listener '{0}' is already running")]
    ListenerAlreadyRunning(String),

    /// No running listener has this id
    #[error("listener '{0}' is not running")]
    ListenerNotRunning(String),
}
