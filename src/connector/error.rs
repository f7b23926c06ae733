//! Connector Errors
//!
//! Error types for app registration and binding-port operations.

use thiserror::Error;

/// Errors surfaced by the connector's app-facing operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// `unregister_app` was called for a name with no recorded bindings.
    /// The app may never have been registered or may already be torn down;
    /// the connector cannot tell which.
    #[error("cannot unregister web app '{app}': not registered or already unregistered")]
    NotRegistered { app: String },

    /// `register_app` was called with an empty app name.
    #[error("app name must not be empty")]
    InvalidAppName,
}

/// Errors returned by the binding port when a bind attempt fails.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("transport '{transport_id}' is unknown to the host")]
    UnknownTransport { transport_id: String },

    #[error("context path '{context_path}' is already bound on transport '{transport_id}'")]
    PathAlreadyBound {
        transport_id: String,
        context_path: String,
    },
}

/// Errors returned by the binding port when releasing a binding fails.
#[derive(Debug, Error)]
pub enum UnbindError {
    /// The handle no longer matches a live binding, e.g. its transport has
    /// already been torn down. Non-fatal during best-effort cleanup.
    #[error("binding for '{context_path}' on transport '{transport_id}' is already released")]
    StaleHandle {
        transport_id: String,
        context_path: String,
    },
}
