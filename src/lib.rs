//! # appdock
//!
//! Multi-listener HTTP hosting for deployed web applications.
//!
//! appdock tracks the dynamic set of live HTTP listeners ("transports") and
//! the dynamic set of deployed apps, and keeps the many-to-many binding
//! between them correct while both sets change concurrently: every app is
//! bound on each transport live at the moment of its registration, and
//! bindings are released exactly once when the app is undeployed or its
//! listener goes away.

pub mod config;
pub mod connector;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
pub mod transport;

pub use connector::HttpConnector;
pub use error::{Error, Result};
pub use transport::Transport;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ListenerNotRunning("http-8080".to_string());
        assert!(err.to_string().contains("http-8080"));
    }
}
