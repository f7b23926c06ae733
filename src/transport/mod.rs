//! Transport identity and the live-transport directory.
//!
//! A `Transport` describes one HTTP listener the host is currently serving
//! on. The directory tracks which listeners are live so the connector can
//! bind newly registered apps on each of them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one live HTTP listener.
///
/// Equality and hashing are keyed on `id` alone: two transports with the
/// same id denote the same listener regardless of the remaining fields.
/// Transports are immutable once constructed; a reconfigured listener is
/// modeled as remove-then-add.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    id: String,
    scheme: String,
    host: String,
    port: u16,
}

impl Transport {
    /// Create a new transport description.
    pub fn new(
        id: impl Into<String>,
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            id: id.into(),
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// Stable id of the listener, unique within the directory.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether this listener speaks HTTPS.
    pub fn is_secured(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https")
    }

    /// Full URL of an app context path served through this transport.
    pub fn app_url(&self, context_path: &str) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, context_path)
    }
}

impl PartialEq for Transport {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transport {}

impl std::hash::Hash for Transport {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}://{}:{})", self.id, self.scheme, self.host, self.port)
    }
}

/// Deduplicated set of currently live transports, keyed by id.
#[derive(Debug, Default)]
pub struct TransportDirectory {
    transports: HashMap<String, Transport>,
}

impl TransportDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transport. Re-adding an id already present is a no-op and
    /// keeps the existing entry. Returns whether the transport was new.
    pub fn add(&mut self, transport: Transport) -> bool {
        if self.transports.contains_key(transport.id()) {
            return false;
        }
        self.transports.insert(transport.id().to_string(), transport);
        true
    }

    /// Remove the transport with the given id. Removing an unknown id is a
    /// no-op. Returns whether a transport was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.transports.remove(id).is_some()
    }

    /// Whether a transport with the given id is currently live.
    pub fn contains(&self, id: &str) -> bool {
        self.transports.contains_key(id)
    }

    /// Number of live transports.
    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// Point-in-time copy of the live set. The returned vector does not
    /// reflect mutations made after this call returns.
    pub fn snapshot(&self) -> Vec<Transport> {
        self.transports.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_8080() -> Transport {
        Transport::new("http-8080", "http", "localhost", 8080)
    }

    #[test]
    fn test_equality_is_keyed_on_id() {
        let a = Transport::new("listener-1", "http", "localhost", 8080);
        let b = Transport::new("listener-1", "https", "example.com", 8443);
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_secured_ignores_case() {
        assert!(Transport::new("t", "HTTPS", "localhost", 8443).is_secured());
        assert!(Transport::new("t", "https", "localhost", 8443).is_secured());
        assert!(!http_8080().is_secured());
    }

    #[test]
    fn test_app_url() {
        assert_eq!(
            http_8080().app_url("/shop"),
            "http://localhost:8080/shop"
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut directory = TransportDirectory::new();
        assert!(directory.add(http_8080()));
        assert!(!directory.add(Transport::new("http-8080", "http", "0.0.0.0", 8080)));
        assert_eq!(directory.len(), 1);
        // the first entry wins
        assert_eq!(directory.snapshot()[0].host(), "localhost");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut directory = TransportDirectory::new();
        directory.add(http_8080());
        assert!(!directory.remove("never-seen"));
        assert_eq!(directory.len(), 1);
        assert!(directory.remove("http-8080"));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut directory = TransportDirectory::new();
        directory.add(http_8080());

        let snapshot = directory.snapshot();
        directory.add(Transport::new("https-8443", "https", "localhost", 8443));
        directory.remove("http-8080");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), "http-8080");
    }
}
