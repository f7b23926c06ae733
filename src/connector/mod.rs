//! Web-app HTTP connector.
//!
//! Keeps the many-to-many binding between deployed web apps and live HTTP
//! transports: every app is bound on each transport that was live at the
//! moment it was registered, and bindings are released when the app is
//! unregistered or when their transport goes away.

pub mod error;
pub mod port;
pub mod registry;

pub use error::{BindError, ConnectorError, UnbindError};
pub use port::{BindingPort, RegistrationHandle};
pub use registry::AppRegistrations;

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::http::AppHandler;
use crate::transport::{Transport, TransportDirectory};

/// Registry state guarded by the connector's single lock.
#[derive(Debug, Default)]
struct ConnectorState {
    transports: TransportDirectory,
    registrations: AppRegistrations,
}

/// Binds registered web apps onto every live HTTP transport.
///
/// All registry state lives behind one mutex and every operation is a
/// short, bounded mutation; the lock is held across the binding-port calls
/// an operation drives, so no operation ever observes a partially updated
/// directory or races a removal sweep for the same app. The connector is
/// invoked on deploy/undeploy and listener lifecycle events only, never on
/// the request path.
pub struct HttpConnector {
    binding_port: Arc<dyn BindingPort>,
    state: Mutex<ConnectorState>,
}

impl HttpConnector {
    /// Create a connector that opens and releases bindings through the
    /// given host port.
    pub fn new(binding_port: Arc<dyn BindingPort>) -> Self {
        Self {
            binding_port,
            state: Mutex::new(ConnectorState::default()),
        }
    }

    /// Bind `handler` at `context_path` on every transport currently live.
    ///
    /// The set of transports is snapshotted here: listeners added later do
    /// not retroactively pick up the app. Registering the same name again
    /// is additive and creates a second, independent set of bindings. A
    /// bind failure on one transport is logged and the remaining transports
    /// are still attempted; whatever succeeded is recorded. With no live
    /// transports the app ends up with zero bindings, which is not an
    /// error.
    pub fn register_app(
        &self,
        app_name: &str,
        context_path: &str,
        handler: Arc<dyn AppHandler>,
    ) -> Result<(), ConnectorError> {
        if app_name.is_empty() {
            return Err(ConnectorError::InvalidAppName);
        }

        let mut state = self.state.lock().unwrap();
        let snapshot = state.transports.snapshot();
        if snapshot.is_empty() {
            debug!(
                "No live transports; web app '{}' registered without bindings.",
                app_name
            );
        }

        for transport in snapshot {
            match self
                .binding_port
                .bind(transport.id(), context_path, Arc::clone(&handler))
            {
                Ok(handle) => {
                    state.registrations.add(app_name, handle);
                    info!(
                        "Web app '{}' is available at '{}'.",
                        app_name,
                        transport.app_url(context_path)
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to bind web app '{}' on transport '{}': {}",
                        app_name,
                        transport.id(),
                        e
                    );
                }
            }
        }
        Ok(())
    }

    /// Release every binding recorded for `app_name` and forget the app.
    ///
    /// Releases are best-effort: a stale handle is logged and the remaining
    /// handles are still released. Fails only when the name has no recorded
    /// bindings at all.
    pub fn unregister_app(&self, app_name: &str) -> Result<(), ConnectorError> {
        let mut state = self.state.lock().unwrap();
        let handles = state.registrations.take(app_name);
        if handles.is_empty() {
            return Err(ConnectorError::NotRegistered {
                app: app_name.to_string(),
            });
        }

        for handle in handles {
            self.release(handle);
        }
        info!("Web app '{}' undeployed.", app_name);
        Ok(())
    }

    /// Unregister every app currently in the table, in unspecified order.
    /// Used for full shutdown; the table is empty afterwards.
    pub fn unregister_all_apps(&self) {
        let mut state = self.state.lock().unwrap();
        for app_name in state.registrations.app_names() {
            for handle in state.registrations.take(&app_name) {
                self.release(handle);
            }
            info!("Web app '{}' undeployed.", app_name);
        }
    }

    /// A listener came up. Already-registered apps are not rebound onto it.
    pub fn on_transport_added(&self, transport: Transport) {
        let mut state = self.state.lock().unwrap();
        let description = transport.to_string();
        if state.transports.add(transport) {
            debug!("HTTP transport {} registered with the connector.", description);
        }
    }

    /// A listener went away: forget it and release every binding that was
    /// opened on it, across all apps. Never fails outward; release errors
    /// are logged and absorbed since no caller can react to them.
    pub fn on_transport_removed(&self, transport: &Transport) {
        let mut state = self.state.lock().unwrap();
        state.transports.remove(transport.id());

        let purged = state.registrations.take_for_transport(transport.id());
        let purged_count = purged.len();
        for handle in purged {
            self.release(handle);
        }
        debug!(
            "HTTP transport {} unregistered from the connector; {} binding(s) released.",
            transport, purged_count
        );
    }

    /// Point-in-time copy of the transports currently live.
    pub fn live_transports(&self) -> Vec<Transport> {
        self.state.lock().unwrap().transports.snapshot()
    }

    /// Number of bindings currently recorded for `app_name`.
    pub fn binding_count(&self, app_name: &str) -> usize {
        self.state.lock().unwrap().registrations.handle_count(app_name)
    }

    /// Names of all apps with at least one live binding.
    pub fn registered_apps(&self) -> Vec<String> {
        self.state.lock().unwrap().registrations.app_names()
    }

    fn release(&self, handle: RegistrationHandle) {
        if let Err(e) = self.binding_port.unbind(handle) {
            warn!("Failed to release binding: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    /// In-memory binding port tracking live and released bindings.
    #[derive(Default)]
    struct FakePort {
        live: StdMutex<HashSet<uuid::Uuid>>,
        released: StdMutex<Vec<(String, String)>>,
    }

    impl BindingPort for FakePort {
        fn bind(
            &self,
            transport_id: &str,
            context_path: &str,
            _handler: Arc<dyn AppHandler>,
        ) -> Result<RegistrationHandle, BindError> {
            let handle = RegistrationHandle::new(transport_id, context_path);
            self.live.lock().unwrap().insert(handle.id());
            Ok(handle)
        }

        fn unbind(&self, handle: RegistrationHandle) -> Result<(), UnbindError> {
            if !self.live.lock().unwrap().remove(&handle.id()) {
                return Err(UnbindError::StaleHandle {
                    transport_id: handle.transport_id().to_string(),
                    context_path: handle.context_path().to_string(),
                });
            }
            self.released.lock().unwrap().push((
                handle.transport_id().to_string(),
                handle.context_path().to_string(),
            ));
            Ok(())
        }
    }

    fn noop_handler() -> Arc<dyn AppHandler> {
        Arc::new(|_request: HttpRequest| HttpResponse::ok("ok"))
    }

    fn connector() -> (Arc<FakePort>, HttpConnector) {
        let port = Arc::new(FakePort::default());
        let connector = HttpConnector::new(Arc::clone(&port) as Arc<dyn BindingPort>);
        (port, connector)
    }

    #[test]
    fn test_register_binds_on_every_live_transport() {
        let (_port, connector) = connector();
        connector.on_transport_added(Transport::new("http-8080", "http", "localhost", 8080));
        connector.on_transport_added(Transport::new("https-8443", "https", "localhost", 8443));

        connector
            .register_app("shop", "/shop", noop_handler())
            .unwrap();
        assert_eq!(connector.binding_count("shop"), 2);
    }

    #[test]
    fn test_register_with_empty_name_fails() {
        let (_port, connector) = connector();
        let err = connector
            .register_app("", "/shop", noop_handler())
            .unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidAppName));
    }

    #[test]
    fn test_register_without_transports_records_nothing() {
        let (_port, connector) = connector();
        connector
            .register_app("shop", "/shop", noop_handler())
            .unwrap();
        assert_eq!(connector.binding_count("shop"), 0);
        // zero bindings means the app is not considered registered
        let err = connector.unregister_app("shop").unwrap_err();
        assert!(matches!(err, ConnectorError::NotRegistered { .. }));
    }

    #[test]
    fn test_unregister_releases_everything() {
        let (port, connector) = connector();
        connector.on_transport_added(Transport::new("http-8080", "http", "localhost", 8080));
        connector
            .register_app("shop", "/shop", noop_handler())
            .unwrap();

        connector.unregister_app("shop").unwrap();
        assert_eq!(connector.binding_count("shop"), 0);
        assert_eq!(port.released.lock().unwrap().len(), 1);
        assert!(port.live.lock().unwrap().is_empty());
    }

    #[test]
    fn test_transport_removal_purges_only_its_bindings() {
        let (port, connector) = connector();
        let t1 = Transport::new("http-8080", "http", "localhost", 8080);
        let t2 = Transport::new("https-8443", "https", "localhost", 8443);
        connector.on_transport_added(t1.clone());
        connector.on_transport_added(t2);

        connector
            .register_app("shop", "/shop", noop_handler())
            .unwrap();
        connector.on_transport_removed(&t1);

        assert_eq!(connector.binding_count("shop"), 1);
        assert_eq!(connector.live_transports().len(), 1);
        let released = port.released.lock().unwrap();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].0, "http-8080");
    }
}
