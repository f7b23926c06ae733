//! Route table and the binding port the host exposes over it.
//!
//! The table records, per transport, the context paths currently bound and
//! the handler behind each. Listener tasks resolve incoming requests
//! against it; the connector mutates it through [`RouteBindingPort`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::connector::{BindError, BindingPort, RegistrationHandle, UnbindError};
use crate::http::AppHandler;

struct RouteEntry {
    binding_id: Uuid,
    handler: Arc<dyn AppHandler>,
}

/// Per-transport map of bound context paths.
///
/// A transport appears in the table while its listener is running; binds
/// against ids the table has never seen are refused.
#[derive(Default)]
pub struct RouteTable {
    routes: RwLock<HashMap<String, HashMap<String, RouteEntry>>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `transport_id` bindable. Called when its listener starts.
    pub fn insert_transport(&self, transport_id: &str) {
        self.routes
            .write()
            .unwrap()
            .entry(transport_id.to_string())
            .or_default();
    }

    /// Drop `transport_id` and everything still bound on it.
    pub fn remove_transport(&self, transport_id: &str) {
        self.routes.write().unwrap().remove(transport_id);
    }

    /// Resolve `path` on `transport_id` to the handler bound at the longest
    /// matching context path, if any.
    pub fn resolve(&self, transport_id: &str, path: &str) -> Option<Arc<dyn AppHandler>> {
        let routes = self.routes.read().unwrap();
        let bindings = routes.get(transport_id)?;
        bindings
            .iter()
            .filter(|(context_path, _)| context_matches(context_path, path))
            .max_by_key(|(context_path, _)| context_path.len())
            .map(|(_, entry)| Arc::clone(&entry.handler))
    }

    /// Number of paths currently bound on `transport_id`.
    pub fn binding_count(&self, transport_id: &str) -> usize {
        self.routes
            .read()
            .unwrap()
            .get(transport_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

/// Whether `path` falls under `context_path`.
///
/// "/shop" matches "/shop" and "/shop/cart" but not "/shopping"; "/"
/// matches everything.
fn context_matches(context_path: &str, path: &str) -> bool {
    if context_path == "/" {
        return true;
    }
    match path.strip_prefix(context_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Binding port backed by a [`RouteTable`].
pub struct RouteBindingPort {
    table: Arc<RouteTable>,
}

impl RouteBindingPort {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }
}

impl BindingPort for RouteBindingPort {
    fn bind(
        &self,
        transport_id: &str,
        context_path: &str,
        handler: Arc<dyn AppHandler>,
    ) -> Result<RegistrationHandle, BindError> {
        let mut routes = self.table.routes.write().unwrap();
        let bindings = routes
            .get_mut(transport_id)
            .ok_or_else(|| BindError::UnknownTransport {
                transport_id: transport_id.to_string(),
            })?;
        if bindings.contains_key(context_path) {
            return Err(BindError::PathAlreadyBound {
                transport_id: transport_id.to_string(),
                context_path: context_path.to_string(),
            });
        }

        let handle = RegistrationHandle::new(transport_id, context_path);
        bindings.insert(
            context_path.to_string(),
            RouteEntry {
                binding_id: handle.id(),
                handler,
            },
        );
        debug!(
            "Bound '{}' on transport '{}'.",
            context_path, transport_id
        );
        Ok(handle)
    }

    fn unbind(&self, handle: RegistrationHandle) -> Result<(), UnbindError> {
        let mut routes = self.table.routes.write().unwrap();
        let stale = |handle: &RegistrationHandle| UnbindError::StaleHandle {
            transport_id: handle.transport_id().to_string(),
            context_path: handle.context_path().to_string(),
        };

        let bindings = routes
            .get_mut(handle.transport_id())
            .ok_or_else(|| stale(&handle))?;
        // only remove the entry this handle actually created; the path may
        // have been rebound since the transport went away and came back
        match bindings.get(handle.context_path()) {
            Some(entry) if entry.binding_id == handle.id() => {
                bindings.remove(handle.context_path());
                debug!(
                    "Released '{}' on transport '{}'.",
                    handle.context_path(),
                    handle.transport_id()
                );
                Ok(())
            }
            _ => Err(stale(&handle)),
        }
    }
}
