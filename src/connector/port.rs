//! Binding Port
//!
//! The host-supplied capability to attach and detach app handlers on a
//! specific transport and context path.

use std::sync::Arc;

use uuid::Uuid;

use super::error::{BindError, UnbindError};
use crate::http::AppHandler;

/// Opaque token for one active (app, transport, path) binding.
///
/// A handle is owned by the registration table entry that created it and is
/// consumed by value on release, so a binding can only be released once. It
/// records the transport it was bound on so transport removal can purge
/// exactly the affected bindings.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RegistrationHandle {
    id: Uuid,
    transport_id: String,
    context_path: String,
}

impl RegistrationHandle {
    /// Mint a fresh handle for a binding on `transport_id`. Called by
    /// binding-port implementations when a bind succeeds.
    pub fn new(transport_id: impl Into<String>, context_path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport_id: transport_id.into(),
            context_path: context_path.into(),
        }
    }

    /// Unique id of this binding.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Id of the transport the binding was opened on.
    pub fn transport_id(&self) -> &str {
        &self.transport_id
    }

    /// Context path the binding was opened at.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }
}

/// Host capability the connector drives.
///
/// Implementations attach a handler at a context path on one transport and
/// release such bindings again. Either call may block on host I/O; the
/// connector treats both as short, failable operations and never retries.
pub trait BindingPort: Send + Sync {
    /// Bind `handler` at `context_path` on the transport with `transport_id`.
    fn bind(
        &self,
        transport_id: &str,
        context_path: &str,
        handler: Arc<dyn AppHandler>,
    ) -> Result<RegistrationHandle, BindError>;

    /// Release a binding previously returned by [`BindingPort::bind`].
    fn unbind(&self, handle: RegistrationHandle) -> Result<(), UnbindError>;
}
