//! App Registration Table
//!
//! Multimap from deployed app name to the binding handles it currently
//! holds, one handle per transport the app was bound on.

use std::collections::HashMap;

use super::port::RegistrationHandle;

/// Binding handles recorded per app name.
///
/// Entries with zero handles are never stored: an app whose last handle is
/// taken disappears from the table, so "present" always means "has at least
/// one live binding".
#[derive(Debug, Default)]
pub struct AppRegistrations {
    registrations: HashMap<String, Vec<RegistrationHandle>>,
}

impl AppRegistrations {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handle under `app_name`. Additive: repeated registrations of
    /// the same name accumulate handles.
    pub fn add(&mut self, app_name: &str, handle: RegistrationHandle) {
        self.registrations
            .entry(app_name.to_string())
            .or_default()
            .push(handle);
    }

    /// Remove and return every handle recorded for `app_name`. Returns an
    /// empty vector when the name is unknown; the table entry is gone either
    /// way.
    pub fn take(&mut self, app_name: &str) -> Vec<RegistrationHandle> {
        self.registrations.remove(app_name).unwrap_or_default()
    }

    /// Remove and return every handle bound on `transport_id`, across all
    /// apps. App entries left without handles are dropped from the table.
    pub fn take_for_transport(&mut self, transport_id: &str) -> Vec<RegistrationHandle> {
        let mut taken = Vec::new();
        self.registrations.retain(|_, handles| {
            let mut kept = Vec::with_capacity(handles.len());
            for handle in handles.drain(..) {
                if handle.transport_id() == transport_id {
                    taken.push(handle);
                } else {
                    kept.push(handle);
                }
            }
            *handles = kept;
            !handles.is_empty()
        });
        taken
    }

    /// Number of handles currently recorded for `app_name`.
    pub fn handle_count(&self, app_name: &str) -> usize {
        self.registrations
            .get(app_name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Names of all apps with at least one live binding.
    pub fn app_names(&self) -> Vec<String> {
        self.registrations.keys().cloned().collect()
    }

    /// Number of registered apps.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
