//! Entry-event subscription and server-push dispatch.

mod entry;
mod registry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

pub use entry::{EntryEvent, EntryEventKind, EntryHandlers};
pub use registry::ListenerRegistry;

/// Handle for an active entry-listener subscription.
///
/// The registration ID is the token the cluster returned; it is the only
/// valid handle for de-registration. Dropping the handle deactivates local
/// dispatch but does not tell the cluster — use
/// [`GridMap::remove_entry_listener`](crate::GridMap::remove_entry_listener)
/// for a clean removal.
#[derive(Debug)]
pub struct ListenerRegistration {
    id: Uuid,
    active: Arc<AtomicBool>,
}

impl ListenerRegistration {
    pub(crate) fn new(id: Uuid, active: Arc<AtomicBool>) -> Self {
        Self { id, active }
    }

    /// Returns the registration ID assigned by the cluster.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns `true` while events for this registration are dispatched.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops local dispatch for this registration.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Display for ListenerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "registration-{}", self.id)
    }
}
