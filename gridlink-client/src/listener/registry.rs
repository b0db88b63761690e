//! Registration-keyed dispatch of server-pushed entry events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use gridlink_core::{ClientMessage, Result};
use uuid::Uuid;

use crate::codec::map as map_codec;

/// Type-erased per-registration dispatcher: decodes one event message and
/// invokes the matching handler.
pub(crate) type Dispatcher = Box<dyn Fn(&ClientMessage) -> Result<()> + Send + Sync>;

struct RegistryEntry {
    active: Arc<AtomicBool>,
    dispatcher: Dispatcher,
}

/// Routes server-pushed event messages to the handler table registered for
/// their registration ID.
///
/// De-registration removes the entry under the same lock dispatch reads it
/// through, so no event is handed to a handler once removal has started; a
/// late event for a removed id is logged and dropped.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: RwLock<HashMap<Uuid, RegistryEntry>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a dispatcher under the given registration ID.
    pub(crate) fn register(
        &self,
        registration_id: Uuid,
        active: Arc<AtomicBool>,
        dispatcher: Dispatcher,
    ) {
        self.entries
            .write()
            .expect("registry lock poisoned")
            .insert(
                registration_id,
                RegistryEntry { active, dispatcher },
            );
        tracing::debug!(registration_id = %registration_id, "registered entry listener");
    }

    /// Removes the dispatcher for the given registration ID.
    ///
    /// Returns `true` if a registration was removed.
    pub fn deregister(&self, registration_id: &Uuid) -> bool {
        let removed = self
            .entries
            .write()
            .expect("registry lock poisoned")
            .remove(registration_id);
        if let Some(entry) = &removed {
            entry.active.store(false, Ordering::Release);
            tracing::debug!(registration_id = %registration_id, "deregistered entry listener");
        }
        removed.is_some()
    }

    /// Returns the number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    /// Returns true if no registration is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches one server-pushed event message.
    ///
    /// An unknown registration ID is expected when an event raced a removal
    /// and is dropped after a debug log. A known registration whose handler
    /// table cannot service the event's kind is a protocol defect: the error
    /// is returned to the caller for loud logging, never swallowed.
    pub fn handle_event(&self, message: &ClientMessage) -> Result<()> {
        let registration_id = map_codec::event_registration_id(message)?;

        let entries = self.entries.read().expect("registry lock poisoned");
        let Some(entry) = entries.get(&registration_id) else {
            tracing::debug!(
                registration_id = %registration_id,
                "dropping event for unknown or removed registration"
            );
            return Ok(());
        };

        if !entry.active.load(Ordering::Acquire) {
            tracing::debug!(
                registration_id = %registration_id,
                "dropping event for deactivated registration"
            );
            return Ok(());
        }

        (entry.dispatcher)(message)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn added_event(registration_id: Uuid) -> ClientMessage {
        map_codec::encode_entry_event(
            registration_id,
            1,
            Uuid::new_v4(),
            1,
            Some(b"k"),
            Some(b"v"),
            None,
            None,
        )
    }

    #[test]
    fn test_dispatch_reaches_registered_dispatcher() {
        let registry = ListenerRegistry::new();
        let id = Uuid::new_v4();
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);

        registry.register(
            id,
            Arc::new(AtomicBool::new(true)),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
        );

        registry.handle_event(&added_event(id)).unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unknown_registration_is_dropped_quietly() {
        let registry = ListenerRegistry::new();
        assert!(registry.handle_event(&added_event(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn test_no_dispatch_after_deregister() {
        let registry = ListenerRegistry::new();
        let id = Uuid::new_v4();
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);

        registry.register(
            id,
            Arc::new(AtomicBool::new(true)),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
        );

        assert!(registry.deregister(&id));
        assert!(!registry.deregister(&id));
        registry.handle_event(&added_event(id)).unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_deactivated_registration_drops_events() {
        let registry = ListenerRegistry::new();
        let id = Uuid::new_v4();
        let active = Arc::new(AtomicBool::new(true));
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);

        registry.register(
            id,
            Arc::clone(&active),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }),
        );

        active.store(false, Ordering::Release);
        registry.handle_event(&added_event(id)).unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_dispatcher_error_propagates() {
        let registry = ListenerRegistry::new();
        let id = Uuid::new_v4();
        registry.register(
            id,
            Arc::new(AtomicBool::new(true)),
            Box::new(|_| {
                Err(gridlink_core::GridError::Protocol(
                    "no handler for event kind".to_string(),
                ))
            }),
        );

        assert!(registry.handle_event(&added_event(id)).is_err());
    }
}
