//! Entry-event kinds, events, and the per-registration handler table.

use std::collections::HashMap;

use uuid::Uuid;

/// Kinds of entry events a listener can subscribe to.
///
/// Each kind owns a fixed bit in the subscription bitmask; new kinds get new
/// bits, existing bit assignments never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryEventKind {
    /// A new entry was added.
    Added,
    /// An entry was removed.
    Removed,
    /// An existing entry was updated.
    Updated,
    /// An entry was evicted due to size constraints.
    Evicted,
    /// All entries were evicted at once.
    EvictAll,
    /// All entries were cleared at once.
    ClearAll,
    /// An entry was merged during split-brain healing.
    Merged,
    /// An entry expired.
    Expired,
}

impl EntryEventKind {
    /// Returns this kind's bit in the subscription bitmask.
    pub fn flag(self) -> i32 {
        match self {
            Self::Added => 1,
            Self::Removed => 1 << 1,
            Self::Updated => 1 << 2,
            Self::Evicted => 1 << 3,
            Self::EvictAll => 1 << 4,
            Self::ClearAll => 1 << 5,
            Self::Merged => 1 << 6,
            Self::Expired => 1 << 7,
        }
    }

    /// Maps a single bit flag back to its kind.
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            1 => Some(Self::Added),
            2 => Some(Self::Removed),
            4 => Some(Self::Updated),
            8 => Some(Self::Evicted),
            16 => Some(Self::EvictAll),
            32 => Some(Self::ClearAll),
            64 => Some(Self::Merged),
            128 => Some(Self::Expired),
            _ => None,
        }
    }

    /// Returns `true` for kinds reporting a bulk change without a key.
    pub fn is_bulk(self) -> bool {
        matches!(self, Self::EvictAll | Self::ClearAll)
    }
}

impl std::fmt::Display for EntryEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Updated => "updated",
            Self::Evicted => "evicted",
            Self::EvictAll => "evict_all",
            Self::ClearAll => "clear_all",
            Self::Merged => "merged",
            Self::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// A notification describing a change to a map entry, or a bulk change.
///
/// Per kind, exactly one of `value`, `old_value`, and `merging_value` is
/// meaningful; the others are `None`. Bulk kinds carry no key and report the
/// number of affected entries instead.
#[derive(Debug, Clone)]
pub struct EntryEvent<K, V> {
    /// The affected key, absent for bulk events.
    pub key: Option<K>,
    /// The new value, for added/updated events delivered with values.
    pub value: Option<V>,
    /// The previous value, for removed/updated/evicted/expired events.
    pub old_value: Option<V>,
    /// The merging value, for merge events only.
    pub merging_value: Option<V>,
    /// The kind of change.
    pub kind: EntryEventKind,
    /// Identity of the member that originated the event.
    pub member: Uuid,
    /// Number of entries affected, used by bulk events.
    pub affected_entries: i32,
}

type Handler<K, V> = Box<dyn Fn(EntryEvent<K, V>) + Send + Sync>;

/// The kind→handler table supplied when registering an entry listener.
///
/// The subscription bitmask sent to the cluster is the OR of the bits of the
/// kinds a handler was supplied for.
pub struct EntryHandlers<K, V> {
    handlers: HashMap<EntryEventKind, Handler<K, V>>,
}

impl<K, V> EntryHandlers<K, V> {
    /// Creates an empty handler table.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Sets the handler for the given kind, replacing any previous one.
    pub fn on<F>(mut self, kind: EntryEventKind, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Sets the handler for added events.
    pub fn on_added<F>(self, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.on(EntryEventKind::Added, handler)
    }

    /// Sets the handler for removed events.
    pub fn on_removed<F>(self, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.on(EntryEventKind::Removed, handler)
    }

    /// Sets the handler for updated events.
    pub fn on_updated<F>(self, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.on(EntryEventKind::Updated, handler)
    }

    /// Sets the handler for evicted events.
    pub fn on_evicted<F>(self, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.on(EntryEventKind::Evicted, handler)
    }

    /// Sets the handler for expired events.
    pub fn on_expired<F>(self, handler: F) -> Self
    where
        F: Fn(EntryEvent<K, V>) + Send + Sync + 'static,
    {
        self.on(EntryEventKind::Expired, handler)
    }

    /// Returns the combined subscription bitmask.
    pub fn flags(&self) -> i32 {
        self.handlers.keys().fold(0, |acc, kind| acc | kind.flag())
    }

    /// Returns true if no handler was supplied.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Looks up the handler for the given kind.
    pub(crate) fn get(&self, kind: EntryEventKind) -> Option<&Handler<K, V>> {
        self.handlers.get(&kind)
    }
}

impl<K, V> Default for EntryHandlers<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for EntryHandlers<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryHandlers")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
