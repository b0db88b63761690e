//! Connections to cluster members and the lookup seam used for routing.

mod connection;
mod manager;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

pub use connection::{Connection, ConnectionReader, ConnectionWriter};
pub use manager::ConnectionManager;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new unique connection ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A routable reference to an established connection.
///
/// The transport behind it is owned by the connection layer; routing code
/// only ever passes these references back into [`Invoker`](crate::Invoker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionRef {
    id: ConnectionId,
    address: SocketAddr,
}

impl ConnectionRef {
    /// Creates a reference from an ID and the remote address.
    pub fn new(id: ConnectionId, address: SocketAddr) -> Self {
        Self { id, address }
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote member address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl std::fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.address)
    }
}

/// Lookup seam for established connections.
///
/// The routing layer resolves members through this trait; the concrete
/// lifecycle (connect, authenticate, reconnect) lives behind it.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Returns the designated owner connection, if one is established.
    async fn owner_connection(&self) -> Option<ConnectionRef>;

    /// Returns the connection to the given member address, if established.
    async fn connection(&self, address: SocketAddr) -> Option<ConnectionRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_uniqueness() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_connection_ref_display() {
        let address: SocketAddr = "10.0.0.1:5701".parse().unwrap();
        let conn = ConnectionRef::new(ConnectionId::new(), address);
        assert!(conn.to_string().contains("10.0.0.1:5701"));
    }

    #[test]
    fn test_connection_ref_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConnectionRef>();
    }
}
