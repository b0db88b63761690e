//! Connection lifecycle and response/event demultiplexing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock as StdRwLock};

use async_trait::async_trait;
use gridlink_core::{ClientMessage, GridError, Result};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::invocation::Invoker;
use crate::listener::ListenerRegistry;

use super::{Connection, ConnectionReader, ConnectionRef, ConnectionRegistry, ConnectionWriter};

/// One in-flight request awaiting its response.
///
/// The completion sender is resolved exactly once, with either the decoded
/// response message or a transport failure, and never reused.
struct PendingInvocation {
    address: SocketAddr,
    completion: oneshot::Sender<Result<ClientMessage>>,
}

struct MemberConnection {
    handle: ConnectionRef,
    writer: Mutex<ConnectionWriter>,
}

/// Manages connections to cluster members.
///
/// The first member that accepts a connection becomes the designated owner
/// connection, used for cluster-metadata requests. One reader task per
/// connection demultiplexes incoming traffic: responses complete their
/// pending invocation by correlation ID, and event-flagged messages are
/// dispatched through the [`ListenerRegistry`].
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: ClientConfig,
    listeners: Arc<ListenerRegistry>,
    connections: tokio::sync::RwLock<HashMap<SocketAddr, MemberConnection>>,
    owner_address: StdRwLock<Option<SocketAddr>>,
    pending: StdMutex<HashMap<i64, PendingInvocation>>,
    reader_tasks: StdMutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl ConnectionManager {
    /// Creates a manager for the given configuration.
    pub fn new(config: ClientConfig, listeners: Arc<ListenerRegistry>) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                config,
                listeners,
                connections: tokio::sync::RwLock::new(HashMap::new()),
                owner_address: StdRwLock::new(None),
                pending: StdMutex::new(HashMap::new()),
                reader_tasks: StdMutex::new(Vec::new()),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Connects to the configured members.
    ///
    /// # Errors
    ///
    /// Returns `GridError::Connection` if no member accepts a connection.
    pub async fn start(&self) -> Result<()> {
        for &address in self.inner.config.addresses() {
            match tokio::time::timeout(
                self.inner.config.connection_timeout(),
                Connection::connect(address),
            )
            .await
            {
                Ok(Ok(connection)) => self.adopt(connection).await,
                Ok(Err(e)) => {
                    tracing::warn!(address = %address, error = %e, "connection attempt failed");
                }
                Err(_) => {
                    tracing::warn!(address = %address, "connection attempt timed out");
                }
            }
        }

        if self.inner.connections.read().await.is_empty() {
            return Err(GridError::Connection(
                "unable to connect to any cluster member".to_string(),
            ));
        }
        Ok(())
    }

    async fn adopt(&self, connection: Connection) {
        let handle = connection.handle();
        let address = handle.address();
        let (reader, writer) = connection.into_split();

        self.inner.connections.write().await.insert(
            address,
            MemberConnection {
                handle,
                writer: Mutex::new(writer),
            },
        );

        {
            let mut owner = self.inner.owner_address.write().expect("owner lock poisoned");
            if owner.is_none() {
                *owner = Some(address);
                tracing::debug!(address = %address, "designated owner connection");
            }
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            inner.read_loop(reader, address).await;
        });
        self.inner
            .reader_tasks
            .lock()
            .expect("task lock poisoned")
            .push(task);
    }

    /// Closes all connections and fails every pending invocation.
    pub async fn shutdown(&self) {
        self.inner.shut_down.store(true, Ordering::Release);

        self.inner.connections.write().await.clear();

        let tasks = std::mem::take(
            &mut *self.inner.reader_tasks.lock().expect("task lock poisoned"),
        );
        for task in tasks {
            task.abort();
        }

        self.inner
            .fail_pending(None, || GridError::Connection("client shut down".to_string()));
        tracing::info!("connection manager shut down");
    }

    /// Returns the listener registry events are dispatched through.
    pub fn listeners(&self) -> Arc<ListenerRegistry> {
        Arc::clone(&self.inner.listeners)
    }
}

impl ManagerInner {
    async fn read_loop(self: Arc<Self>, mut reader: ConnectionReader, address: SocketAddr) {
        loop {
            match reader.receive().await {
                Ok(Some(message)) => {
                    if message.is_event() {
                        if let Err(e) = self.listeners.handle_event(&message) {
                            tracing::error!(address = %address, error = %e, "event dispatch failed");
                        }
                    } else {
                        self.complete(&message);
                    }
                }
                Ok(None) => {
                    tracing::debug!(address = %address, "connection closed by member");
                    break;
                }
                Err(e) => {
                    if !self.shut_down.load(Ordering::Acquire) {
                        tracing::warn!(address = %address, error = %e, "connection lost");
                    }
                    break;
                }
            }
        }

        self.connections.write().await.remove(&address);
        self.fail_pending(Some(address), || {
            GridError::Connection(format!("connection to {} lost", address))
        });
    }

    fn complete(&self, message: &ClientMessage) {
        let Some(correlation_id) = message.correlation_id() else {
            tracing::warn!("dropping response without correlation ID");
            return;
        };

        let invocation = self
            .pending
            .lock()
            .expect("pending lock poisoned")
            .remove(&correlation_id);

        match invocation {
            Some(invocation) => {
                let _ = invocation.completion.send(Ok(message.clone()));
            }
            None => {
                tracing::warn!(correlation_id, "no pending invocation for response");
            }
        }
    }

    /// Fails pending invocations, either all of them or those bound to one address.
    fn fail_pending<F>(&self, address: Option<SocketAddr>, error: F)
    where
        F: Fn() -> GridError,
    {
        let failed: Vec<PendingInvocation> = {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            match address {
                Some(addr) => {
                    let ids: Vec<i64> = pending
                        .iter()
                        .filter(|(_, inv)| inv.address == addr)
                        .map(|(&id, _)| id)
                        .collect();
                    ids.into_iter()
                        .filter_map(|id| pending.remove(&id))
                        .collect()
                }
                None => pending.drain().map(|(_, inv)| inv).collect(),
            }
        };

        for invocation in failed {
            let _ = invocation.completion.send(Err(error()));
        }
    }
}

#[async_trait]
impl ConnectionRegistry for ConnectionManager {
    async fn owner_connection(&self) -> Option<ConnectionRef> {
        let address = *self.inner.owner_address.read().expect("owner lock poisoned");
        match address {
            Some(address) => self.connection(address).await,
            None => None,
        }
    }

    async fn connection(&self, address: SocketAddr) -> Option<ConnectionRef> {
        self.inner
            .connections
            .read()
            .await
            .get(&address)
            .map(|c| c.handle)
    }
}

#[async_trait]
impl Invoker for ConnectionManager {
    async fn invoke_on_connection(
        &self,
        request: ClientMessage,
        connection: &ConnectionRef,
    ) -> Result<ClientMessage> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(GridError::Connection("client shut down".to_string()));
        }

        let correlation_id = request
            .correlation_id()
            .ok_or_else(|| GridError::Protocol("request missing correlation ID".to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().expect("pending lock poisoned").insert(
            correlation_id,
            PendingInvocation {
                address: connection.address(),
                completion: tx,
            },
        );

        let send_result = {
            let connections = self.inner.connections.read().await;
            match connections.get(&connection.address()) {
                Some(member) => member.writer.lock().await.send(request).await,
                None => Err(GridError::Connection(format!(
                    "no connection to {}",
                    connection.address()
                ))),
            }
        };

        if let Err(e) = send_result {
            self.inner
                .pending
                .lock()
                .expect("pending lock poisoned")
                .remove(&correlation_id);
            return Err(e);
        }

        rx.await
            .unwrap_or_else(|_| Err(GridError::Connection("client shut down".to_string())))
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("cluster", &self.inner.config.cluster_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig::builder()
            .add_address("127.0.0.1:5701".parse().unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_owner_before_start() {
        let manager = ConnectionManager::new(test_config(), Arc::new(ListenerRegistry::new()));
        assert!(manager.owner_connection().await.is_none());
    }

    #[tokio::test]
    async fn test_invoke_after_shutdown_fails() {
        let manager = ConnectionManager::new(test_config(), Arc::new(ListenerRegistry::new()));
        manager.shutdown().await;

        let request = ClientMessage::new_request(0x010200);
        let connection = ConnectionRef::new(
            crate::connection::ConnectionId::new(),
            "127.0.0.1:5701".parse().unwrap(),
        );
        let result = manager.invoke_on_connection(request, &connection).await;
        assert!(matches!(result, Err(GridError::Connection(_))));
    }

    #[test]
    fn test_manager_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConnectionManager>();
    }
}
