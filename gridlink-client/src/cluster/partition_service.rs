//! Partition-table maintenance and owner resolution.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock as StdRwLock};
use std::time::Duration;

use gridlink_core::{GridError, Result, RoutableKey};
use tokio::sync::watch;

use crate::codec::cluster as cluster_codec;
use crate::connection::ConnectionRegistry;
use crate::invocation::Invoker;

use super::PartitionTable;

/// Maintains the partition table and answers ownership queries.
///
/// The table is refreshed on a fixed interval once [`start`](Self::start) is
/// called, and on demand via [`refresh`](Self::refresh). The stored snapshot
/// is replaced wholesale on every refresh; queries either see the previous
/// complete table or the new complete table, never a mix.
///
/// Callers that need the table before the first refresh has completed await
/// its arrival. That wait is unbounded unless a first-table timeout was
/// configured, so a cluster that never establishes an owner connection keeps
/// such callers suspended.
#[derive(Clone)]
pub struct PartitionService {
    inner: Arc<Inner>,
}

struct Inner {
    connections: Arc<dyn ConnectionRegistry>,
    invoker: Arc<dyn Invoker>,
    refresh_interval: Duration,
    first_table_timeout: Option<Duration>,
    table: StdRwLock<Option<Arc<PartitionTable>>>,
    /// Bumped on every table replacement; first-table waiters watch it.
    generation: watch::Sender<u64>,
    refresh_in_flight: AtomicBool,
    shutdown: StdMutex<Option<watch::Sender<bool>>>,
}

impl PartitionService {
    /// Creates a service resolving connections and submitting requests
    /// through the given collaborators.
    pub fn new(
        connections: Arc<dyn ConnectionRegistry>,
        invoker: Arc<dyn Invoker>,
        refresh_interval: Duration,
        first_table_timeout: Option<Duration>,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                connections,
                invoker,
                refresh_interval,
                first_table_timeout,
                table: StdRwLock::new(None),
                generation,
                refresh_in_flight: AtomicBool::new(false),
                shutdown: StdMutex::new(None),
            }),
        }
    }

    /// Arms the periodic refresh timer.
    ///
    /// The timer is self-rearming: each cycle sleeps the configured interval,
    /// attempts one refresh, and only then schedules the next cycle, so a
    /// slow cluster cannot cause firings to pile up. [`shutdown`](Self::shutdown)
    /// cancels it.
    pub fn start(&self) {
        tracing::debug!("starting partition service");
        let (tx, mut rx) = watch::channel(false);
        if let Some(previous) = self
            .inner
            .shutdown
            .lock()
            .expect("shutdown lock poisoned")
            .replace(tx)
        {
            let _ = previous.send(true);
        }

        let service = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = rx.changed() => {
                        if *rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(service.inner.refresh_interval) => {
                        if let Err(e) = service.do_refresh().await {
                            tracing::warn!(error = %e, "periodic partition refresh failed");
                        }
                    }
                }
            }
            tracing::debug!("partition refresh timer stopped");
        });
    }

    /// Cancels the periodic refresh timer.
    pub fn shutdown(&self) {
        if let Some(tx) = self
            .inner
            .shutdown
            .lock()
            .expect("shutdown lock poisoned")
            .take()
        {
            let _ = tx.send(true);
        }
    }

    /// Schedules an immediate refresh without waiting for its completion.
    ///
    /// Safe to call redundantly: a refresh already awaiting its response
    /// coalesces subsequent requests.
    pub fn refresh(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.do_refresh().await {
                tracing::warn!(error = %e, "partition refresh failed");
            }
        });
    }

    /// Returns the partition the given key routes to.
    ///
    /// Awaits the first table if none has arrived yet. The result is
    /// `key.partition_hash() mod partition_count`, always in
    /// `[0, partition_count)`.
    pub async fn partition_id(&self, key: &RoutableKey) -> Result<i32> {
        let table = self.current_table().await?;
        Ok(key.partition_hash() % table.partition_count())
    }

    /// Returns the member owning the given partition.
    ///
    /// Awaits the first table if none has arrived yet; on a miss the table is
    /// refreshed once more before the partition is reported unknown.
    pub async fn partition_owner(&self, partition_id: i32) -> Result<SocketAddr> {
        let table = self.current_table().await?;
        if let Some(owner) = table.owner(partition_id) {
            return Ok(owner);
        }

        self.do_refresh().await?;
        self.snapshot()
            .and_then(|table| table.owner(partition_id))
            .ok_or_else(|| {
                GridError::Routing(format!("no owner known for partition {}", partition_id))
            })
    }

    /// Returns the partition count, if a table has been received.
    pub fn partition_count(&self) -> Option<i32> {
        self.snapshot().map(|table| table.partition_count())
    }

    /// Returns the current table snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<PartitionTable>> {
        self.inner
            .table
            .read()
            .expect("table lock poisoned")
            .clone()
    }

    async fn current_table(&self) -> Result<Arc<PartitionTable>> {
        if let Some(table) = self.snapshot() {
            return Ok(table);
        }

        let mut rx = self.inner.generation.subscribe();
        // A refresh may have completed between the check and the subscription.
        if let Some(table) = self.snapshot() {
            return Ok(table);
        }
        self.refresh();

        let wait = async {
            loop {
                if rx.changed().await.is_err() {
                    return Err(GridError::Connection(
                        "partition service dropped".to_string(),
                    ));
                }
                if let Some(table) = self.snapshot() {
                    return Ok(table);
                }
            }
        };

        match self.inner.first_table_timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                GridError::Timeout(format!(
                    "no partition table received within {:?}",
                    limit
                ))
            })?,
            None => wait.await,
        }
    }

    /// Performs one refresh cycle.
    ///
    /// Returns `Ok(false)` when the cycle was skipped: no owner connection
    /// yet, a refresh already in flight, or an empty table reported.
    async fn do_refresh(&self) -> Result<bool> {
        if self
            .inner
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }

        let result = self.refresh_once().await;
        self.inner.refresh_in_flight.store(false, Ordering::Release);
        result
    }

    async fn refresh_once(&self) -> Result<bool> {
        let Some(connection) = self.inner.connections.owner_connection().await else {
            tracing::debug!("skipping partition refresh: owner connection not established yet");
            return Ok(false);
        };

        let request = cluster_codec::encode_get_partitions();
        let response = self
            .inner
            .invoker
            .invoke_on_connection(request, &connection)
            .await?;
        let owners = cluster_codec::decode_get_partitions_response(&response)?;

        let table = PartitionTable::from_owner_partitions(owners);
        if table.is_empty() {
            tracing::debug!("cluster reported an empty partition table");
            return Ok(false);
        }

        let partition_count = table.partition_count();
        *self.inner.table.write().expect("table lock poisoned") = Some(Arc::new(table));
        self.inner.generation.send_modify(|g| *g += 1);
        tracing::debug!(partition_count, "partition table replaced");
        Ok(true)
    }
}

impl std::fmt::Debug for PartitionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionService")
            .field("partition_count", &self.partition_count())
            .finish()
    }
}
