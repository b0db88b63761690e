//! Top-level client handle wiring the connection, routing, and proxy layers.

use std::sync::Arc;

use gridlink_core::{Deserializable, Result, Serializable};

use crate::cluster::PartitionService;
use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::listener::ListenerRegistry;
use crate::proxy::GridMap;

/// A connected grid client.
///
/// Owns the connection manager, the partition service, and the listener
/// registry; proxies obtained from it share these services. The client is
/// cheap to clone and safe to use from any task.
#[derive(Clone)]
pub struct GridClient {
    config: ClientConfig,
    manager: ConnectionManager,
    partitions: PartitionService,
    listeners: Arc<ListenerRegistry>,
}

impl GridClient {
    /// Connects to the cluster described by the given configuration.
    ///
    /// Connections to the configured members are established eagerly; the
    /// first partition table is requested in the background, and the
    /// periodic refresh timer is armed.
    ///
    /// # Errors
    ///
    /// Returns `GridError::Connection` if no configured member accepts a
    /// connection.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        tracing::info!(cluster = %config.cluster_name(), "connecting to cluster");

        let listeners = Arc::new(ListenerRegistry::new());
        let manager = ConnectionManager::new(config.clone(), Arc::clone(&listeners));
        manager.start().await?;

        let partitions = PartitionService::new(
            Arc::new(manager.clone()),
            Arc::new(manager.clone()),
            config.partition_refresh_interval(),
            config.first_table_timeout(),
        );
        partitions.start();
        partitions.refresh();

        Ok(Self {
            config,
            manager,
            partitions,
            listeners,
        })
    }

    /// Returns a proxy for the distributed map with the given name.
    ///
    /// Proxies are lightweight; obtaining the same name twice yields two
    /// independent handles onto the same cluster-side map.
    pub fn get_map<K, V>(&self, name: impl Into<String>) -> GridMap<K, V>
    where
        K: Serializable + Deserializable + Send + Sync + 'static,
        V: Serializable + Deserializable + Send + Sync + 'static,
    {
        GridMap::new(
            name,
            self.partitions.clone(),
            Arc::new(self.manager.clone()),
            Arc::new(self.manager.clone()),
            Arc::clone(&self.listeners),
        )
    }

    /// Returns the partition service for direct routing queries.
    pub fn partition_service(&self) -> &PartitionService {
        &self.partitions
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Disconnects from the cluster.
    ///
    /// Cancels the partition refresh timer, closes every connection, and
    /// fails all in-flight invocations.
    pub async fn shutdown(&self) {
        tracing::info!(cluster = %self.config.cluster_name(), "shutting down client");
        self.partitions.shutdown();
        self.manager.shutdown().await;
    }
}

impl std::fmt::Debug for GridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridClient")
            .field("cluster", &self.config.cluster_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridClient>();
    }
}
