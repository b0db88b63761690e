//! Client configuration.

use std::net::SocketAddr;
use std::time::Duration;

use gridlink_core::{GridError, Result};

/// Default interval between periodic partition-table refreshes.
pub const DEFAULT_PARTITION_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Default timeout for establishing a connection to a member.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a [`GridClient`](crate::GridClient).
///
/// Built via [`ClientConfig::builder`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    cluster_name: String,
    addresses: Vec<SocketAddr>,
    connection_timeout: Duration,
    partition_refresh_interval: Duration,
    first_table_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Returns a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the cluster name.
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Returns the configured member addresses.
    pub fn addresses(&self) -> &[SocketAddr] {
        &self.addresses
    }

    /// Returns the connection establishment timeout.
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Returns the interval between periodic partition-table refreshes.
    pub fn partition_refresh_interval(&self) -> Duration {
        self.partition_refresh_interval
    }

    /// Returns the bound on waiting for the first partition table, if any.
    ///
    /// `None` means callers needing the table before the first refresh
    /// completes wait without limit.
    pub fn first_table_timeout(&self) -> Option<Duration> {
        self.first_table_timeout
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    cluster_name: String,
    addresses: Vec<SocketAddr>,
    connection_timeout: Duration,
    partition_refresh_interval: Duration,
    first_table_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            cluster_name: "dev".to_string(),
            addresses: Vec::new(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            partition_refresh_interval: DEFAULT_PARTITION_REFRESH_INTERVAL,
            first_table_timeout: None,
        }
    }

    /// Sets the cluster name.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = name.into();
        self
    }

    /// Adds a cluster member address.
    pub fn add_address(mut self, address: SocketAddr) -> Self {
        self.addresses.push(address);
        self
    }

    /// Sets the connection establishment timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the interval between periodic partition-table refreshes.
    pub fn partition_refresh_interval(mut self, interval: Duration) -> Self {
        self.partition_refresh_interval = interval;
        self
    }

    /// Bounds the wait for the first partition table.
    ///
    /// Without a bound, a caller resolving a partition before the cluster
    /// ever delivers a table waits indefinitely.
    pub fn first_table_timeout(mut self, timeout: Duration) -> Self {
        self.first_table_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidArgument` if no member address was added
    /// or the cluster name is empty.
    pub fn build(self) -> Result<ClientConfig> {
        if self.cluster_name.is_empty() {
            return Err(GridError::InvalidArgument(
                "cluster name must not be empty".to_string(),
            ));
        }
        if self.addresses.is_empty() {
            return Err(GridError::InvalidArgument(
                "at least one cluster address is required".to_string(),
            ));
        }

        Ok(ClientConfig {
            cluster_name: self.cluster_name,
            addresses: self.addresses,
            connection_timeout: self.connection_timeout,
            partition_refresh_interval: self.partition_refresh_interval,
            first_table_timeout: self.first_table_timeout,
        })
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ClientConfig::builder()
            .add_address("127.0.0.1:5701".parse().unwrap())
            .build()
            .unwrap();

        assert_eq!(config.cluster_name(), "dev");
        assert_eq!(
            config.partition_refresh_interval(),
            DEFAULT_PARTITION_REFRESH_INTERVAL
        );
        assert_eq!(config.connection_timeout(), DEFAULT_CONNECTION_TIMEOUT);
        assert!(config.first_table_timeout().is_none());
    }

    #[test]
    fn test_builder_requires_address() {
        let result = ClientConfig::builder().build();
        assert!(matches!(result, Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_rejects_empty_cluster_name() {
        let result = ClientConfig::builder()
            .cluster_name("")
            .add_address("127.0.0.1:5701".parse().unwrap())
            .build();
        assert!(matches!(result, Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .cluster_name("production")
            .add_address("10.0.0.1:5701".parse().unwrap())
            .add_address("10.0.0.2:5701".parse().unwrap())
            .partition_refresh_interval(Duration::from_secs(3))
            .first_table_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.cluster_name(), "production");
        assert_eq!(config.addresses().len(), 2);
        assert_eq!(config.partition_refresh_interval(), Duration::from_secs(3));
        assert_eq!(config.first_table_timeout(), Some(Duration::from_secs(30)));
    }
}
