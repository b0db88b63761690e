//! Client for a partitioned in-memory data grid.
//!
//! The client keeps a connection per cluster member and routes every
//! key-addressed operation directly to the member owning the key's
//! partition, using a periodically refreshed partition table. Map proxies
//! expose blocking (`async fn`) and non-blocking (`*_async`, returning an
//! [`OperationHandle`]) forms of each operation, plus entry-event
//! subscriptions pushed by the cluster.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use gridlink_client::{ClientConfig, EntryHandlers, GridClient};
//!
//! # async fn run() -> gridlink_core::Result<()> {
//! let config = ClientConfig::builder()
//!     .cluster_name("dev")
//!     .add_address("127.0.0.1:5701".parse().unwrap())
//!     .build()?;
//! let client = GridClient::connect(config).await?;
//!
//! let orders = client.get_map::<String, String>("orders");
//! orders.put(&"order-1".to_string(), &"pending".to_string()).await?;
//! assert_eq!(
//!     orders.get(&"order-1".to_string()).await?.as_deref(),
//!     Some("pending")
//! );
//!
//! let registration = orders
//!     .add_entry_listener(
//!         true,
//!         EntryHandlers::new().on_added(|event| {
//!             println!("added: {:?}", event.key);
//!         }),
//!     )
//!     .await?;
//! orders.remove_entry_listener(&registration).await?;
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
pub mod cluster;
pub mod codec;
pub mod config;
pub mod connection;
mod invocation;
pub mod listener;
pub mod proxy;

pub use client::GridClient;
pub use cluster::{PartitionService, PartitionTable};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use connection::{ConnectionManager, ConnectionRef, ConnectionRegistry};
pub use invocation::{Invoker, OperationHandle};
pub use listener::{
    EntryEvent, EntryEventKind, EntryHandlers, ListenerRegistration, ListenerRegistry,
};
pub use proxy::GridMap;
