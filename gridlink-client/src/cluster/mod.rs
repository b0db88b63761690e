//! Cluster partition bookkeeping and ownership resolution.

mod partition_service;
mod partition_table;

pub use partition_service::PartitionService;
pub use partition_table::PartitionTable;
