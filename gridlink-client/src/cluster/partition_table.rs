//! Immutable snapshot of partition ownership.

use std::collections::HashMap;
use std::net::SocketAddr;

/// A complete snapshot of the cluster's partition ownership.
///
/// Maps every partition ID in `[0, partition_count)` to the owning member
/// address. A table is built once from a refresh response and never mutated;
/// the partition service replaces the whole snapshot on every refresh so a
/// reader can never observe a mix of two ownership generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    partition_count: i32,
    owners: HashMap<i32, SocketAddr>,
}

impl PartitionTable {
    /// Builds a table by inverting an owner-address-keyed mapping of
    /// partition ID lists, as delivered by the cluster.
    pub fn from_owner_partitions(owners_by_address: HashMap<SocketAddr, Vec<i32>>) -> Self {
        let mut owners = HashMap::new();
        for (address, partitions) in owners_by_address {
            for partition_id in partitions {
                owners.insert(partition_id, address);
            }
        }
        Self {
            partition_count: owners.len() as i32,
            owners,
        }
    }

    /// Returns the owner of the given partition, if known.
    pub fn owner(&self, partition_id: i32) -> Option<SocketAddr> {
        self.owners.get(&partition_id).copied()
    }

    /// Returns the number of partitions in the cluster.
    pub fn partition_count(&self) -> i32 {
        self.partition_count
    }

    /// Returns true if the table holds no ownership entries.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
