//! Map proxy operations against an in-memory cluster fake.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::FakeCluster;
use gridlink_client::{GridMap, ListenerRegistry, PartitionService};
use gridlink_core::{DataInput, DataOutput, Deserializable, GridError, Result, Serializable};

fn map_for(fake: &Arc<FakeCluster>) -> GridMap<String, String> {
    grid_map(fake)
}

fn grid_map<K, V>(fake: &Arc<FakeCluster>) -> GridMap<K, V>
where
    K: Serializable + Deserializable + Send + Sync + 'static,
    V: Serializable + Deserializable + Send + Sync + 'static,
{
    let partitions = PartitionService::new(
        Arc::clone(fake) as _,
        Arc::clone(fake) as _,
        Duration::from_secs(10),
        None,
    );
    GridMap::new(
        "orders",
        partitions,
        Arc::clone(fake) as _,
        Arc::clone(fake) as _,
        Arc::new(ListenerRegistry::new()),
    )
}

/// A key whose serialized form is empty, for argument validation tests.
#[derive(Debug)]
struct Empty;

impl Serializable for Empty {
    fn serialize<W: DataOutput>(&self, _output: &mut W) -> Result<()> {
        Ok(())
    }
}

impl Deserializable for Empty {
    fn deserialize<R: DataInput>(_input: &mut R) -> Result<Self> {
        Ok(Empty)
    }
}

#[tokio::test]
async fn test_put_then_get() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "order-1".to_string();
    assert_eq!(map.put(&key, &"pending".to_string()).await.unwrap(), None);
    assert_eq!(
        map.get(&key).await.unwrap().as_deref(),
        Some("pending")
    );
}

#[tokio::test]
async fn test_put_returns_previous_value() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "order-1".to_string();
    map.put(&key, &"pending".to_string()).await.unwrap();
    let previous = map.put(&key, &"shipped".to_string()).await.unwrap();
    assert_eq!(previous.as_deref(), Some("pending"));
    assert_eq!(map.get(&key).await.unwrap().as_deref(), Some("shipped"));
}

#[tokio::test]
async fn test_remove_returns_previous_value() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "order-1".to_string();
    map.put(&key, &"pending".to_string()).await.unwrap();

    assert_eq!(map.remove(&key).await.unwrap().as_deref(), Some("pending"));
    assert_eq!(map.get(&key).await.unwrap(), None);
    assert_eq!(map.remove(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_contains_key() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "order-1".to_string();
    assert!(!map.contains_key(&key).await.unwrap());
    map.put(&key, &"pending".to_string()).await.unwrap();
    assert!(map.contains_key(&key).await.unwrap());
}

#[tokio::test]
async fn test_size_counts_entries() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    assert_eq!(map.size().await.unwrap(), 0);
    map.put(&"a".to_string(), &"1".to_string()).await.unwrap();
    map.put(&"b".to_string(), &"2".to_string()).await.unwrap();
    map.put(&"a".to_string(), &"3".to_string()).await.unwrap();
    assert_eq!(map.size().await.unwrap(), 2);
}

#[tokio::test]
async fn test_put_with_ttl() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "session".to_string();
    let previous = map
        .put_with_ttl(&key, &"live".to_string(), Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(previous, None);
    assert_eq!(map.get(&key).await.unwrap().as_deref(), Some("live"));
    assert_eq!(fake.last_put_ttl(), Some(30_000));
}

#[tokio::test]
async fn test_oversized_ttl_never_becomes_negative_on_the_wire() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    map.put_with_ttl(&"k".to_string(), &"v".to_string(), Duration::MAX)
        .await
        .unwrap();
    assert_eq!(fake.last_put_ttl(), Some(i64::MAX));

    map.put(&"k".to_string(), &"v".to_string()).await.unwrap();
    assert_eq!(fake.last_put_ttl(), Some(-1));
}

#[tokio::test]
async fn test_async_forms_match_sync_results() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    let key = "order-9".to_string();
    assert_eq!(map.put_async(&key, &"a".to_string()).await.unwrap(), None);
    assert_eq!(
        map.put_async(&key, &"b".to_string()).await.unwrap().as_deref(),
        Some("a")
    );
    assert_eq!(map.get_async(&key).await.unwrap().as_deref(), Some("b"));
    assert!(map.contains_key_async(&key).await.unwrap());
    assert_eq!(map.size_async().await.unwrap(), 1);
    assert_eq!(
        map.remove_async(&key).await.unwrap().as_deref(),
        Some("b")
    );
    assert_eq!(map.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_empty_key_rejected_before_any_network_call() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map: GridMap<Empty, String> = grid_map(&fake);

    let result = map.put(&Empty, &"v".to_string()).await;
    assert!(matches!(result, Err(GridError::InvalidArgument(_))));
    assert_eq!(fake.invocation_count(), 0);
}

#[tokio::test]
async fn test_empty_key_fails_async_handle_without_network_call() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map: GridMap<Empty, String> = grid_map(&fake);

    let handle = map.get_async(&Empty);
    assert!(matches!(handle.await, Err(GridError::InvalidArgument(_))));
    assert_eq!(fake.invocation_count(), 0);
}

#[tokio::test]
async fn test_empty_value_rejected() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map: GridMap<String, Empty> = grid_map(&fake);

    let result = map.put(&"k".to_string(), &Empty).await;
    assert!(matches!(result, Err(GridError::InvalidArgument(_))));
    assert_eq!(fake.invocation_count(), 0);
}

#[tokio::test]
async fn test_keys_spread_across_members() {
    let fake = Arc::new(FakeCluster::new(FakeCluster::two_member_layout()));
    let map = map_for(&fake);

    for i in 0..32 {
        let key = format!("key-{}", i);
        map.put(&key, &"v".to_string()).await.unwrap();
    }
    assert_eq!(map.size().await.unwrap(), 32);
}
