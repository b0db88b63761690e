//! Proxy for a distributed map held by the cluster.

use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use gridlink_core::{
    ClientMessage, Deserializable, GridError, Result, RoutableKey, Serializable,
};

use crate::cluster::PartitionService;
use crate::codec::map as map_codec;
use crate::connection::ConnectionRegistry;
use crate::invocation::{Invoker, OperationHandle};
use crate::listener::{
    EntryEvent, EntryEventKind, EntryHandlers, ListenerRegistration, ListenerRegistry,
};

/// Client-side proxy for a named distributed map.
///
/// Key-addressed operations serialize the key, resolve its partition owner
/// through the partition service, and go straight to that member's
/// connection. Map-wide operations go to the owner connection.
///
/// Every operation has two forms: the plain `async fn`, awaited by the
/// caller, and a `*_async` variant that submits the operation to a runtime
/// task and returns an [`OperationHandle`] resolving with the same result.
/// Both forms reject keys and values whose serialized form is empty before
/// touching the network.
pub struct GridMap<K, V> {
    name: String,
    partitions: PartitionService,
    connections: Arc<dyn ConnectionRegistry>,
    invoker: Arc<dyn Invoker>,
    listeners: Arc<ListenerRegistry>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Clone for GridMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            partitions: self.partitions.clone(),
            connections: Arc::clone(&self.connections),
            invoker: Arc::clone(&self.invoker),
            listeners: Arc::clone(&self.listeners),
            _marker: PhantomData,
        }
    }
}

impl<K, V> GridMap<K, V>
where
    K: Serializable + Deserializable + Send + Sync + 'static,
    V: Serializable + Deserializable + Send + Sync + 'static,
{
    /// Creates a proxy for the map with the given name.
    pub fn new(
        name: impl Into<String>,
        partitions: PartitionService,
        connections: Arc<dyn ConnectionRegistry>,
        invoker: Arc<dyn Invoker>,
        listeners: Arc<ListenerRegistry>,
    ) -> Self {
        Self {
            name: name.into(),
            partitions,
            connections,
            invoker,
            listeners,
            _marker: PhantomData,
        }
    }

    /// Returns the map's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the map contains the given key.
    pub async fn contains_key(&self, key: &K) -> Result<bool> {
        let key = self.routable_key(key)?;
        self.contains_key_inner(key).await
    }

    /// Non-blocking form of [`contains_key`](Self::contains_key).
    pub fn contains_key_async(&self, key: &K) -> OperationHandle<bool> {
        let key = match self.routable_key(key) {
            Ok(key) => key,
            Err(e) => return OperationHandle::ready(Err(e)),
        };
        let map = self.clone();
        OperationHandle::spawn(async move { map.contains_key_inner(key).await })
    }

    /// Returns the value stored under the given key, if any.
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let key = self.routable_key(key)?;
        self.get_inner(key).await
    }

    /// Non-blocking form of [`get`](Self::get).
    pub fn get_async(&self, key: &K) -> OperationHandle<Option<V>> {
        let key = match self.routable_key(key) {
            Ok(key) => key,
            Err(e) => return OperationHandle::ready(Err(e)),
        };
        let map = self.clone();
        OperationHandle::spawn(async move { map.get_inner(key).await })
    }

    /// Stores a value under the given key without an expiry.
    ///
    /// Returns the value previously stored under the key, if any.
    pub async fn put(&self, key: &K, value: &V) -> Result<Option<V>> {
        let (key, value) = self.routable_entry(key, value)?;
        self.put_inner(key, value, map_codec::TTL_UNSET).await
    }

    /// Non-blocking form of [`put`](Self::put).
    pub fn put_async(&self, key: &K, value: &V) -> OperationHandle<Option<V>> {
        let (key, value) = match self.routable_entry(key, value) {
            Ok(entry) => entry,
            Err(e) => return OperationHandle::ready(Err(e)),
        };
        let map = self.clone();
        OperationHandle::spawn(async move { map.put_inner(key, value, map_codec::TTL_UNSET).await })
    }

    /// Stores a value under the given key, expiring after `ttl`.
    ///
    /// Returns the value previously stored under the key, if any.
    pub async fn put_with_ttl(&self, key: &K, value: &V, ttl: Duration) -> Result<Option<V>> {
        let (key, value) = self.routable_entry(key, value)?;
        self.put_inner(key, value, ttl_millis(ttl)).await
    }

    /// Non-blocking form of [`put_with_ttl`](Self::put_with_ttl).
    pub fn put_with_ttl_async(
        &self,
        key: &K,
        value: &V,
        ttl: Duration,
    ) -> OperationHandle<Option<V>> {
        let (key, value) = match self.routable_entry(key, value) {
            Ok(entry) => entry,
            Err(e) => return OperationHandle::ready(Err(e)),
        };
        let map = self.clone();
        OperationHandle::spawn(async move { map.put_inner(key, value, ttl_millis(ttl)).await })
    }

    /// Removes the given key, returning the value it held, if any.
    pub async fn remove(&self, key: &K) -> Result<Option<V>> {
        let key = self.routable_key(key)?;
        self.remove_inner(key).await
    }

    /// Non-blocking form of [`remove`](Self::remove).
    pub fn remove_async(&self, key: &K) -> OperationHandle<Option<V>> {
        let key = match self.routable_key(key) {
            Ok(key) => key,
            Err(e) => return OperationHandle::ready(Err(e)),
        };
        let map = self.clone();
        OperationHandle::spawn(async move { map.remove_inner(key).await })
    }

    /// Returns the number of entries in the map.
    pub async fn size(&self) -> Result<i32> {
        self.size_inner().await
    }

    /// Non-blocking form of [`size`](Self::size).
    pub fn size_async(&self) -> OperationHandle<i32> {
        let map = self.clone();
        OperationHandle::spawn(async move { map.size_inner().await })
    }

    /// Subscribes the given handlers to this map's entry events.
    ///
    /// The subscription covers exactly the kinds a handler was supplied for;
    /// an empty handler table is rejected. With `include_value` set the
    /// cluster delivers the affected values alongside each event, otherwise
    /// only keys and metadata arrive.
    ///
    /// Handlers run on the connection's read task: keep them short and never
    /// block in them.
    pub async fn add_entry_listener(
        &self,
        include_value: bool,
        handlers: EntryHandlers<K, V>,
    ) -> Result<ListenerRegistration> {
        if handlers.is_empty() {
            return Err(GridError::InvalidArgument(
                "entry listener requires at least one handler".to_string(),
            ));
        }

        let request =
            map_codec::encode_add_entry_listener(&self.name, include_value, handlers.flags());
        let response = self.invoke_on_owner(request).await?;
        let registration_id = map_codec::decode_registration_response(&response)?;

        let active = Arc::new(AtomicBool::new(true));
        self.listeners.register(
            registration_id,
            Arc::clone(&active),
            Box::new(move |message| dispatch_entry_event(message, &handlers)),
        );
        tracing::debug!(
            map = %self.name,
            registration_id = %registration_id,
            "entry listener added"
        );
        Ok(ListenerRegistration::new(registration_id, active))
    }

    /// Removes an entry-listener subscription.
    ///
    /// Local dispatch stops before the cluster is told, so no event can reach
    /// the handlers once this call has begun. Returns whether the cluster
    /// knew the registration.
    pub async fn remove_entry_listener(
        &self,
        registration: &ListenerRegistration,
    ) -> Result<bool> {
        registration.deactivate();
        self.listeners.deregister(&registration.id());

        let request = map_codec::encode_remove_entry_listener(&self.name, registration.id());
        let response = self.invoke_on_owner(request).await?;
        let removed = map_codec::decode_bool_response(&response)?;
        tracing::debug!(
            map = %self.name,
            registration_id = %registration.id(),
            removed,
            "entry listener removed"
        );
        Ok(removed)
    }

    async fn contains_key_inner(&self, key: RoutableKey) -> Result<bool> {
        let response = self
            .invoke_on_partition(&key, |partition_id| {
                map_codec::encode_contains_key(&self.name, &key, partition_id)
            })
            .await?;
        map_codec::decode_bool_response(&response)
    }

    async fn get_inner(&self, key: RoutableKey) -> Result<Option<V>> {
        let response = self
            .invoke_on_partition(&key, |partition_id| {
                map_codec::encode_get(&self.name, &key, partition_id)
            })
            .await?;
        decode_value(&response)
    }

    async fn put_inner(
        &self,
        key: RoutableKey,
        value: Vec<u8>,
        ttl_millis: i64,
    ) -> Result<Option<V>> {
        let response = self
            .invoke_on_partition(&key, |partition_id| {
                map_codec::encode_put(&self.name, &key, &value, ttl_millis, partition_id)
            })
            .await?;
        decode_value(&response)
    }

    async fn remove_inner(&self, key: RoutableKey) -> Result<Option<V>> {
        let response = self
            .invoke_on_partition(&key, |partition_id| {
                map_codec::encode_remove(&self.name, &key, partition_id)
            })
            .await?;
        decode_value(&response)
    }

    async fn size_inner(&self) -> Result<i32> {
        let response = self.invoke_on_owner(map_codec::encode_size(&self.name)).await?;
        map_codec::decode_int_response(&response)
    }

    /// Routes a request to the member owning the key's partition.
    async fn invoke_on_partition(
        &self,
        key: &RoutableKey,
        build: impl FnOnce(i32) -> ClientMessage,
    ) -> Result<ClientMessage> {
        let partition_id = self.partitions.partition_id(key).await?;
        let owner = self.partitions.partition_owner(partition_id).await?;
        let connection = self.connections.connection(owner).await.ok_or_else(|| {
            GridError::Connection(format!("no connection to partition owner {}", owner))
        })?;
        self.invoker
            .invoke_on_connection(build(partition_id), &connection)
            .await
    }

    async fn invoke_on_owner(&self, request: ClientMessage) -> Result<ClientMessage> {
        let connection = self
            .connections
            .owner_connection()
            .await
            .ok_or_else(|| GridError::Connection("no owner connection".to_string()))?;
        self.invoker.invoke_on_connection(request, &connection).await
    }

    fn routable_key(&self, key: &K) -> Result<RoutableKey> {
        let key = RoutableKey::from_value(key)?;
        if key.is_empty() {
            return Err(GridError::InvalidArgument(
                "map key serializes to nothing".to_string(),
            ));
        }
        Ok(key)
    }

    fn routable_entry(&self, key: &K, value: &V) -> Result<(RoutableKey, Vec<u8>)> {
        let key = self.routable_key(key)?;
        let value = value.to_bytes()?;
        if value.is_empty() {
            return Err(GridError::InvalidArgument(
                "map value serializes to nothing".to_string(),
            ));
        }
        Ok((key, value))
    }
}

/// Converts a TTL to wire milliseconds, saturating so an oversized duration
/// can never wrap into the negative no-expiry sentinel.
fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

fn decode_value<V: Deserializable>(response: &ClientMessage) -> Result<Option<V>> {
    map_codec::decode_value_response(response)?
        .map(|data| V::from_bytes(&data))
        .transpose()
}

/// Decodes one event push message and hands it to the matching handler.
///
/// A kind flag outside the known set, or a kind the registration never
/// subscribed to, is a protocol defect and surfaces as an error.
fn dispatch_entry_event<K, V>(message: &ClientMessage, handlers: &EntryHandlers<K, V>) -> Result<()>
where
    K: Deserializable,
    V: Deserializable,
{
    let raw = map_codec::decode_entry_event(message)?;
    let kind = EntryEventKind::from_flag(raw.kind_flag).ok_or_else(|| {
        GridError::Protocol(format!("unknown entry event kind flag {}", raw.kind_flag))
    })?;
    let handler = handlers.get(kind).ok_or_else(|| {
        GridError::Protocol(format!("received {} event without a matching handler", kind))
    })?;

    handler(EntryEvent {
        key: raw.key.as_deref().map(K::from_bytes).transpose()?,
        value: raw.value.as_deref().map(V::from_bytes).transpose()?,
        old_value: raw.old_value.as_deref().map(V::from_bytes).transpose()?,
        merging_value: raw.merging_value.as_deref().map(V::from_bytes).transpose()?,
        kind,
        member: raw.member,
        affected_entries: raw.affected_entries,
    });
    Ok(())
}

impl<K, V> std::fmt::Debug for GridMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridMap").field("name", &self.name).finish()
    }
}
