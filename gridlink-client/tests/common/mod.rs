//! In-memory cluster fake shared by the integration tests.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gridlink_client::codec::{cluster as cluster_codec, map as map_codec};
use gridlink_client::connection::{ConnectionId, ConnectionRef, ConnectionRegistry};
use gridlink_client::Invoker;
use gridlink_core::protocol::constants::*;
use gridlink_core::{ClientMessage, GridError, Result};
use uuid::Uuid;

/// Serves the wire protocol from an in-memory store, without sockets.
///
/// The first configured address doubles as the owner connection. The owner
/// can be made unavailable to exercise refresh skipping and first-table
/// waits.
pub struct FakeCluster {
    addresses: Vec<SocketAddr>,
    refs: HashMap<SocketAddr, ConnectionRef>,
    layout: Mutex<HashMap<SocketAddr, Vec<i32>>>,
    store: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    registrations: Mutex<Vec<Uuid>>,
    last_put_ttl: Mutex<Option<i64>>,
    owner_present: AtomicBool,
    invocations: AtomicU32,
}

impl FakeCluster {
    pub fn new(layout: Vec<(SocketAddr, Vec<i32>)>) -> Self {
        let addresses: Vec<SocketAddr> = layout.iter().map(|(addr, _)| *addr).collect();
        let refs = addresses
            .iter()
            .map(|&addr| (addr, ConnectionRef::new(ConnectionId::new(), addr)))
            .collect();
        Self {
            addresses,
            refs,
            layout: Mutex::new(layout.into_iter().collect()),
            store: Mutex::new(HashMap::new()),
            registrations: Mutex::new(Vec::new()),
            last_put_ttl: Mutex::new(None),
            owner_present: AtomicBool::new(true),
            invocations: AtomicU32::new(0),
        }
    }

    /// A layout spreading 271 partitions over two members.
    pub fn two_member_layout() -> Vec<(SocketAddr, Vec<i32>)> {
        vec![
            ("10.0.0.1:5701".parse().unwrap(), (0..135).collect()),
            ("10.0.0.2:5701".parse().unwrap(), (135..271).collect()),
        ]
    }

    pub fn set_owner_present(&self, present: bool) {
        self.owner_present.store(present, Ordering::Release);
    }

    pub fn set_layout(&self, layout: Vec<(SocketAddr, Vec<i32>)>) {
        *self.layout.lock().unwrap() = layout.into_iter().collect();
    }

    pub fn invocation_count(&self) -> u32 {
        self.invocations.load(Ordering::Acquire)
    }

    pub fn registrations(&self) -> Vec<Uuid> {
        self.registrations.lock().unwrap().clone()
    }

    /// The TTL carried by the most recent put request, in milliseconds.
    pub fn last_put_ttl(&self) -> Option<i64> {
        *self.last_put_ttl.lock().unwrap()
    }

    fn frame_bytes(request: &ClientMessage, index: usize) -> Vec<u8> {
        request.frames()[index].content.to_vec()
    }

    fn serve(&self, request: ClientMessage) -> Result<ClientMessage> {
        let message_type = request
            .message_type()
            .ok_or_else(|| GridError::Protocol("request missing type".to_string()))?;
        let correlation_id = request
            .correlation_id()
            .ok_or_else(|| GridError::Protocol("request missing correlation ID".to_string()))?;

        match message_type {
            CLUSTER_GET_PARTITIONS => Ok(cluster_codec::encode_get_partitions_response(
                correlation_id,
                &self.layout.lock().unwrap(),
            )),
            MAP_CONTAINS_KEY => {
                let key = Self::frame_bytes(&request, 2);
                let present = self.store.lock().unwrap().contains_key(&key);
                Ok(map_codec::encode_bool_response(
                    message_type,
                    correlation_id,
                    present,
                ))
            }
            MAP_GET => {
                let key = Self::frame_bytes(&request, 2);
                let value = self.store.lock().unwrap().get(&key).cloned();
                Ok(map_codec::encode_value_response(
                    message_type,
                    correlation_id,
                    value.as_deref(),
                ))
            }
            MAP_PUT => {
                let key = Self::frame_bytes(&request, 2);
                let value = Self::frame_bytes(&request, 3);
                let ttl_bytes: [u8; 8] = Self::frame_bytes(&request, 4)
                    .try_into()
                    .map_err(|_| GridError::Protocol("malformed TTL frame".to_string()))?;
                *self.last_put_ttl.lock().unwrap() = Some(i64::from_le_bytes(ttl_bytes));
                let previous = self.store.lock().unwrap().insert(key, value);
                Ok(map_codec::encode_value_response(
                    message_type,
                    correlation_id,
                    previous.as_deref(),
                ))
            }
            MAP_REMOVE => {
                let key = Self::frame_bytes(&request, 2);
                let previous = self.store.lock().unwrap().remove(&key);
                Ok(map_codec::encode_value_response(
                    message_type,
                    correlation_id,
                    previous.as_deref(),
                ))
            }
            MAP_SIZE => {
                let size = self.store.lock().unwrap().len() as i32;
                Ok(map_codec::encode_int_response(
                    message_type,
                    correlation_id,
                    size,
                ))
            }
            MAP_ADD_ENTRY_LISTENER => {
                let registration_id = Uuid::new_v4();
                self.registrations.lock().unwrap().push(registration_id);
                Ok(map_codec::encode_registration_response(
                    correlation_id,
                    registration_id,
                ))
            }
            MAP_REMOVE_ENTRY_LISTENER => {
                let id_bytes = Self::frame_bytes(&request, 2);
                let id = Uuid::from_slice(&id_bytes)
                    .map_err(|e| GridError::Protocol(e.to_string()))?;
                let mut registrations = self.registrations.lock().unwrap();
                let known = registrations.contains(&id);
                registrations.retain(|r| *r != id);
                Ok(map_codec::encode_bool_response(
                    message_type,
                    correlation_id,
                    known,
                ))
            }
            other => Err(GridError::Protocol(format!(
                "fake cluster cannot serve message type {:#x}",
                other
            ))),
        }
    }
}

#[async_trait]
impl ConnectionRegistry for FakeCluster {
    async fn owner_connection(&self) -> Option<ConnectionRef> {
        if !self.owner_present.load(Ordering::Acquire) {
            return None;
        }
        self.addresses.first().and_then(|addr| self.refs.get(addr)).copied()
    }

    async fn connection(&self, address: SocketAddr) -> Option<ConnectionRef> {
        self.refs.get(&address).copied()
    }
}

#[async_trait]
impl Invoker for FakeCluster {
    async fn invoke_on_connection(
        &self,
        request: ClientMessage,
        _connection: &ConnectionRef,
    ) -> Result<ClientMessage> {
        self.invocations.fetch_add(1, Ordering::AcqRel);
        self.serve(request)
    }
}
