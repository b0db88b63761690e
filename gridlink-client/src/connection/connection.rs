//! Single framed connection to a cluster member.

use std::net::SocketAddr;

use bytes::BytesMut;
use gridlink_core::protocol::ClientMessageCodec;
use gridlink_core::{ClientMessage, GridError, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};

use super::{ConnectionId, ConnectionRef};

/// A connection to a single cluster member.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    address: SocketAddr,
    stream: TcpStream,
}

impl Connection {
    /// Establishes a new connection to the given address.
    pub async fn connect(address: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            GridError::Connection(format!("failed to connect to {}: {}", address, e))
        })?;

        stream
            .set_nodelay(true)
            .map_err(|e| GridError::Connection(format!("failed to set TCP_NODELAY: {}", e)))?;

        tracing::debug!(address = %address, "established connection");
        Ok(Self {
            id: ConnectionId::new(),
            address,
            stream,
        })
    }

    /// Returns the connection's unique identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote address of this connection.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns a routable reference to this connection.
    pub fn handle(&self) -> ConnectionRef {
        ConnectionRef::new(self.id, self.address)
    }

    /// Splits the connection into independent read and write halves.
    pub fn into_split(self) -> (ConnectionReader, ConnectionWriter) {
        let (read_half, write_half) = self.stream.into_split();
        (
            ConnectionReader {
                address: self.address,
                read_half,
                codec: ClientMessageCodec::new(),
                buffer: BytesMut::with_capacity(8192),
            },
            ConnectionWriter {
                address: self.address,
                write_half,
            },
        )
    }
}

/// Read half of a split connection, yielding decoded messages.
#[derive(Debug)]
pub struct ConnectionReader {
    address: SocketAddr,
    read_half: OwnedReadHalf,
    codec: ClientMessageCodec,
    buffer: BytesMut,
}

impl ConnectionReader {
    /// Receives the next message from this connection.
    ///
    /// Returns `None` if the connection is closed cleanly.
    pub async fn receive(&mut self) -> Result<Option<ClientMessage>> {
        loop {
            if let Some(message) = self.codec.decode(&mut self.buffer)? {
                return Ok(Some(message));
            }

            let bytes_read = self.read_half.read_buf(&mut self.buffer).await.map_err(|e| {
                GridError::Connection(format!("failed to read from {}: {}", self.address, e))
            })?;

            if bytes_read == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(GridError::Connection(format!(
                    "connection to {} closed unexpectedly",
                    self.address
                )));
            }
        }
    }
}

/// Write half of a split connection, accepting encoded messages.
#[derive(Debug)]
pub struct ConnectionWriter {
    address: SocketAddr,
    write_half: OwnedWriteHalf,
}

impl ConnectionWriter {
    /// Sends a message over this connection.
    pub async fn send(&mut self, message: ClientMessage) -> Result<()> {
        let mut buf = BytesMut::new();
        ClientMessageCodec::new().encode(message, &mut buf)?;

        self.write_half.write_all(&buf).await.map_err(|e| {
            GridError::Connection(format!("failed to write to {}: {}", self.address, e))
        })?;
        Ok(())
    }
}
