// src/connection/mod.rs

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub type ConnectionId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One accepted client stream.
///
/// A connection is owned by exactly one component at a time: the acceptor
/// holds it briefly between accept and enqueue, then the queue, then the
/// worker that dequeued it. Whoever finishes with it closes it by dropping;
/// the worker goes through [`Connection::finish`] so the reply is written
/// first.
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            peer,
            stream,
        }
    }

    /// Process-unique, monotonically assigned.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Write the reply, flush, and shut the write half down so the client
    /// sees EOF. Consumes the connection; the socket closes on drop.
    pub async fn finish(mut self, reply: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(reply).await?;
        self.stream.shutdown().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .finish()
    }
}
