// src/queue/mod.rs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::connection::Connection;

/// FIFO of accepted connections shared between the acceptor and the workers.
///
/// A single mutex serializes every enqueue and dequeue, so each connection
/// is handed to exactly one caller and insertion order is preserved.
/// Consumers that find the queue empty park on a [`Notify`] instead of
/// polling; every `push` wakes one of them.
pub struct ConnectionQueue {
    items: Mutex<VecDeque<Connection>>,
    available: Notify,
    closed: AtomicBool,
}

impl ConnectionQueue {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Append a connection and wake one parked consumer. Returns the queue
    /// depth after the insert, which the acceptor reports in its logs.
    pub async fn push(&self, conn: Connection) -> usize {
        let mut items = self.items.lock().await;
        items.push_back(conn);
        let depth = items.len();
        drop(items);

        self.available.notify_one();
        depth
    }

    /// Non-blocking dequeue of the head element. `None` means the queue was
    /// empty — never that the lock was contended; every call completes.
    pub async fn try_pop(&self) -> Option<Connection> {
        self.items.lock().await.pop_front()
    }

    /// Dequeue the next connection, suspending while the queue is empty.
    ///
    /// Returns `None` only once the queue has been closed and the backlog
    /// is drained. Interest in the wakeup is registered before the
    /// emptiness re-check, so a push or close landing in between cannot be
    /// missed.
    pub async fn recv(&self) -> Option<Connection> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(conn) = self.try_pop().await {
                return Some(conn);
            }
            if self.is_closed() {
                return None;
            }

            notified.await;
        }
    }

    /// Mark the queue closed and wake every parked consumer. Connections
    /// already queued stay retrievable; `recv` reports exhaustion only once
    /// the backlog is drained. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

impl Default for ConnectionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    async fn test_conn(listener: &TcpListener) -> (Connection, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (stream, peer) = listener.accept().await.unwrap();
        (Connection::new(stream, peer), client)
    }

    #[tokio::test]
    async fn pops_in_insertion_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let queue = ConnectionQueue::new();
        let mut clients = Vec::new();
        let mut expected = Vec::new();

        for _ in 0..3 {
            let (conn, client) = test_conn(&listener).await;
            expected.push(conn.id());
            queue.push(conn).await;
            clients.push(client);
        }

        let mut got = Vec::new();
        while let Some(conn) = queue.try_pop().await {
            got.push(conn.id());
        }
        assert_eq!(got, expected);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn try_pop_on_empty_returns_none() {
        let queue = ConnectionQueue::new();
        assert!(queue.try_pop().await.is_none());
        assert_eq!(queue.len().await, 0);
    }

    #[tokio::test]
    async fn recv_blocks_until_push() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let queue = Arc::new(ConnectionQueue::new());

        // nothing queued: recv must stay pending, not spin-return
        assert!(timeout(Duration::from_millis(100), queue.recv())
            .await
            .is_err());

        let (conn, _client) = test_conn(&listener).await;
        let id = conn.id();

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(conn).await;

        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("recv should wake on push")
            .unwrap()
            .expect("queue is not closed");
        assert_eq!(got.id(), id);
    }

    #[tokio::test]
    async fn close_drains_backlog_then_reports_exhaustion() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let queue = ConnectionQueue::new();

        let (a, _ca) = test_conn(&listener).await;
        let (b, _cb) = test_conn(&listener).await;
        queue.push(a).await;
        queue.push(b).await;

        queue.close();
        queue.close(); // idempotent

        assert!(queue.recv().await.is_some());
        assert!(queue.recv().await.is_some());
        assert!(queue.recv().await.is_none());
    }

    #[tokio::test]
    async fn close_wakes_parked_consumer() {
        let queue = Arc::new(ConnectionQueue::new());
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.recv().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("recv should wake on close")
            .unwrap();
        assert!(got.is_none());
    }
}
