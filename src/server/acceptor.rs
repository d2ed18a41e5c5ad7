// src/server/acceptor.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::queue::ConnectionQueue;
use crate::shutdown::Shutdown;

/// Pause after a failed accept so a persistent error (fd exhaustion, for
/// example) does not turn the loop into a hot spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accept loop feeding the shared queue.
///
/// Runs until the shutdown signal fires. Accepted connections are queued
/// for the workers; accept errors are logged and the loop keeps going.
pub struct Acceptor {
    listener: TcpListener,
    queue: Arc<ConnectionQueue>,
    shutdown: Shutdown,
}

impl Acceptor {
    pub fn new(listener: TcpListener, queue: Arc<ConnectionQueue>, shutdown: Shutdown) -> Self {
        Self {
            listener,
            queue,
            shutdown,
        }
    }

    /// Drive the accept loop. On exit the queue is closed so the workers
    /// can drain the backlog and stop.
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.triggered() => {
                    info!("shutdown signal received, no longer accepting");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let conn = Connection::new(stream, peer);
                        let depth = self.queue.push(conn).await;
                        info!("accepted connection from {}, {} queued", peer, depth);
                    }
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        sleep(ACCEPT_RETRY_DELAY).await;
                    }
                }
            }
        }

        self.queue.close();
    }
}
