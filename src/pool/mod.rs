// src/pool/mod.rs
mod worker;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::processor::ConnectionProcessor;
use crate::queue::ConnectionQueue;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool needs at least one worker, got {0}")]
    InvalidSize(usize),
}

/// Fixed set of worker loops draining the shared connection queue.
///
/// The size is set once at construction and never changes. Each worker is a
/// long-lived task that processes arbitrarily many connections; the pool
/// stops by closing the queue, not by killing workers mid-item.
pub struct WorkerPool {
    queue: Arc<ConnectionQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers consuming from `queue`. Fails without spawning
    /// anything when `size` is zero.
    pub fn new(
        size: usize,
        queue: Arc<ConnectionQueue>,
        processor: Arc<dyn ConnectionProcessor>,
    ) -> Result<Self, PoolError> {
        if size < 1 {
            return Err(PoolError::InvalidSize(size));
        }

        let workers: Vec<_> = (0..size)
            .map(|id| {
                let queue = queue.clone();
                let processor = processor.clone();
                tokio::spawn(worker::run(id, queue, processor))
            })
            .collect();

        info!("worker pool started with {} workers", workers.len());
        Ok(Self { queue, workers })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue and wait for the workers to drain the backlog.
    /// Workers still running when `grace` expires are aborted. Returns
    /// `true` when every worker exited on its own.
    pub async fn shutdown(mut self, grace: Duration) -> bool {
        self.queue.close();

        let aborts: Vec<_> = self.workers.iter().map(|w| w.abort_handle()).collect();
        let drained = timeout(grace, join_all(self.workers.drain(..)))
            .await
            .is_ok();

        if !drained {
            warn!("shutdown grace period expired, aborting remaining workers");
            for handle in aborts {
                handle.abort();
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::StaticResponder;

    #[tokio::test]
    async fn rejects_empty_pool() {
        let queue = Arc::new(ConnectionQueue::new());
        let processor = Arc::new(StaticResponder::new("x"));

        let err = WorkerPool::new(0, queue.clone(), processor).err().unwrap();
        assert!(matches!(err, PoolError::InvalidSize(0)));

        // nothing was spawned: the queue has no consumer to close for
        assert!(!queue.is_closed());
    }

    #[tokio::test]
    async fn spawns_exactly_the_requested_workers() {
        for size in [1, 3, 10] {
            let queue = Arc::new(ConnectionQueue::new());
            let processor = Arc::new(StaticResponder::new("x"));

            let pool = WorkerPool::new(size, queue, processor).unwrap();
            assert_eq!(pool.worker_count(), size);
            assert!(pool.shutdown(Duration::from_secs(1)).await);
        }
    }
}
