// src/pool/worker.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::processor::ConnectionProcessor;
use crate::queue::ConnectionQueue;

/// Body of one worker loop.
///
/// Keeps receiving connections until the queue is closed and drained,
/// suspending while there is nothing to do. A failure on one connection is
/// logged and the loop moves on; nothing short of queue exhaustion stops a
/// worker.
pub(crate) async fn run(
    id: usize,
    queue: Arc<ConnectionQueue>,
    processor: Arc<dyn ConnectionProcessor>,
) {
    debug!("worker {} started", id);

    while let Some(mut conn) = queue.recv().await {
        let conn_id = conn.id();
        debug!(
            "worker {} picked up connection {} from {}",
            id,
            conn_id,
            conn.peer()
        );

        match processor.process(&mut conn).await {
            Ok(reply) => {
                // the worker owns the connection until the reply is written;
                // finish() closes it
                if let Err(e) = conn.finish(&reply).await {
                    warn!(
                        "worker {} failed writing reply to connection {}: {}",
                        id, conn_id, e
                    );
                }
            }
            Err(e) => {
                warn!("worker {} failed on connection {}: {}", id, conn_id, e);
            }
        }
    }

    info!("worker {} stopped", id);
}
