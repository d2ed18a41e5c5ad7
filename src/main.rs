// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use tcp_dispatch::{
    config::Config,
    pool::WorkerPool,
    processor::StaticResponder,
    queue::ConnectionQueue,
    server::{bind_tcp, Acceptor},
    shutdown::Shutdown,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tcp_dispatch=debug".parse()?),
        )
        .init();

    let config = Config::default();
    config.validate()?;

    let queue = Arc::new(ConnectionQueue::new());

    // The processor is the seam where request parsing and response
    // construction would plug in; for now every client gets the same bytes.
    let processor = Arc::new(StaticResponder::new(&b"tcp-dispatch: ok\n"[..]));
    let pool = WorkerPool::new(config.workers, queue.clone(), processor)?;

    let shutdown = Shutdown::new();
    let listener = bind_tcp(config.listen_addr).await?;

    let acceptor = Acceptor::new(listener, queue.clone(), shutdown.clone());
    let acceptor_task = tokio::spawn(acceptor.run());

    shutdown_signal().await;
    shutdown.trigger();

    acceptor_task.await?;
    if !pool.shutdown(config.shutdown_grace).await {
        warn!("workers did not drain within the grace period");
    }

    info!("shutdown complete");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
