//! Shutdown coordination.

use std::future::Future;
use std::io;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::http::HttpServer;
use crate::lifecycle::TerminationSignal;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<TerminationSignal>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<TerminationSignal> {
        self.tx.subscribe()
    }

    /// Broadcast the signal that ends the process.
    pub fn trigger(&self, signal: TerminationSignal) {
        let _ = self.tx.send(signal);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve until `signal` resolves, then drain and return the signal.
///
/// The watcher task is joined rather than polled, so a signal that stopped
/// the server is always reported. If `signal` fails, the server keeps running.
pub async fn serve_until_signal<F>(
    server: HttpServer,
    listener: TcpListener,
    signal: F,
) -> io::Result<Option<TerminationSignal>>
where
    F: Future<Output = io::Result<TerminationSignal>> + Send + 'static,
{
    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let watcher = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match signal.await {
                Ok(signal) => {
                    shutdown.trigger(signal);
                    Some(signal)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install signal handlers");
                    None
                }
            }
        }
    });

    if let Err(e) = server.run(listener, stop).await {
        watcher.abort();
        return Err(e);
    }
    Ok(watcher.await.ok().flatten())
}
