//! Programmatic shutdown trigger.
//!
//! `main` and the integration tests create one [`Shutdown`] per service and
//! hand a receiver to [`Service::run`](crate::lifecycle::Service::run),
//! which passes it on to the HTTP server. The server stops on whichever
//! comes first: this trigger or SIGINT/SIGTERM. After the listener drains,
//! `Service::run` closes the database and reports how that went.
//!
//! Subscribe before triggering. A receiver only sees triggers sent after it
//! was created, so the receiver must exist before the service is spawned;
//! it does not have to be polled yet.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for the next trigger.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed service. Harmless when nothing is subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
