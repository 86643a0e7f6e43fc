//! Hands committed writes to the registry off the request path.
//!
//! Handlers push `(room_id, event)` onto an unbounded queue and return; a single
//! broadcaster task drains the queue in order and calls `ConnectionRegistry::broadcast`.
//!
//! The writer's HTTP response and the viewers' frames are not ordered against
//! each other; a viewer may see an event before its author sees the response.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::events::QaEvent;
use super::ConnectionRegistry;

#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: mpsc::UnboundedSender<(Uuid, QaEvent)>,
}

impl EventDispatcher {
    /// Start the broadcaster loop and return a handle for producers.
    ///
    /// The loop exits when `shutdown` fires or every `EventDispatcher` clone is dropped.
    pub fn spawn(
        registry: ConnectionRegistry,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_broadcaster(registry, rx, shutdown));
        (Self { tx }, handle)
    }

    /// Queue `event` for the viewers of `room_id`. Never blocks, never fails the caller.
    pub fn dispatch(&self, room_id: Uuid, event: QaEvent) {
        if let Err(e) = self.tx.send((room_id, event)) {
            let (room_id, event) = e.0;
            tracing::warn!(
                %room_id,
                kind = event.kind(),
                "broadcaster stopped, dropping event"
            );
        }
    }
}

async fn run_broadcaster(
    registry: ConnectionRegistry,
    mut rx: mpsc::UnboundedReceiver<(Uuid, QaEvent)>,
    shutdown: CancellationToken,
) {
    tracing::info!("event broadcaster started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = rx.recv() => {
                let Some((room_id, event)) = next else { break };
                let delivered = registry.broadcast(room_id, &event);
                tracing::debug!(%room_id, kind = event.kind(), delivered, "event dispatched");
            }
        }
    }

    tracing::info!("event broadcaster stopped");
}
