use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::metrics;

pub mod dispatcher;
pub mod events;
pub mod lifecycle;
pub mod transport;

use events::QaEvent;
use transport::Transport;

/// Unique identifier for a live viewer registration
///
/// Handed out by `subscribe` and used for removal, so teardown never depends
/// on comparing connection handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct Subscriber {
    id: SubscriberId,
    transport: Box<dyn Transport>,
    cancel: CancellationToken,
}

/// Registry of live viewers, partitioned by room
///
/// One instance is built at startup and shared by cloning the handle. Every
/// operation takes the same lock; `broadcast` keeps it for the whole fan-out,
/// so subscribe/unsubscribe on that room wait until delivery finishes.
///
/// Room buckets are created on first subscribe and are not dropped when they
/// empty out.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    // room_id -> live subscribers
    inner: Arc<RwLock<HashMap<Uuid, Vec<Subscriber>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transport` as a viewer of `room_id`.
    ///
    /// `cancel` is fired if a later broadcast cannot write to the transport.
    /// The room is not validated here.
    pub fn subscribe<T: Transport>(
        &self,
        room_id: Uuid,
        transport: T,
        cancel: CancellationToken,
    ) -> SubscriberId {
        let subscriber_id = SubscriberId::new();
        let subscriber = Subscriber {
            id: subscriber_id,
            transport: Box::new(transport),
            cancel,
        };

        let mut guard = self.inner.write();
        let subscribers = guard.entry(room_id).or_default();
        subscribers.push(subscriber);
        metrics::subscriber_added();

        tracing::debug!(
            %room_id,
            %subscriber_id,
            total = subscribers.len(),
            "subscribed to room"
        );

        subscriber_id
    }

    /// Remove a subscriber. Returns false if it was already gone.
    pub fn unsubscribe(&self, room_id: Uuid, subscriber_id: SubscriberId) -> bool {
        let mut guard = self.inner.write();
        let Some(subscribers) = guard.get_mut(&room_id) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|s| s.id != subscriber_id);
        let removed = subscribers.len() != before;

        if removed {
            metrics::subscriber_removed();
            tracing::debug!(
                %room_id,
                %subscriber_id,
                remaining = subscribers.len(),
                "unsubscribed from room"
            );
        }

        removed
    }

    /// Fan `event` out to every current viewer of `room_id`.
    ///
    /// Returns how many viewers accepted the frame. Viewers whose write fails
    /// are dropped from the room and their cancellation token is fired.
    pub fn broadcast(&self, room_id: Uuid, event: &QaEvent) -> usize {
        let payload = match event.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(%room_id, kind = event.kind(), error = %e, "failed to serialize event");
                return 0;
            }
        };

        metrics::record_broadcast(event.kind());
        self.broadcast_payload(room_id, &payload)
    }

    /// Same as `broadcast`, for an already serialized frame.
    pub fn broadcast_payload(&self, room_id: Uuid, payload: &str) -> usize {
        let mut guard = self.inner.write();
        let Some(subscribers) = guard.get_mut(&room_id) else {
            return 0;
        };

        let mut delivered = 0;
        subscribers.retain(|subscriber| match subscriber.transport.send(payload) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    %room_id,
                    subscriber_id = %subscriber.id,
                    error = %e,
                    "delivery failed, dropping viewer"
                );
                subscriber.cancel.cancel();
                metrics::record_delivery_failure();
                metrics::subscriber_removed();
                false
            }
        });

        tracing::debug!(%room_id, delivered, "broadcast to room");
        delivered
    }

    /// Live viewers of one room
    pub fn subscriber_count(&self, room_id: Uuid) -> usize {
        self.inner.read().get(&room_id).map(Vec::len).unwrap_or(0)
    }

    /// Room buckets held, including empty ones
    pub fn room_count(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_subscribed(&self, room_id: Uuid, subscriber_id: SubscriberId) -> bool {
        self.inner
            .read()
            .get(&room_id)
            .is_some_and(|subs| subs.iter().any(|s| s.id == subscriber_id))
    }
}
