//! Lifetime of one live viewer.
//!
//! `admit` checks the room and registers the viewer; the returned
//! [`LiveSubscription`] owns the registration and removes it when dropped.
//! `run_viewer` drives the socket until the subscription is cancelled, from
//! either side.

use actix_ws::{CloseReason, Message, MessageStream, Session};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::transport::Transport;
use super::{ConnectionRegistry, SubscriberId};
use crate::config::LiveViewSettings;
use crate::error::{AppError, AppResult};

/// Answers whether a room exists. Consulted once per live-view attempt.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn room_exists(&self, room_id: Uuid) -> AppResult<bool>;
}

/// A viewer's registration in a room.
///
/// Dropping it fires the cancellation token and unsubscribes, so every exit
/// path of the connection task cleans up exactly once.
pub struct LiveSubscription {
    registry: ConnectionRegistry,
    room_id: Uuid,
    id: SubscriberId,
    cancel: CancellationToken,
}

impl LiveSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Resolves once the registry drops this viewer or the parent context ends.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Park until cancelled, then tear down.
    #[cfg(test)]
    pub(crate) async fn wait(self) {
        self.cancelled().await;
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.registry.unsubscribe(self.room_id, self.id);
        tracing::debug!(room_id = %self.room_id, subscriber_id = %self.id, "viewer torn down");
    }
}

/// Register `transport` as a viewer of `room_id` once the room is known to exist.
///
/// Nothing is registered when the room is missing or the lookup fails.
pub async fn admit<D, T>(
    directory: &D,
    registry: &ConnectionRegistry,
    room_id: Uuid,
    transport: T,
    parent: &CancellationToken,
) -> AppResult<LiveSubscription>
where
    D: RoomDirectory + ?Sized,
    T: Transport,
{
    if !directory.room_exists(room_id).await? {
        return Err(AppError::RoomNotFound);
    }

    let cancel = parent.child_token();
    let id = registry.subscribe(room_id, transport, cancel.clone());

    Ok(LiveSubscription {
        registry: registry.clone(),
        room_id,
        id,
        cancel,
    })
}

/// Pump one viewer socket until its subscription is cancelled.
///
/// Queued frames from `outbound` are written to the socket in order. Client
/// pings are answered, inbound data frames are ignored, and a viewer that stays
/// silent longer than `client_timeout` is dropped.
pub async fn run_viewer(
    subscription: LiveSubscription,
    mut session: Session,
    mut msg_stream: MessageStream,
    mut outbound: mpsc::Receiver<String>,
    settings: LiveViewSettings,
) {
    let room_id = subscription.room_id();
    let subscriber_id = subscription.id();
    let mut heartbeat = interval_at(
        Instant::now() + settings.heartbeat_interval,
        settings.heartbeat_interval,
    );
    let mut last_seen = Instant::now();

    let close_reason: Option<CloseReason> = loop {
        tokio::select! {
            _ = subscription.cancelled() => break None,

            frame = outbound.recv() => {
                let Some(frame) = frame else { break None };
                if session.text(frame).await.is_err() {
                    tracing::debug!(%room_id, %subscriber_id, "socket write failed");
                    break None;
                }
            }

            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(bytes))) => {
                        last_seen = Instant::now();
                        if session.pong(&bytes).await.is_err() {
                            break None;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        tracing::debug!(%room_id, %subscriber_id, ?reason, "viewer closed connection");
                        break reason;
                    }
                    Some(Ok(_)) => {
                        // read-only channel, anything else just proves liveness
                        last_seen = Instant::now();
                    }
                    Some(Err(e)) => {
                        tracing::warn!(%room_id, %subscriber_id, error = %e, "websocket protocol error");
                        break None;
                    }
                    None => break None,
                }
            }

            _ = heartbeat.tick() => {
                if last_seen.elapsed() > settings.client_timeout {
                    tracing::warn!(%room_id, %subscriber_id, "viewer heartbeat timed out");
                    break None;
                }
                if session.ping(b"").await.is_err() {
                    break None;
                }
            }
        }
    };

    drop(subscription);
    let _ = session.close(close_reason).await;
}
