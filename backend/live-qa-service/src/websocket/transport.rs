//! Outbound side of a viewer connection.
//!
//! The registry only ever needs a synchronous, non-blocking `send`; whatever
//! actually owns the socket drains frames on its own task.

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("viewer connection closed")]
    Closed,
    #[error("viewer outbound buffer is full")]
    Full,
}

/// A channel that can accept one serialized frame at a time without blocking.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, payload: &str) -> Result<(), TransportError>;
}

/// Bounded queue in front of a socket writer.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, payload: &str) -> Result<(), TransportError> {
        self.tx.try_send(payload.to_owned()).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_frames_arrive_in_order() {
        let (transport, mut rx) = ChannelTransport::new(4);
        transport.send("one").unwrap();
        transport.send("two").unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
    }

    #[test]
    fn full_buffer_is_reported() {
        let (transport, _rx) = ChannelTransport::new(1);
        transport.send("first").unwrap();
        assert_eq!(transport.send("second"), Err(TransportError::Full));
    }

    #[test]
    fn dropped_receiver_is_reported_as_closed() {
        let (transport, rx) = ChannelTransport::new(1);
        drop(rx);
        assert_eq!(transport.send("hello"), Err(TransportError::Closed));
    }
}
