//! Connection primitives
//!
//! A subscriber connection is a long-lived stream of pre-formatted SSE
//! frames. The hub owns the sending half (`EventSink`); the transport
//! layer holds the receiving half through its `Subscription` and writes
//! frames to the HTTP response body. Dropping the subscription closes the
//! channel, which the hub observes as a sink failure on the next delivery
//! and answers by unregistering the connection.

use std::future::Future;
use std::io;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

/// Opaque subscriber connection id
pub type ConnectionId = String;

/// The sink half of a subscriber connection
///
/// Sends never block; frames queue until the subscriber drains them or
/// disconnects.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Bytes>,
}

/// Error returned when a sink's subscriber is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

impl std::fmt::Display for SinkClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscriber sink is closed")
    }
}

impl std::error::Error for SinkClosed {}

impl EventSink {
    /// Create a connected sink/receiver pair
    pub(crate) fn channel() -> (EventSink, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink { tx }, rx)
    }

    /// Enqueue a frame for the subscriber
    pub fn send(&self, frame: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(frame).map_err(|_| SinkClosed)
    }
}

/// A live subscriber stream handed back from `subscribe`
///
/// The first frame received is always the connection acknowledgement
/// comment carrying `connection_id`.
#[derive(Debug)]
pub struct Subscription {
    /// The resolved connection id
    pub connection_id: ConnectionId,
    frames: mpsc::UnboundedReceiver<Bytes>,
}

impl Subscription {
    pub(crate) fn new(connection_id: ConnectionId, frames: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self {
            connection_id,
            frames,
        }
    }

    /// Wait for the next frame
    ///
    /// Returns `None` once the hub has dropped the connection.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.frames.recv().await
    }

    /// Take the next frame if one is already queued
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.frames.try_recv().ok()
    }
}

/// Per-connection state owned by the hub
#[derive(Debug)]
pub(crate) struct ConnectionEntry {
    /// Topics this connection subscribed with, in subscription order
    pub(crate) topics: Vec<String>,
    /// Owned output sink
    pub(crate) sink: EventSink,
}

/// A deferred, at-most-once event payload reader
///
/// The hub consumes the source only when at least one requested topic has
/// a live subscriber, so a publish addressed to idle topics performs no
/// payload I/O at all.
pub struct PayloadSource {
    inner: Box<dyn FnOnce() -> BoxFuture<'static, io::Result<String>> + Send>,
}

impl PayloadSource {
    /// Wrap an already-materialized payload
    pub fn text(payload: impl Into<String>) -> Self {
        let payload = payload.into();
        Self::from_fn(move || async move { Ok(payload) })
    }

    /// Defer to a closure that reads the payload on demand
    pub fn from_fn<F, Fut>(read: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = io::Result<String>> + Send + 'static,
    {
        Self {
            inner: Box::new(move || Box::pin(read())),
        }
    }

    /// Consume the source and read the payload
    pub(crate) async fn read(self) -> io::Result<String> {
        (self.inner)().await
    }
}

impl std::fmt::Debug for PayloadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sink_delivers_to_subscription() {
        let (sink, rx) = EventSink::channel();
        let mut subscription = Subscription::new("conn-1".to_string(), rx);

        sink.send(Bytes::from_static(b"frame")).unwrap();
        assert_eq!(subscription.try_recv(), Some(Bytes::from_static(b"frame")));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_send_fails_after_subscription_dropped() {
        let (sink, rx) = EventSink::channel();
        drop(rx);

        assert_eq!(sink.send(Bytes::from_static(b"frame")), Err(SinkClosed));
    }

    #[tokio::test]
    async fn test_payload_source_reads_once() {
        let source = PayloadSource::text("hello");
        assert_eq!(source.read().await.unwrap(), "hello");
    }
}
