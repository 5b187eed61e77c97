//! Subscriber streaming session
//!
//! Drives one open stream: register with the hub, forward each delivered message to the
//! transport as an event frame, and unregister when either side goes away.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::hub::{Hub, Message, SubscriberId, Subscription};
use crate::stats::SessionStats;
use crate::wire;

use super::sink::EventSink;

/// Why a streaming loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer disconnected or the transport failed
    PeerClosed,
    /// The hub dropped this subscriber's queue (shutdown or slow-consumer disconnect)
    HubClosed,
}

enum Wake {
    Delivered(Arc<Message>),
    Closed(CloseReason),
}

/// One live subscriber stream
pub struct SubscriberSession<S> {
    subscription: Subscription,
    sink: S,
    stats: SessionStats,
}

impl<S: EventSink> SubscriberSession<S> {
    /// Register a new subscriber that writes to `sink`
    ///
    /// Fails with [`Error::StreamingUnsupported`] before any registration happens if the
    /// sink cannot flush frames incrementally.
    pub fn open(hub: &Hub, sink: S) -> Result<Self> {
        if !sink.supports_streaming() {
            tracing::warn!("Rejecting stream: transport cannot flush");
            return Err(Error::StreamingUnsupported);
        }

        let subscription = hub.register()?;
        tracing::debug!(subscriber_id = %subscription.id(), "Subscriber stream opened");

        Ok(Self {
            subscription,
            sink,
            stats: SessionStats::new(),
        })
    }

    /// Identity assigned by the hub
    pub fn id(&self) -> SubscriberId {
        self.subscription.id()
    }

    /// Stream messages until the peer or the hub closes
    ///
    /// The registration is released when this returns, or when the future is dropped.
    pub async fn run(mut self) -> SessionStats {
        let started = Instant::now();

        let reason = loop {
            let wake = tokio::select! {
                delivered = self.subscription.recv() => match delivered {
                    Some(message) => Wake::Delivered(message),
                    None => Wake::Closed(CloseReason::HubClosed),
                },
                () = self.sink.closed() => Wake::Closed(CloseReason::PeerClosed),
            };

            let message = match wake {
                Wake::Delivered(message) => message,
                Wake::Closed(reason) => break reason,
            };

            let frame = match wire::encode_frame(&message) {
                Ok(frame) => frame,
                Err(e) => {
                    self.stats.serialization_failures += 1;
                    tracing::warn!(
                        subscriber_id = %self.id(),
                        label = message.label(),
                        error = %e,
                        "Skipping message"
                    );
                    continue;
                }
            };

            let len = frame.len();
            if self.sink.send_frame(frame).await.is_err() {
                break CloseReason::PeerClosed;
            }
            self.stats.record_frame(len);
        };

        self.stats.duration = started.elapsed();

        tracing::debug!(
            subscriber_id = %self.id(),
            reason = ?reason,
            frames = self.stats.frames_sent,
            bytes = self.stats.bytes_sent,
            "Subscriber stream closed"
        );

        self.stats
    }
}
