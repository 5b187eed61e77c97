//! Hub handle
//!
//! [`Hub`] is the cloneable front door to the control loop. Every operation is a command on
//! an unbounded queue, so the handle can be used from request handlers, streaming loops and
//! `Drop` impls alike.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::stats::HubStats;

use super::config::HubConfig;
use super::control::{Command, ControlLoop};
use super::error::HubError;
use super::message::{Message, Payload, SubscriberId};
use super::subscription::Subscription;

/// Handle to the broadcast hub
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
    next_id: Arc<AtomicU64>,
    queue_capacity: usize,
}

impl Hub {
    /// Start a hub with default configuration on the current runtime
    pub fn new() -> Self {
        Self::spawn(HubConfig::default())
    }

    /// Start a hub on the current runtime
    ///
    /// The control loop runs until [`Hub::shutdown`] is called or every handle is dropped.
    pub fn spawn(config: HubConfig) -> Self {
        let (hub, control) = Self::build(config);
        tokio::spawn(control.run());
        hub
    }

    fn build(config: HubConfig) -> (Self, ControlLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            commands: tx,
            next_id: Arc::new(AtomicU64::new(0)),
            queue_capacity: config.queue_capacity.max(1),
        };

        (hub, ControlLoop::new(rx, config))
    }

    /// Register a new subscriber
    ///
    /// Allocates the next identity and an empty delivery queue. The registration is
    /// visible to every publish submitted after this call returns.
    pub fn register(&self) -> Result<Subscription, HubError> {
        let id = SubscriberId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        self.send(Command::Register { id, events: tx })?;

        Ok(Subscription::new(id, rx, self.clone()))
    }

    /// Remove a subscriber. Unknown identities and a closed hub are both no-ops.
    pub fn unregister(&self, id: SubscriberId) {
        let _ = self.send(Command::Unregister { id });
    }

    /// Publish a message to every registered subscriber
    ///
    /// Returns once the message is queued for the control loop. Delivery happens
    /// asynchronously and is not confirmed.
    pub fn publish(
        &self,
        payload: impl Into<Payload>,
        label: impl Into<String>,
    ) -> Result<(), HubError> {
        self.publish_message(Message::new(payload, label))
    }

    /// Publish an already built message
    pub fn publish_message(&self, message: Message) -> Result<(), HubError> {
        self.send(Command::Publish {
            message: Arc::new(message),
        })
    }

    /// Current hub counters
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stats { reply })?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Identities currently in the registry, ascending
    pub async fn subscriber_ids(&self) -> Result<Vec<SubscriberId>, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Subscribers { reply })?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Stop the control loop
    ///
    /// Commands already queued ahead of the shutdown are still processed. Every open
    /// subscription then sees its queue end.
    pub fn shutdown(&self) {
        if self.send(Command::Shutdown).is_ok() {
            tracing::info!("Hub shutdown requested");
        }
    }

    /// Whether the control loop has stopped accepting commands
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), HubError> {
        self.commands.send(command).map_err(|_| HubError::Closed)
    }
}

/// Same as [`Hub::new`]: must be called from within a tokio runtime.
impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("queue_capacity", &self.queue_capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}
