//! Scoped subscriber registration

use std::sync::Arc;

use tokio::sync::mpsc;

use super::handle::Hub;
use super::message::{Message, SubscriberId};

/// A live registration with the hub
///
/// Owns the receiving half of the subscriber's delivery queue. Dropping it unregisters the
/// identity and then releases the queue, whatever the reason the owner stopped.
pub struct Subscription {
    id: SubscriberId,
    events: mpsc::Receiver<Arc<Message>>,
    hub: Hub,
}

impl Subscription {
    pub(super) fn new(id: SubscriberId, events: mpsc::Receiver<Arc<Message>>, hub: Hub) -> Self {
        Self { id, events, hub }
    }

    /// Identity of this subscriber
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next message
    ///
    /// Returns `None` once the hub has dropped this subscriber's queue, either on shutdown
    /// or because it was disconnected as a slow consumer.
    pub async fn recv(&mut self) -> Option<Arc<Message>> {
        self.events.recv().await
    }

    /// Take a queued message without waiting
    pub fn try_recv(&mut self) -> Option<Arc<Message>> {
        self.events.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
