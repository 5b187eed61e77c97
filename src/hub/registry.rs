//! Subscriber registry
//!
//! Owned by the hub control loop and never shared, so it needs no locking. Registration,
//! removal and dispatch iteration are serialized by the loop itself.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::message::{Message, SubscriberId};

/// Sending half of a subscriber's delivery queue
pub(crate) type EventSender = mpsc::Sender<Arc<Message>>;

/// Map of subscriber identity to delivery queue
#[derive(Debug, Default)]
pub(crate) struct Registry {
    subscribers: HashMap<SubscriberId, EventSender>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. Returns false if the identity was already present.
    pub(crate) fn insert(&mut self, id: SubscriberId, events: EventSender) -> bool {
        self.subscribers.insert(id, events).is_none()
    }

    /// Remove a subscriber. Removing an absent identity is a no-op.
    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Registered identities in ascending order
    pub(crate) fn ids(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<SubscriberId> = self.subscribers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Snapshot of the current queues, taken before a dispatch
    pub(crate) fn snapshot(&self) -> Vec<(SubscriberId, EventSender)> {
        self.subscribers
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    /// Drop every queue sender
    pub(crate) fn clear(&mut self) {
        self.subscribers.clear();
    }
}
