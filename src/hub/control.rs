//! Hub control loop
//!
//! The only task that reads or writes the [`Registry`]. Every register, unregister,
//! publish and query arrives as a [`Command`] and is handled to completion before the next
//! one is taken, so no dispatch ever sees a half-applied registration.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::stats::HubStats;

use super::config::{DeliveryPolicy, HubConfig};
use super::message::{Message, SubscriberId};
use super::registry::{EventSender, Registry};

/// Requests processed by the control loop, in arrival order
pub(crate) enum Command {
    Register {
        id: SubscriberId,
        events: EventSender,
    },
    Unregister {
        id: SubscriberId,
    },
    Publish {
        message: Arc<Message>,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    Subscribers {
        reply: oneshot::Sender<Vec<SubscriberId>>,
    },
    Shutdown,
}

pub(crate) struct ControlLoop {
    commands: mpsc::UnboundedReceiver<Command>,
    registry: Registry,
    config: HubConfig,
    stats: HubStats,
}

impl ControlLoop {
    pub(crate) fn new(commands: mpsc::UnboundedReceiver<Command>, config: HubConfig) -> Self {
        Self {
            commands,
            registry: Registry::new(),
            config,
            stats: HubStats::default(),
        }
    }

    /// Process commands until shutdown or until every handle is gone
    pub(crate) async fn run(mut self) {
        tracing::debug!(
            queue_capacity = self.config.queue_capacity,
            delivery = ?self.config.delivery,
            "Hub control loop started"
        );

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Register { id, events } => self.register(id, events),
                Command::Unregister { id } => self.unregister(id),
                Command::Publish { message } => self.dispatch(message).await,
                Command::Stats { reply } => {
                    let _ = reply.send(self.snapshot_stats());
                }
                Command::Subscribers { reply } => {
                    let _ = reply.send(self.registry.ids());
                }
                Command::Shutdown => break,
            }
        }

        self.commands.close();
        let remaining = self.registry.len();
        // Dropping the queue senders ends every open stream.
        self.registry.clear();

        tracing::info!(
            subscribers = remaining,
            published = self.stats.messages_published,
            "Hub control loop stopped"
        );
    }

    fn register(&mut self, id: SubscriberId, events: EventSender) {
        if self.registry.insert(id, events) {
            self.stats.total_registered += 1;
        }

        tracing::info!(
            subscriber_id = %id,
            subscribers = self.registry.len(),
            "Subscriber registered"
        );
    }

    fn unregister(&mut self, id: SubscriberId) {
        if self.registry.remove(id) {
            tracing::info!(
                subscriber_id = %id,
                subscribers = self.registry.len(),
                "Subscriber unregistered"
            );
        } else {
            tracing::trace!(subscriber_id = %id, "Unregister for absent subscriber ignored");
        }
    }

    /// Offer one message to every registered subscriber
    async fn dispatch(&mut self, message: Arc<Message>) {
        self.stats.messages_published += 1;

        let mut delivered = 0u64;
        let mut gone = Vec::new();

        for (id, events) in self.registry.snapshot() {
            match self.config.delivery {
                // May wait indefinitely on a subscriber that stopped reading.
                DeliveryPolicy::Blocking => match events.send(Arc::clone(&message)).await {
                    Ok(()) => delivered += 1,
                    Err(_) => gone.push(id),
                },
                DeliveryPolicy::DisconnectSlow => match events.try_send(Arc::clone(&message)) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(
                            subscriber_id = %id,
                            capacity = self.config.queue_capacity,
                            "Disconnecting slow subscriber"
                        );
                        self.stats.slow_disconnects += 1;
                        gone.push(id);
                    }
                    Err(TrySendError::Closed(_)) => gone.push(id),
                },
            }
        }

        for id in gone {
            if self.registry.remove(id) {
                tracing::debug!(subscriber_id = %id, "Subscriber removed during dispatch");
            }
        }

        self.stats.deliveries += delivered;

        tracing::debug!(
            label = message.label(),
            recipients = delivered,
            "Message dispatched"
        );
    }

    fn snapshot_stats(&self) -> HubStats {
        HubStats {
            active_subscribers: self.registry.len(),
            ..self.stats.clone()
        }
    }
}
