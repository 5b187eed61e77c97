//! Hub configuration

/// How the control loop hands a message to a subscriber queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Wait for queue space.
    ///
    /// A subscriber that stops draining its queue stalls the control loop, and with it every
    /// later register, unregister and publish, until that subscriber drains or its
    /// connection goes away. This is a known head-of-line blocking hazard.
    #[default]
    Blocking,

    /// Never wait. A subscriber whose queue is full is removed from the registry and its
    /// stream is ended.
    DisconnectSlow,
}

/// Configuration for the hub control loop
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of each subscriber's delivery queue (at least 1)
    pub queue_capacity: usize,

    /// Hand-off policy for full queues
    pub delivery: DeliveryPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1,
            delivery: DeliveryPolicy::Blocking,
        }
    }
}

impl HubConfig {
    /// Set the per-subscriber queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the delivery policy
    pub fn delivery(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery = policy;
        self
    }

    /// Disconnect subscribers that cannot keep up
    pub fn disconnect_slow(self) -> Self {
        self.delivery(DeliveryPolicy::DisconnectSlow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();

        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.delivery, DeliveryPolicy::Blocking);
    }

    #[test]
    fn test_queue_capacity_has_floor() {
        let config = HubConfig::default().queue_capacity(0);

        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = HubConfig::default().queue_capacity(64).disconnect_slow();

        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.delivery, DeliveryPolicy::DisconnectSlow);
    }
}
