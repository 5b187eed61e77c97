//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::hub::HubConfig;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8081;

/// Shortest interval between hub stats log lines
pub const MIN_STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Hub control loop configuration
    pub hub: HubConfig,

    /// Frames buffered per response body before the streaming loop waits on the socket
    pub sink_buffer: usize,

    /// Largest accepted submission body in bytes
    pub max_body_bytes: usize,

    /// Interval between hub stats log lines
    pub stats_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            hub: HubConfig::default(),
            sink_buffer: 16,
            max_body_bytes: 16 * 1024 * 1024, // 16MB
            stats_interval: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the hub configuration
    pub fn hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    /// Set the per-response frame buffer
    pub fn sink_buffer(mut self, frames: usize) -> Self {
        self.sink_buffer = frames.max(1);
        self
    }

    /// Set the submission body limit
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Set the stats log interval, no shorter than [`MIN_STATS_INTERVAL`]
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval.max(MIN_STATS_INTERVAL);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::DeliveryPolicy;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.hub.delivery, DeliveryPolicy::Blocking);
        assert_eq!(config.sink_buffer, 16);
        assert_eq!(config.stats_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_sink_buffer_has_floor() {
        let config = ServerConfig::default().sink_buffer(0);

        assert_eq!(config.sink_buffer, 1);
    }

    #[test]
    fn test_stats_interval_has_floor() {
        let config = ServerConfig::default().stats_interval(Duration::ZERO);

        assert_eq!(config.stats_interval, MIN_STATS_INTERVAL);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8082".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .hub(HubConfig::default().queue_capacity(8).disconnect_slow())
            .sink_buffer(4)
            .max_body_bytes(1024)
            .stats_interval(Duration::from_secs(5));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.hub.queue_capacity, 8);
        assert_eq!(config.hub.delivery, DeliveryPolicy::DisconnectSlow);
        assert_eq!(config.sink_buffer, 4);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.stats_interval, Duration::from_secs(5));
    }
}
