//! Probe server listener
//!
//! Binds the listener, serves the router and owns the hub for the lifetime of the server.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::hub::Hub;
use crate::server::config::{ServerConfig, MIN_STATS_INTERVAL};
use crate::server::routes;

/// Probe server
pub struct ProbeServer {
    config: ServerConfig,
    hub: Hub,
}

impl ProbeServer {
    /// Create a new server and start its hub
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        let hub = Hub::spawn(config.hub.clone());
        Self { config, hub }
    }

    /// Get a handle to the hub
    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Router serving the streaming and submission endpoints
    pub fn router(&self) -> Router {
        routes::router(self.hub.clone(), &self.config)
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// On shutdown the hub stops first so every open stream ends and in-flight
    /// connections can drain.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "Probe server listening");

        let stats_handle = self.spawn_stats_task();

        let hub = self.hub.clone();
        let signal = async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            hub.shutdown();
        };

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await;

        stats_handle.abort();

        result?;
        tracing::info!(addr = %addr, "Probe server stopped");
        Ok(())
    }

    /// Periodically log hub counters until the hub closes
    fn spawn_stats_task(&self) -> JoinHandle<()> {
        let hub = self.hub.clone();
        // The field is public, so a zero interval can bypass the builder.
        let interval = self.config.stats_interval.max(MIN_STATS_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Ok(stats) = hub.stats().await else {
                    break;
                };
                tracing::debug!(
                    subscribers = stats.active_subscribers,
                    published = stats.messages_published,
                    deliveries = stats.deliveries,
                    fan_out = stats.fan_out(),
                    slow_disconnects = stats.slow_disconnects,
                    "Hub stats"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio_test::assert_ok;

    use super::*;

    #[tokio::test]
    async fn test_serve_until_shutdown_stops_hub() {
        let server = ProbeServer::new(ServerConfig::default());
        let hub = server.hub().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let mut sub = hub.register().unwrap();
        let handle = tokio::spawn(async move {
            server
                .serve_until(listener, async move {
                    let _ = rx.await;
                })
                .await
        });

        tx.send(()).unwrap();

        assert!(sub.recv().await.is_none());
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert!(hub.is_closed());
    }

    #[tokio::test]
    async fn test_zero_stats_interval_does_not_stop_server() {
        let mut config = ServerConfig::default();
        config.stats_interval = Duration::ZERO;
        let server = ProbeServer::new(config);
        let hub = server.hub().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let stats_task = server.spawn_stats_task();
        let handle = tokio::spawn(async move {
            server
                .serve_until(listener, async move {
                    let _ = rx.await;
                })
                .await
        });

        // A panicking stats task would finish on its own first tick
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!stats_task.is_finished());
        assert_ok!(hub.stats().await);

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert!(stats_task.await.is_ok());
    }

    #[tokio::test]
    async fn test_bind_addr_from_config() {
        let addr: SocketAddr = "127.0.0.1:18081".parse().unwrap();
        let server = ProbeServer::new(ServerConfig::with_addr(addr));

        assert_eq!(server.bind_addr(), addr);
        assert_eq!(server.config().bind_addr, addr);
    }
}
