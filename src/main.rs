//! probe-hub server binary
//!
//! Run with: probe-hub [--bind ADDR] [--queue-capacity N] [--disconnect-slow] [--stats-interval SECS] [--log-json]
//!
//! Subscribe:  curl -N http://localhost:8081/events
//! Publish:    curl -X POST http://localhost:8081/data -d '{"message":"hi","matrix":[[1,2]]}'

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use probe_hub::server::config::DEFAULT_PORT;
use probe_hub::{HubConfig, ProbeServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fan probe submissions out to live event-stream subscribers")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Delivery queue capacity per subscriber
    #[arg(long, default_value_t = 1)]
    queue_capacity: usize,

    /// Disconnect subscribers whose queue is full instead of waiting for them
    #[arg(long)]
    disconnect_slow: bool,

    /// Seconds between hub stats log lines
    #[arg(long, default_value_t = 30)]
    stats_interval: u64,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let mut hub = HubConfig::default().queue_capacity(args.queue_capacity);
    if args.disconnect_slow {
        hub = hub.disconnect_slow();
    }

    let config = ServerConfig::with_addr(args.bind)
        .hub(hub)
        .stats_interval(Duration::from_secs(args.stats_interval));

    let server = ProbeServer::new(config);
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
