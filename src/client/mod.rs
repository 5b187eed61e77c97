//! Probe clients
//!
//! Provides client-side access to a probe server for:
//! - Publishing matrices from instrumented code
//! - Following the live event stream

pub mod publisher;
pub mod subscriber;

pub use publisher::ProbePublisher;
pub use subscriber::ProbeSubscriber;

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
