//! HTTP server
//!
//! Maps the streaming and submission endpoints onto the hub.

pub mod config;
pub mod listener;
pub mod routes;

pub use config::ServerConfig;
pub use listener::ProbeServer;
pub use routes::{DATA_PATH, EVENTS_PATH};
