//! # probe-hub
//!
//! A single-process publish/subscribe hub. Submissions posted to `/data` are fanned out in
//! real time to every client holding an open server-sent events stream on `/events`.
//!
//! ```text
//!  POST /data ──► Hub::publish ──► control loop ──► per-subscriber queue ──► GET /events
//!                                      │
//!                                  Registry
//! ```
//!
//! All registry mutation and dispatch goes through one control loop (see [`hub`]), each
//! stream is served by its own [`session::SubscriberSession`], and [`server::ProbeServer`]
//! wires both to an axum router.
//!
//! ## Quick start
//!
//! ```no_run
//! use probe_hub::{ProbeServer, ServerConfig};
//!
//! # async fn example() -> probe_hub::Result<()> {
//! let server = ProbeServer::new(ServerConfig::default());
//! server.run().await
//! # }
//! ```

pub mod client;
pub mod error;
pub mod hub;
pub mod server;
pub mod session;
pub mod stats;
pub mod wire;

pub use error::{Error, Result};
pub use hub::{DeliveryPolicy, Hub, HubConfig, HubError, Matrix, Message, Payload, SubscriberId};
pub use server::{ProbeServer, ServerConfig};
