//! Broadcast hub
//!
//! One control loop owns the subscriber registry and serializes every registration,
//! deregistration and broadcast. Callers talk to it through the cloneable [`Hub`] handle.
//!
//! # Architecture
//!
//! ```text
//!   Hub::register ─┐
//!   Hub::publish  ─┼──► command queue ──► ControlLoop
//!   Subscription  ─┘    (unbounded)       ┌──────────────────────────────┐
//!     (on drop)                           │ registry: HashMap<Id, Tx>    │
//!                                         └──────────────┬───────────────┘
//!                                                        │ Arc<Message>
//!                        ┌───────────────────────────────┼──────────────┐
//!                        ▼                               ▼              ▼
//!                  [Subscription 0]               [Subscription 1]     ...
//!                  queue.recv()                   queue.recv()
//! ```
//!
//! # Backpressure
//!
//! With [`DeliveryPolicy::Blocking`] a subscriber that stops draining its queue stalls
//! the loop and every command behind it. [`DeliveryPolicy::DisconnectSlow`] drops such
//! subscribers instead.

pub mod config;
mod control;
pub mod error;
mod handle;
pub mod message;
mod registry;
mod subscription;

pub use config::{DeliveryPolicy, HubConfig};
pub use error::HubError;
pub use handle::Hub;
pub use message::{Matrix, Message, Payload, SubscriberId};
pub use subscription::Subscription;
