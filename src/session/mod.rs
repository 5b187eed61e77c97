//! Subscriber sessions
//!
//! Each open stream runs a [`SubscriberSession`] that owns its hub registration and writes
//! frames through an [`EventSink`].

pub mod sink;
pub mod subscriber;

pub use sink::{ChannelSink, EventSink, FrameStream, SinkClosed};
pub use subscriber::{CloseReason, SubscriberSession};
