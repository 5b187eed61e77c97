//! Transport seam for subscriber streams
//!
//! A streaming loop only needs three things from its transport: to know up front whether
//! it can flush incrementally, to write one frame at a time, and to learn when the peer
//! has gone away.

use std::convert::Infallible;
use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// The peer is no longer reading frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Destination for encoded event frames
pub trait EventSink: Send {
    /// Whether each frame reaches the peer as soon as it is written
    fn supports_streaming(&self) -> bool;

    /// Write one frame and flush it
    fn send_frame(&mut self, frame: Bytes) -> impl Future<Output = Result<(), SinkClosed>> + Send;

    /// Resolves once the peer has closed the connection
    fn closed(&self) -> impl Future<Output = ()> + Send;
}

/// Body stream fed by a [`ChannelSink`]
pub type FrameStream = ReceiverStream<Result<Bytes, Infallible>>;

/// Sink that feeds an HTTP response body
///
/// Every frame becomes its own body chunk. When the server drops the body (the client
/// disconnected) the sink reports closed.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
}

impl ChannelSink {
    /// Create a sink and the body stream it writes to
    pub fn new(buffer: usize) -> (Self, FrameStream) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, ReceiverStream::new(rx))
    }
}

impl EventSink for ChannelSink {
    fn supports_streaming(&self) -> bool {
        true
    }

    async fn send_frame(&mut self, frame: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(Ok(frame)).await.map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}
