//! Error types
//!
//! Connection-scoped failures end only the connection that hit them. Publish-scoped
//! failures are reported to the submitter and never touch other subscribers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::hub::HubError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the hub, the streaming endpoint and the clients
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport cannot flush incrementally, so no stream was opened
    #[error("streaming unsupported by transport")]
    StreamingUnsupported,

    /// A submission body could not be decoded
    #[error("failed to decode request body: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outgoing message could not be encoded
    #[error("failed to serialize message: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The hub control loop is gone
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Listener or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client-side HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status the client did not expect
    #[error("unexpected status: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The event stream could not be parsed
    #[error("event stream error: {0}")]
    EventStream(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::StreamingUnsupported => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Streaming unsupported!")
            }
            Error::Decode(_) => (StatusCode::BAD_REQUEST, "Failed to decode request body"),
            Error::Hub(_) => (StatusCode::SERVICE_UNAVAILABLE, "Hub unavailable"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, body).into_response()
    }
}
