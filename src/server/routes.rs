//! HTTP routes
//!
//! `GET /events` opens a subscriber stream, `POST /data` publishes a submission.

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::error::Result;
use crate::hub::Hub;
use crate::session::{ChannelSink, SubscriberSession};
use crate::wire::{Submission, EVENT_STREAM_CONTENT_TYPE};

use super::config::ServerConfig;

/// Streaming endpoint path
pub const EVENTS_PATH: &str = "/events";

/// Submission endpoint path
pub const DATA_PATH: &str = "/data";

/// Body returned for an accepted submission
pub const SUBMISSION_ACCEPTED: &str = "Data received successfully";

#[derive(Clone)]
struct AppState {
    hub: Hub,
    sink_buffer: usize,
}

/// Build the router for a hub
pub fn router(hub: Hub, config: &ServerConfig) -> Router {
    let state = AppState {
        hub,
        sink_buffer: config.sink_buffer,
    };

    Router::new()
        .route(EVENTS_PATH, get(events))
        .route(DATA_PATH, post(submit))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

async fn events(State(state): State<AppState>) -> Result<Response> {
    let (sink, body) = ChannelSink::new(state.sink_buffer);
    let session = SubscriberSession::open(&state.hub, sink)?;

    tracing::info!(subscriber_id = %session.id(), "Client connected");
    tokio::spawn(session.run());

    let headers = [
        (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
        (header::CACHE_CONTROL, "no-cache"),
        (header::CONNECTION, "keep-alive"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    ];

    Ok((headers, Body::from_stream(body)).into_response())
}

async fn submit(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, &'static str)> {
    let submission = Submission::decode(&body).inspect_err(|e| {
        tracing::warn!(error = %e, bytes = body.len(), "Rejected submission");
    })?;

    tracing::debug!(
        label = %submission.message,
        rows = submission.matrix.row_count(),
        "Received submission"
    );

    state.hub.publish_message(submission.into_message())?;

    Ok((StatusCode::CREATED, SUBMISSION_ACCEPTED))
}
