//! Probe subscriber
//!
//! Reads the event stream of a running probe server and decodes each record back into a
//! [`Message`].

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;

use crate::error::{Error, Result};
use crate::hub::Message;
use crate::server::EVENTS_PATH;
use crate::wire::EVENT_STREAM_CONTENT_TYPE;

use super::endpoint;

type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Event stream client
pub struct ProbeSubscriber {
    messages: MessageStream,
}

impl ProbeSubscriber {
    /// Open the event stream of the server at `base_url`
    pub async fn connect(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Self::connect_with(&client, base_url).await
    }

    /// Open the event stream using an existing HTTP client
    ///
    /// Returns once the server has registered this subscriber, so anything published
    /// afterwards will be delivered.
    pub async fn connect_with(client: &reqwest::Client, base_url: &str) -> Result<Self> {
        let url = endpoint(base_url, EVENTS_PATH);
        let response = client
            .get(&url)
            .header(reqwest::header::ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Error::UnexpectedStatus(response.status()));
        }

        tracing::debug!(url = %url, "Subscribed to event stream");

        let messages = response.bytes_stream().eventsource().map(|event| match event {
            Ok(event) => serde_json::from_str::<Message>(&event.data).map_err(Error::Decode),
            Err(e) => Err(Error::EventStream(e.to_string())),
        });

        Ok(Self {
            messages: Box::pin(messages),
        })
    }

    /// Wait for the next message. `None` once the server ends the stream.
    pub async fn next_message(&mut self) -> Option<Result<Message>> {
        self.messages.next().await
    }
}

impl std::fmt::Debug for ProbeSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeSubscriber").finish_non_exhaustive()
    }
}
