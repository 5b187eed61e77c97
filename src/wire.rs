//! Wire formats
//!
//! Submissions arrive as a JSON body `{"message": ..., "matrix": ...}`. Each message leaves
//! as one server-sent event record: `data: <json>\n\n`.

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::hub::{Matrix, Message};

/// Content type of the streaming endpoint
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

const DATA_PREFIX: &[u8] = b"data: ";
const RECORD_TERMINATOR: &[u8] = b"\n\n";

/// Body of a submission request
///
/// Missing or `null` fields decode as empty, matching what lenient publishers expect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Label for the published message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Matrix payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub matrix: Matrix,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Submission {
    /// Decode a submission body
    ///
    /// Only the first JSON value is read; anything after it is ignored. A `null` body is an
    /// empty submission. An empty body is a decode error.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let first = serde_json::Deserializer::from_slice(body)
            .into_iter::<Option<Submission>>()
            .next();

        match first {
            Some(Ok(submission)) => Ok(submission.unwrap_or_default()),
            Some(Err(e)) => Err(Error::Decode(e)),
            None => Err(Error::Decode(serde_json::Error::custom("empty submission body"))),
        }
    }

    /// Turn the submission into the message it publishes
    pub fn into_message(self) -> Message {
        Message::new(self.matrix, self.message)
    }
}

/// Encode a message as a single event record
pub fn encode_frame(message: &Message) -> Result<Bytes> {
    let json = serde_json::to_vec(message).map_err(Error::Serialization)?;

    let mut buf = BytesMut::with_capacity(DATA_PREFIX.len() + json.len() + RECORD_TERMINATOR.len());
    buf.put_slice(DATA_PREFIX);
    buf.put_slice(&json);
    buf.put_slice(RECORD_TERMINATOR);

    Ok(buf.freeze())
}
