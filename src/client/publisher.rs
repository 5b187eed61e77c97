//! Probe publisher
//!
//! Posts matrices to a running probe server, typically from instrumentation inside the
//! program being observed.

use reqwest::StatusCode;

use crate::error::{Error, Result};
use crate::hub::Matrix;
use crate::server::DATA_PATH;
use crate::wire::Submission;

use super::endpoint;

/// Submission client
///
/// # Example
/// ```no_run
/// use probe_hub::client::ProbePublisher;
///
/// # async fn example() -> probe_hub::Result<()> {
/// let publisher = ProbePublisher::new("http://localhost:8081")?;
/// publisher.send_matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]], "attention").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProbePublisher {
    client: reqwest::Client,
    url: String,
}

impl ProbePublisher {
    /// Create a publisher for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a publisher that reuses an existing HTTP client
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, DATA_PATH),
        }
    }

    /// Submission endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Publish a labelled matrix
    pub async fn send_matrix(&self, matrix: impl Into<Matrix>, label: impl Into<String>) -> Result<()> {
        let submission = Submission {
            message: label.into(),
            matrix: matrix.into(),
        };
        self.send(&submission).await
    }

    /// Publish a submission
    ///
    /// Succeeds once the server has accepted it. Delivery to subscribers is not awaited.
    pub async fn send(&self, submission: &Submission) -> Result<()> {
        let body = serde_json::to_vec(submission).map_err(Error::Serialization)?;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => {
                tracing::warn!(url = %self.url, status = %status, "Submission rejected");
                Err(Error::UnexpectedStatus(status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_data_path() {
        let publisher = ProbePublisher::new("http://localhost:8081/").unwrap();

        assert_eq!(publisher.url(), "http://localhost:8081/data");
    }
}
