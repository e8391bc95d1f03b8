use std::time::Duration;

use axum::async_trait;

use super::dto::{DetectRequest, DetectResponse};

/// One attempt against one candidate endpoint.
///
/// Every variant is handled the same way by the fallback loop (move on to
/// the next candidate); the distinction exists for logging and for the
/// terminal error surfaced when every candidate is exhausted.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The request did not complete within the per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request failed below HTTP (DNS, refused connection, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    Body(String),
}

/// HTTP access to the detection service, behind a seam so the fallback
/// loop can be exercised without a network.
#[async_trait]
pub trait DetectTransport: Send + Sync {
    /// POST `body` to `url`, cancelling the in-flight request after
    /// `timeout`, and parse a 2xx response as [`DetectResponse`].
    async fn post_detect(
        &self,
        url: &str,
        body: &DetectRequest,
        timeout: Duration,
    ) -> Result<DetectResponse, AttemptError>;

    /// GET `url` and report whether it answered 2xx within `timeout`.
    async fn get_ok(&self, url: &str, timeout: Duration) -> Result<(), AttemptError>;
}

/// Production transport over a pooled [`reqwest::Client`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(e: reqwest::Error) -> AttemptError {
    if e.is_timeout() {
        AttemptError::Timeout
    } else {
        AttemptError::Transport(e.to_string())
    }
}

#[async_trait]
impl DetectTransport for HttpTransport {
    async fn post_detect(
        &self,
        url: &str,
        body: &DetectRequest,
        timeout: Duration,
    ) -> Result<DetectResponse, AttemptError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        response
            .json::<DetectResponse>()
            .await
            .map_err(|e| AttemptError::Body(e.to_string()))
    }

    async fn get_ok(&self, url: &str, timeout: Duration) -> Result<(), AttemptError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }
        Ok(())
    }
}
