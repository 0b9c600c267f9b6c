//! HTTP implementation of the gateway probe.

use std::time::Duration;

use async_trait::async_trait;
use domain::services::{GatewayProbe, ProbeError};
use reqwest::{Client, Response};
use tracing::debug;

/// Largest fixture body a probe will download.
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// Fetches fixture content over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
    max_body_bytes: u64,
}

impl HttpProbe {
    /// Create a probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edge-config/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    /// Overrides the download cap.
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    fn map_error(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProbeError::Network(e.to_string())
        }
    }

    /// Reads the body chunk by chunk, giving up as soon as it passes the cap,
    /// whether or not the server announced a length.
    async fn read_capped(&self, mut response: Response) -> Result<Vec<u8>, ProbeError> {
        if response
            .content_length()
            .is_some_and(|length| length > self.max_body_bytes)
        {
            return Err(ProbeError::BodyTooLarge(self.max_body_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(e))? {
            if (body.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(ProbeError::BodyTooLarge(self.max_body_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl GatewayProbe for HttpProbe {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = self.read_capped(response).await?;
        debug!(url = %url, bytes = body.len(), "Gateway fetch finished");
        Ok(body)
    }
}
