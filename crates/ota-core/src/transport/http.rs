//! reqwest-based HTTP transport implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::traits::{OtaTransport, PostResponse, TransportError, excerpt};

/// Blocking HTTP transport for device OTA endpoints.
///
/// The OTA protocol is plain unauthenticated HTTP, so the client is built
/// without TLS support.
pub struct HttpTransport {
    client: Client,
    timeout_secs: u64,
}

impl HttpTransport {
    /// Build a client with the given per-request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl OtaTransport for HttpTransport {
    #[instrument(skip(self, body), fields(len = body.len()))]
    fn post(
        &self,
        device: &str,
        endpoint: &str,
        body: Vec<u8>,
    ) -> Result<PostResponse, TransportError> {
        let url = format!("http://{}{}", device, endpoint);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else if e.is_connect() {
                    TransportError::ConnectFailed(e.to_string())
                } else {
                    TransportError::SendFailed(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body_excerpt = excerpt(&response.text().unwrap_or_default());
        debug!(status, "POST complete");

        Ok(PostResponse {
            status,
            body_excerpt,
        })
    }
}
