//! Transport layer abstraction.
//!
//! Defines the `OtaTransport` trait for posting OTA payloads to a device,
//! allowing different implementations (reqwest, mock).

use thiserror::Error;

/// Maximum number of response-body characters kept for diagnostics.
pub const EXCERPT_LEN: usize = 100;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Request failed: {0}")]
    SendFailed(String),
}

/// Response to a single OTA POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, truncated to [`EXCERPT_LEN`] characters.
    pub body_excerpt: String,
}

impl PostResponse {
    /// The device accepted the payload.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Truncate a response body for diagnostic display.
pub fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_LEN).collect()
}

/// Abstract OTA transport interface.
///
/// This trait enables:
/// - Production implementation using reqwest
/// - Mock implementation for unit testing
pub trait OtaTransport: Send + Sync {
    /// POST one artifact's raw bytes to `http://<device><endpoint>`.
    ///
    /// A single attempt: no retries at this layer.
    fn post(
        &self,
        device: &str,
        endpoint: &str,
        body: Vec<u8>,
    ) -> Result<PostResponse, TransportError>;
}
