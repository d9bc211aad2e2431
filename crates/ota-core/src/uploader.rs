//! Single-artifact upload with outcome classification.
//!
//! One call is one HTTP POST, pass or fail; retry policy (if ever added)
//! belongs in the sequencing layer, not here.

use std::fmt;
use std::fs;

use crate::artifact::Artifact;
use crate::events::{OtaEvent, OtaObserver};
use crate::transport::OtaTransport;

/// Result of one upload attempt. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Device answered HTTP 200.
    Success,
    /// Artifact file missing or unreadable; no request was issued.
    NotFound(String),
    /// Network-level failure (connection refused, timeout, DNS, ...).
    Transport(String),
    /// Device answered with a non-200 status.
    HttpError { status: u16, excerpt: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success)
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Success => write!(f, "OK"),
            UploadOutcome::NotFound(msg) => write!(f, "cannot read artifact: {}", msg),
            UploadOutcome::Transport(msg) => write!(f, "transport error: {}", msg),
            UploadOutcome::HttpError { status, excerpt } => {
                write!(f, "HTTP {}: {}", status, excerpt)
            }
        }
    }
}

/// Read `artifact` and POST it to `device`, classifying the result.
///
/// Exactly one request per call when the file is readable; none otherwise.
pub fn upload_artifact<T: OtaTransport, O: OtaObserver>(
    transport: &T,
    observer: &O,
    device: &str,
    artifact: &Artifact,
) -> UploadOutcome {
    let data = match fs::read(&artifact.path) {
        Ok(data) => data,
        Err(e) => {
            let outcome =
                UploadOutcome::NotFound(format!("{}: {}", artifact.path.display(), e));
            observer.on_event(&OtaEvent::UploadFailed {
                device: device.to_string(),
                artifact: artifact.kind,
                reason: outcome.to_string(),
            });
            return outcome;
        }
    };

    observer.on_event(&OtaEvent::UploadStarted {
        device: device.to_string(),
        artifact: artifact.kind,
        bytes: data.len(),
    });

    let outcome = match transport.post(device, artifact.kind.endpoint(), data) {
        Ok(response) if response.is_ok() => UploadOutcome::Success,
        Ok(response) => UploadOutcome::HttpError {
            status: response.status,
            excerpt: response.body_excerpt,
        },
        Err(e) => UploadOutcome::Transport(e.to_string()),
    };

    match &outcome {
        UploadOutcome::Success => observer.on_event(&OtaEvent::UploadSucceeded {
            device: device.to_string(),
            artifact: artifact.kind,
        }),
        failure => observer.on_event(&OtaEvent::UploadFailed {
            device: device.to_string(),
            artifact: artifact.kind,
            reason: failure.to_string(),
        }),
    }

    outcome
}
