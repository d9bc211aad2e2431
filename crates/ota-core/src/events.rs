//! Event system for UI decoupling.
//!
//! Allows CLI/TUI/GUI frontends to subscribe to upload progress without
//! tight coupling to the orchestration logic. One event is emitted per
//! upload attempt, carrying enough detail (device, artifact, reason) to
//! diagnose a failure without re-running.

use crate::artifact::ArtifactKind;

/// Events emitted during a fleet upload run.
#[derive(Debug, Clone)]
pub enum OtaEvent {
    /// A device's upload sequence is starting.
    DeviceStarted {
        device: String,
        index: usize,
        total: usize,
    },
    /// An upload attempt is starting (artifact read succeeded).
    UploadStarted {
        device: String,
        artifact: ArtifactKind,
        bytes: usize,
    },
    /// An upload attempt succeeded.
    UploadSucceeded {
        device: String,
        artifact: ArtifactKind,
    },
    /// An upload attempt failed.
    UploadFailed {
        device: String,
        artifact: ArtifactKind,
        reason: String,
    },
    /// A device's sequence finished.
    DeviceFinished { device: String, success: bool },
    /// All devices processed.
    FleetComplete { succeeded: usize, failed: usize },
}

/// Observer trait for receiving upload events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait OtaObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &OtaEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl OtaObserver for NullObserver {
    fn on_event(&self, _event: &OtaEvent) {
        // Do nothing
    }
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl OtaObserver for TracingObserver {
    fn on_event(&self, event: &OtaEvent) {
        match event {
            OtaEvent::DeviceStarted {
                device,
                index,
                total,
            } => {
                tracing::info!(device = %device, "Processing device {}/{}", index, total);
            }
            OtaEvent::UploadStarted {
                device,
                artifact,
                bytes,
            } => {
                tracing::info!(device = %device, artifact = %artifact, bytes = bytes, "Uploading");
            }
            OtaEvent::UploadSucceeded { device, artifact } => {
                tracing::info!(device = %device, artifact = %artifact, "Upload OK");
            }
            OtaEvent::UploadFailed {
                device,
                artifact,
                reason,
            } => {
                tracing::error!(device = %device, artifact = %artifact, "Upload failed: {}", reason);
            }
            OtaEvent::DeviceFinished { device, success } => {
                if *success {
                    tracing::info!(device = %device, "Device updated");
                } else {
                    tracing::warn!(device = %device, "Device failed");
                }
            }
            OtaEvent::FleetComplete { succeeded, failed } => {
                tracing::info!(succeeded, failed, "Fleet upload complete");
            }
        }
    }
}
