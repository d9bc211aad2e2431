//! Per-device upload sequencing.
//!
//! Enforces the OTA protocol's required step order for one device:
//!
//! ```text
//! WEB_INTERFACE -> {ok: SETTLE -> FIRMWARE -> DONE, err: DONE}
//! ```
//!
//! A device that rejects the web-interface upload never receives the
//! firmware; the settle wait gives the device time to finish processing
//! the first payload before accepting the second.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::artifact::ArtifactSet;
use crate::events::OtaObserver;
use crate::transport::OtaTransport;
use crate::uploader::{UploadOutcome, upload_artifact};

/// Stage of the per-device upload sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Web-interface archive upload.
    WebInterface,
    /// Settle wait between uploads.
    Settle,
    /// Firmware image upload.
    Firmware,
    /// Sequence finished.
    Done,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStage::WebInterface => write!(f, "WEB_INTERFACE"),
            UploadStage::Settle => write!(f, "SETTLE"),
            UploadStage::Firmware => write!(f, "FIRMWARE"),
            UploadStage::Done => write!(f, "DONE"),
        }
    }
}

/// Aggregate of the upload outcomes for one device.
#[derive(Debug, Clone)]
pub struct DeviceResult {
    pub device: String,
    pub web_interface: UploadOutcome,
    /// `None` when the firmware step was skipped after a web-interface
    /// failure.
    pub firmware: Option<UploadOutcome>,
}

impl DeviceResult {
    /// Success only if both steps succeeded.
    pub fn is_success(&self) -> bool {
        self.web_interface.is_success()
            && self.firmware.as_ref().is_some_and(UploadOutcome::is_success)
    }
}

/// Drives the fixed two-step upload sequence against one device.
pub struct DeviceSequencer<'a, T: OtaTransport, O: OtaObserver> {
    transport: &'a T,
    observer: &'a O,
    artifacts: &'a ArtifactSet,
    settle_delay: Duration,
}

impl<'a, T: OtaTransport, O: OtaObserver> DeviceSequencer<'a, T, O> {
    pub fn new(
        transport: &'a T,
        observer: &'a O,
        artifacts: &'a ArtifactSet,
        settle_delay: Duration,
    ) -> Self {
        Self {
            transport,
            observer,
            artifacts,
            settle_delay,
        }
    }

    /// Run the sequence for `device` and return its aggregate result.
    pub fn run(&self, device: &str) -> DeviceResult {
        let mut stage = UploadStage::WebInterface;

        let web_interface =
            upload_artifact(self.transport, self.observer, device, self.artifacts.web_interface());
        if !web_interface.is_success() {
            // Device cannot accept OTA payloads; pushing firmware would be
            // wasted work against a misbehaving target.
            self.goto_stage(device, &mut stage, UploadStage::Done);
            return DeviceResult {
                device: device.to_string(),
                web_interface,
                firmware: None,
            };
        }

        self.goto_stage(device, &mut stage, UploadStage::Settle);
        thread::sleep(self.settle_delay);

        self.goto_stage(device, &mut stage, UploadStage::Firmware);
        let firmware =
            upload_artifact(self.transport, self.observer, device, self.artifacts.firmware());
        self.goto_stage(device, &mut stage, UploadStage::Done);

        DeviceResult {
            device: device.to_string(),
            web_interface,
            firmware: Some(firmware),
        }
    }

    fn goto_stage(&self, device: &str, stage: &mut UploadStage, next: UploadStage) {
        info!(device = %device, from = %stage, to = %next, "Stage transition");
        *stage = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ENDPOINT_FIRMWARE, ENDPOINT_WWW};
    use crate::events::NullObserver;
    use crate::transport::MockTransport;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ArtifactSet) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("www.bin"), b"www").unwrap();
        fs::write(dir.path().join("esp-miner.bin"), b"firmware").unwrap();
        let artifacts = ArtifactSet::locate(dir.path()).unwrap();
        (dir, artifacts)
    }

    #[test]
    fn test_both_steps_in_order() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        let sequencer =
            DeviceSequencer::new(&mock, &NullObserver, &artifacts, Duration::ZERO);

        let result = sequencer.run("10.0.0.1");
        assert!(result.is_success());

        let posts = mock.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].endpoint, ENDPOINT_WWW);
        assert_eq!(posts[1].endpoint, ENDPOINT_FIRMWARE);
    }

    #[test]
    fn test_firmware_skipped_after_web_failure() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        mock.queue_status(500, "flash write failed");
        let sequencer =
            DeviceSequencer::new(&mock, &NullObserver, &artifacts, Duration::ZERO);

        let result = sequencer.run("10.0.0.1");
        assert!(!result.is_success());
        assert!(result.firmware.is_none());
        assert_eq!(mock.posts_to(ENDPOINT_FIRMWARE), 0);
    }

    #[test]
    fn test_firmware_skipped_when_web_archive_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("esp-miner.bin"), b"firmware").unwrap();
        let artifacts = ArtifactSet::locate(dir.path()).unwrap();

        let mock = MockTransport::new();
        let sequencer =
            DeviceSequencer::new(&mock, &NullObserver, &artifacts, Duration::ZERO);

        let result = sequencer.run("10.0.0.1");
        assert!(matches!(result.web_interface, UploadOutcome::NotFound(_)));
        assert!(result.firmware.is_none());
        assert!(mock.posts().is_empty());
    }

    #[test]
    fn test_settle_delay_separates_uploads() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        let delay = Duration::from_millis(50);
        let sequencer = DeviceSequencer::new(&mock, &NullObserver, &artifacts, delay);

        sequencer.run("10.0.0.1");

        let posts = mock.posts();
        assert_eq!(posts.len(), 2);
        assert!(posts[1].at.duration_since(posts[0].at) >= delay);
    }

    #[test]
    fn test_firmware_failure_fails_device() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        mock.queue_status(200, "");
        mock.queue_status(400, "bad image");
        let sequencer =
            DeviceSequencer::new(&mock, &NullObserver, &artifacts, Duration::ZERO);

        let result = sequencer.run("10.0.0.1");
        assert!(!result.is_success());
        assert!(result.web_interface.is_success());
        assert!(matches!(
            result.firmware,
            Some(UploadOutcome::HttpError { status: 400, .. })
        ));
    }
}
