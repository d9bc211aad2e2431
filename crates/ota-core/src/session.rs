//! Fleet session - high-level orchestrator for the upload run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::artifact::ArtifactSet;
use crate::devices::DeviceList;
use crate::events::{OtaEvent, OtaObserver, TracingObserver};
use crate::sequencer::{DeviceResult, DeviceSequencer};
use crate::transport::{HttpTransport, OtaTransport, TransportError};

/// Configuration for a fleet upload session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory containing `esp-miner.bin` and `www.bin`.
    pub build_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Wait between the web-interface and firmware uploads, in
    /// milliseconds. The right value is device-firmware-dependent.
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            request_timeout_secs: 120,
            settle_delay_ms: 1000,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Aggregate result of one fleet run.
#[derive(Debug)]
pub struct FleetReport {
    /// Per-device results, in processing order.
    pub devices: Vec<DeviceResult>,
}

impl FleetReport {
    pub fn all_succeeded(&self) -> bool {
        self.devices.iter().all(DeviceResult::is_success)
    }

    pub fn failed_count(&self) -> usize {
        self.devices.iter().filter(|d| !d.is_success()).count()
    }

    /// Process exit code: 0 if every device succeeded, 2 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() { 0 } else { 2 }
    }
}

/// Fleet session - drives the per-device sequencer over every target.
pub struct FleetSession<T: OtaTransport, O: OtaObserver> {
    config: SessionConfig,
    transport: T,
    observer: Arc<O>,
}

impl FleetSession<HttpTransport, TracingObserver> {
    /// Create a session with the reqwest transport and tracing observer.
    pub fn new(config: SessionConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.request_timeout_secs)?;
        Ok(Self::with_parts(config, transport, Arc::new(TracingObserver)))
    }
}

impl<T: OtaTransport, O: OtaObserver> FleetSession<T, O> {
    /// Create a session with a custom transport and observer.
    pub fn with_parts(config: SessionConfig, transport: T, observer: Arc<O>) -> Self {
        Self {
            config,
            transport,
            observer,
        }
    }

    /// Run the upload sequence against every device, strictly in order.
    ///
    /// A failing device never aborts the loop; its result is recorded and
    /// the next device is attempted. A later device's sequence never
    /// begins before an earlier device's has concluded.
    #[instrument(skip(self, devices, artifacts), fields(devices = devices.len()))]
    pub fn run(&self, devices: &DeviceList, artifacts: &ArtifactSet) -> FleetReport {
        let sequencer = DeviceSequencer::new(
            &self.transport,
            self.observer.as_ref(),
            artifacts,
            Duration::from_millis(self.config.settle_delay_ms),
        );

        let total = devices.len();
        let mut results = Vec::with_capacity(total);
        for (index, device) in devices.iter().enumerate() {
            self.observer.on_event(&OtaEvent::DeviceStarted {
                device: device.to_string(),
                index: index + 1,
                total,
            });
            let result = sequencer.run(device);
            self.observer.on_event(&OtaEvent::DeviceFinished {
                device: device.to_string(),
                success: result.is_success(),
            });
            results.push(result);
        }

        let report = FleetReport { devices: results };
        self.observer.on_event(&OtaEvent::FleetComplete {
            succeeded: total - report.failed_count(),
            failed: report.failed_count(),
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use crate::transport::MockTransport;
    use crate::artifact::{ENDPOINT_FIRMWARE, ENDPOINT_WWW};
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ArtifactSet) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("www.bin"), b"www").unwrap();
        fs::write(dir.path().join("esp-miner.bin"), b"firmware").unwrap();
        let artifacts = ArtifactSet::locate(dir.path()).unwrap();
        (dir, artifacts)
    }

    fn session(mock: MockTransport) -> FleetSession<MockTransport, NullObserver> {
        let config = SessionConfig {
            settle_delay_ms: 0,
            ..SessionConfig::default()
        };
        FleetSession::with_parts(config, mock, Arc::new(NullObserver))
    }

    fn devices(addresses: &[&str]) -> DeviceList {
        let owned: Vec<String> = addresses.iter().map(|s| s.to_string()).collect();
        DeviceList::build(&owned, None).unwrap()
    }

    #[test]
    fn test_all_devices_succeed() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();

        let report = session(mock.clone()).run(&devices(&["10.0.0.1", "10.0.0.2"]), &artifacts);
        assert!(report.all_succeeded());
        assert_eq!(report.exit_code(), 0);

        let posts = mock.posts();
        assert_eq!(posts.len(), 4);
        // Strict per-device ordering: a device's full sequence concludes
        // before the next device starts.
        assert_eq!(posts[0].device, "10.0.0.1");
        assert_eq!(posts[0].endpoint, ENDPOINT_WWW);
        assert_eq!(posts[1].device, "10.0.0.1");
        assert_eq!(posts[1].endpoint, ENDPOINT_FIRMWARE);
        assert_eq!(posts[2].device, "10.0.0.2");
        assert_eq!(posts[3].device, "10.0.0.2");
    }

    #[test]
    fn test_device_failure_does_not_abort_fleet() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        mock.queue_status(503, "busy");

        let report = session(mock.clone()).run(&devices(&["10.0.0.1", "10.0.0.2"]), &artifacts);
        assert_eq!(report.exit_code(), 2);
        assert!(!report.devices[0].is_success());
        assert!(report.devices[1].is_success());

        // First device stops after its web-interface failure; second runs
        // the full sequence.
        assert_eq!(mock.posts().len(), 3);
        assert_eq!(mock.posts_to(ENDPOINT_FIRMWARE), 1);
    }

    #[test]
    fn test_exit_code_never_zero_with_failures() {
        let (_dir, artifacts) = fixture();
        let mock = MockTransport::new();
        mock.queue_status(200, "");
        mock.queue_status(500, "flash error");

        let report = session(mock).run(&devices(&["10.0.0.1"]), &artifacts);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let config = SessionConfig {
            build_dir: PathBuf::from("/tmp/out"),
            request_timeout_secs: 30,
            settle_delay_ms: 250,
        };
        config.save_to_file(&path).unwrap();

        let loaded = SessionConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.build_dir, PathBuf::from("/tmp/out"));
        assert_eq!(loaded.request_timeout_secs, 30);
        assert_eq!(loaded.settle_delay_ms, 250);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        fs::write(&path, "settle_delay_ms = 5\n").unwrap();

        let loaded = SessionConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.settle_delay_ms, 5);
        assert_eq!(loaded.request_timeout_secs, 120);
        assert_eq!(loaded.build_dir, PathBuf::from("build"));
    }
}
