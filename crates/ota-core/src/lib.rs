//! OTA-Core: fleet OTA upload orchestration for ESP-Miner devices.
//!
//! Pushes a firmware image (`esp-miner.bin`) and a web-interface archive
//! (`www.bin`) to one or more devices over their HTTP OTA endpoints,
//! sequentially and in a fixed per-device order.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Transport**: HTTP POST abstraction (reqwest, mock)
//! - **Artifact**: fixed artifact identities and build-dir resolution
//! - **Devices**: ordered, de-duplicated target list
//! - **Uploader**: single-attempt upload with outcome classification
//! - **Sequencer**: per-device two-step state machine
//! - **Session**: fleet orchestrator and aggregate report
//! - **Events**: observer pattern for UI decoupling
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ota_core::artifact::ArtifactSet;
//! use ota_core::devices::DeviceList;
//! use ota_core::session::{FleetSession, SessionConfig};
//!
//! let devices = DeviceList::build(&["192.168.1.50".to_string()], None)?;
//! let artifacts = ArtifactSet::locate(Path::new("build"))?;
//! let session = FleetSession::new(SessionConfig::default())?;
//! let report = session.run(&devices, &artifacts);
//! std::process::exit(report.exit_code());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod artifact;
pub mod devices;
pub mod events;
pub mod sequencer;
pub mod session;
pub mod transport;
pub mod uploader;

// Re-exports for convenience
pub use artifact::{Artifact, ArtifactError, ArtifactKind, ArtifactSet};
pub use devices::{DeviceList, DeviceListError};
pub use events::{NullObserver, OtaEvent, OtaObserver, TracingObserver};
pub use sequencer::{DeviceResult, DeviceSequencer, UploadStage};
pub use session::{FleetReport, FleetSession, SessionConfig};
pub use transport::{HttpTransport, MockTransport, OtaTransport, PostResponse, TransportError};
pub use uploader::UploadOutcome;
