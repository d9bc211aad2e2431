//! OTA artifact identities and build-directory resolution.
//!
//! Two artifacts exist, each with a fixed file name and OTA endpoint
//! (from the device firmware's `openapi.yaml`):
//!
//! - `www.bin` -> `POST /api/system/OTAWWW` (web interface)
//! - `esp-miner.bin` -> `POST /api/system/OTA` (firmware)
//!
//! The web interface always uploads before the firmware for a given device.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Firmware image file name.
pub const FIRMWARE_BIN: &str = "esp-miner.bin";
/// Web-interface archive file name.
pub const WWW_BIN: &str = "www.bin";

/// OTA endpoint for the firmware image.
pub const ENDPOINT_FIRMWARE: &str = "/api/system/OTA";
/// OTA endpoint for the web-interface archive.
pub const ENDPOINT_WWW: &str = "/api/system/OTAWWW";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Build directory '{0}' does not exist or is not a directory")]
    BuildDirMissing(PathBuf),
}

/// Identity of an OTA artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Web-interface archive, uploaded first.
    WebInterface,
    /// Firmware image, uploaded second.
    Firmware,
}

impl ArtifactKind {
    /// File name within the build directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::WebInterface => WWW_BIN,
            ArtifactKind::Firmware => FIRMWARE_BIN,
        }
    }

    /// Device endpoint this artifact is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ArtifactKind::WebInterface => ENDPOINT_WWW,
            ArtifactKind::Firmware => ENDPOINT_FIRMWARE,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::WebInterface => write!(f, "web-interface"),
            ArtifactKind::Firmware => write!(f, "firmware"),
        }
    }
}

/// One artifact with its resolved on-disk location.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

/// Both artifacts resolved against a validated build directory.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    web_interface: Artifact,
    firmware: Artifact,
}

impl ArtifactSet {
    /// Resolve artifact paths under `build_dir`.
    ///
    /// Only the directory is validated here; a missing artifact file is a
    /// per-device `not-found` upload outcome, not an up-front error.
    pub fn locate(build_dir: &Path) -> Result<Self, ArtifactError> {
        if !build_dir.is_dir() {
            return Err(ArtifactError::BuildDirMissing(build_dir.to_path_buf()));
        }
        Ok(Self {
            web_interface: Artifact {
                kind: ArtifactKind::WebInterface,
                path: build_dir.join(WWW_BIN),
            },
            firmware: Artifact {
                kind: ArtifactKind::Firmware,
                path: build_dir.join(FIRMWARE_BIN),
            },
        })
    }

    pub fn web_interface(&self) -> &Artifact {
        &self.web_interface
    }

    pub fn firmware(&self) -> &Artifact {
        &self.firmware
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_identities() {
        assert_eq!(ArtifactKind::WebInterface.file_name(), "www.bin");
        assert_eq!(ArtifactKind::WebInterface.endpoint(), "/api/system/OTAWWW");
        assert_eq!(ArtifactKind::Firmware.file_name(), "esp-miner.bin");
        assert_eq!(ArtifactKind::Firmware.endpoint(), "/api/system/OTA");
    }

    #[test]
    fn test_locate_missing_dir() {
        let err = ArtifactSet::locate(Path::new("/nonexistent/build")).unwrap_err();
        assert!(matches!(err, ArtifactError::BuildDirMissing(_)));
    }

    #[test]
    fn test_locate_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet::locate(dir.path()).unwrap();
        assert_eq!(set.web_interface().path, dir.path().join("www.bin"));
        assert_eq!(set.firmware().path, dir.path().join("esp-miner.bin"));
    }
}
