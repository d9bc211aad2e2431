//! Target device list construction.
//!
//! Merges device addresses from command-line values and an optional file
//! (one address per line) into an ordered, de-duplicated list. Insertion
//! order is preserved because it determines upload order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceListError {
    #[error("No device addresses provided")]
    NoDevices,

    #[error("Failed to read device file '{path}': {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Ordered, duplicate-free list of device addresses.
#[derive(Debug, Clone)]
pub struct DeviceList {
    addresses: Vec<String>,
}

impl DeviceList {
    /// Build the list from positional arguments and an optional file.
    ///
    /// Positional addresses come first, then file lines. Entries are
    /// trimmed; empty lines are skipped; the first occurrence of a
    /// duplicate wins.
    pub fn build(args: &[String], file: Option<&Path>) -> Result<Self, DeviceListError> {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();

        let mut push = |addr: &str| {
            let addr = addr.trim();
            if !addr.is_empty() && seen.insert(addr.to_string()) {
                addresses.push(addr.to_string());
            }
        };

        for addr in args {
            push(addr);
        }

        if let Some(path) = file {
            let content =
                std::fs::read_to_string(path).map_err(|source| DeviceListError::FileUnreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
            for line in content.lines() {
                push(line);
            }
        }

        if addresses.is_empty() {
            return Err(DeviceListError::NoDevices);
        }
        Ok(Self { addresses })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
