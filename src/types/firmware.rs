//! Host firmware version.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Firmware information reported by a StateHostFirmware response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    /// Build timestamp, in nanoseconds since the unix epoch.
    pub build: u64,
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
