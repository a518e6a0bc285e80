//! Controller configuration.

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::packet::DEFAULT_PORT;

type Result<T> = std::result::Result<T, Error>;

/// Tunables for a [`crate::Controller`].
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use lifx_lan_rs::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{"max_devices": 4}"#).unwrap();
/// assert_eq!(config.max_devices, 4);
/// assert_eq!(config.port, 56700);
/// assert_eq!(config.broadcast_target().to_string(), "255.255.255.255:56700");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Capacity of the device registry; devices past it are not tracked.
    pub max_devices: usize,
    /// Destination of discovery broadcasts.
    pub broadcast_address: Ipv4Addr,
    /// Port devices listen on.
    pub port: u16,
    /// Number of packets kept in the diagnostics history.
    pub history_size: usize,
}

impl ControllerConfig {
    pub const DEFAULT_MAX_DEVICES: usize = 16;
    pub const DEFAULT_HISTORY_SIZE: usize = 100;

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::ConfigLoad)
    }

    pub fn broadcast_target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_address, self.port)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_devices: Self::DEFAULT_MAX_DEVICES,
            broadcast_address: Ipv4Addr::BROADCAST,
            port: DEFAULT_PORT,
            history_size: Self::DEFAULT_HISTORY_SIZE,
        }
    }
}
