//! Hardware address of a LIFX device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Error;

/// A 6-byte hardware (MAC) address identifying a device.
///
/// Parses from colon- or dash-separated hex pairs, or 12 bare hex digits.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use lifx_lan_rs::MacAddress;
///
/// let mac = MacAddress::from_str("d0:73:d5:01:02:03").unwrap();
/// assert_eq!(mac.octets(), [0xd0, 0x73, 0xd5, 0x01, 0x02, 0x03]);
/// assert_eq!(mac.to_string(), "d0:73:d5:01:02:03");
/// assert_eq!(MacAddress::from_str("D073D5010203").unwrap(), mac);
/// assert!(MacAddress::from_str("d0:73:d5").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// The 8-byte frame-address target: the MAC followed by two zero bytes.
    pub(crate) fn to_target(self) -> [u8; 8] {
        let mut target = [0u8; 8];
        target[..6].copy_from_slice(&self.0);
        target
    }

    pub(crate) fn from_target(target: &[u8; 8]) -> Self {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&target[..6]);
        MacAddress(octets)
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidMac(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::InvalidMac(s.to_string()))?;
        }
        Ok(MacAddress(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MacAddress::from_str(&s).map_err(serde::de::Error::custom)
    }
}
