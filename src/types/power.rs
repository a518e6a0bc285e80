//! Power level of a light.

use serde::{Deserialize, Serialize};

/// Raw 16-bit power level reported and accepted by a light.
///
/// Only the two extremes have a defined meaning: `0` is off and `0xFFFF` is
/// fully on. Intermediate levels are valid on the wire but read as "off"
/// through [`PowerLevel::is_powered`].
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::PowerLevel;
///
/// assert!(PowerLevel::from(true).is_powered());
/// assert!(!PowerLevel::from(false).is_powered());
/// assert!(!PowerLevel::new(0x8000).is_powered());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerLevel(u16);

impl PowerLevel {
    pub const OFF: PowerLevel = PowerLevel(0);
    pub const ON: PowerLevel = PowerLevel(0xFFFF);

    pub const fn new(level: u16) -> Self {
        PowerLevel(level)
    }

    pub fn level(&self) -> u16 {
        self.0
    }

    /// True only at exactly `0xFFFF`.
    pub fn is_powered(&self) -> bool {
        *self == Self::ON
    }
}

impl From<bool> for PowerLevel {
    fn from(powered: bool) -> Self {
        if powered { Self::ON } else { Self::OFF }
    }
}
