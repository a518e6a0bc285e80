//! Value types for device state and unit conversion.

mod firmware;
mod hsbk;
mod label;
mod mac;
mod power;

pub use firmware::FirmwareVersion;
pub use hsbk::{Hsbk, WireColor, fraction_from_wire, fraction_to_wire, hue_from_wire, hue_to_wire};
pub use label::Label;
pub use mac::MacAddress;
pub use power::PowerLevel;
