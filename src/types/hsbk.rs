//! Hue / saturation / brightness / kelvin color and its wire encoding.

use log::warn;
use serde::{Deserialize, Serialize};

/// Number of wire steps around the hue circle.
const HUE_STEPS: f64 = 65536.0;
/// Wire value of a fraction equal to 1.0.
const FRACTION_MAX: f64 = 65535.0;

/// Convert a hue in degrees to its 16-bit wire value.
///
/// Values outside `[0, 360)` wrap around the circle.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::hue_to_wire;
///
/// assert_eq!(hue_to_wire(0.0), 0);
/// assert_eq!(hue_to_wire(180.0), 0x8000);
/// assert_eq!(hue_to_wire(360.0), 0);
/// assert_eq!(hue_to_wire(-90.0), hue_to_wire(270.0));
/// ```
pub fn hue_to_wire(degrees: f64) -> u16 {
    let steps = (HUE_STEPS * degrees / 360.0).round() as i64;
    steps.rem_euclid(1 << 16) as u16
}

/// Convert a 16-bit wire hue to degrees in `[0, 360)`.
pub fn hue_from_wire(value: u16) -> f64 {
    f64::from(value) * 360.0 / HUE_STEPS
}

/// Convert a fraction in `[0, 1]` to its 16-bit wire value.
///
/// Fractions outside `[0, 1]` are not clamped: the scaled value wraps modulo
/// 2^16, which changes what is sent to the device. A warning is logged when
/// this happens.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::fraction_to_wire;
///
/// assert_eq!(fraction_to_wire(0.0), 0);
/// assert_eq!(fraction_to_wire(1.0), 0xFFFF);
/// assert_eq!(fraction_to_wire(0.5), 32768);
/// ```
pub fn fraction_to_wire(fraction: f64) -> u16 {
    if !(0.0..=1.0).contains(&fraction) {
        warn!("fraction {fraction} is outside [0, 1]; wire value will wrap");
    }
    let scaled = (fraction * FRACTION_MAX).round() as i64;
    scaled.rem_euclid(1 << 16) as u16
}

/// Convert a 16-bit wire fraction to `[0, 1]`.
pub fn fraction_from_wire(value: u16) -> f64 {
    f64::from(value) / FRACTION_MAX
}

/// A color in engineering units.
///
/// `hue` is in degrees, `saturation` and `brightness` are fractions in
/// `[0, 1]` and `kelvin` is the raw color temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Hsbk {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub kelvin: u16,
}

impl Hsbk {
    pub fn new(hue: f64, saturation: f64, brightness: f64, kelvin: u16) -> Self {
        Hsbk {
            hue,
            saturation,
            brightness,
            kelvin,
        }
    }

    /// Convert to the 16-bit values carried on the wire.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::Hsbk;
    ///
    /// let wire = Hsbk::new(120.0, 1.0, 0.0, 3500).to_wire();
    /// assert_eq!(wire.hue, 21845);
    /// assert_eq!(wire.saturation, 0xFFFF);
    /// assert_eq!(wire.brightness, 0);
    /// assert_eq!(wire.kelvin, 3500);
    /// ```
    pub fn to_wire(&self) -> WireColor {
        WireColor {
            hue: hue_to_wire(self.hue),
            saturation: fraction_to_wire(self.saturation),
            brightness: fraction_to_wire(self.brightness),
            kelvin: self.kelvin,
        }
    }

    pub fn from_wire(wire: &WireColor) -> Self {
        Hsbk {
            hue: hue_from_wire(wire.hue),
            saturation: fraction_from_wire(wire.saturation),
            brightness: fraction_from_wire(wire.brightness),
            kelvin: wire.kelvin,
        }
    }
}

/// A color as raw 16-bit wire values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColor {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}
