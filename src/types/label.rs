//! Device label text.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

/// A 32-byte device label exactly as carried on the wire.
///
/// The wire format does not guarantee a NUL terminator, so the raw bytes are
/// kept verbatim and text is only derived on demand.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::Label;
///
/// let label = Label::from("Kitchen");
/// assert_eq!(label.as_str(), "Kitchen");
/// assert!(Label::default().is_empty());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label([u8; Label::SIZE]);

impl Label {
    pub const SIZE: usize = 32;

    pub const fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Label(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    /// Text up to the first NUL byte (or all 32 bytes when there is none).
    pub fn as_str(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(Self::SIZE);
        String::from_utf8_lossy(&self.0[..end])
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl Default for Label {
    fn default() -> Self {
        Label([0; Self::SIZE])
    }
}

/// Truncates to 32 bytes.
impl From<&str> for Label {
    fn from(text: &str) -> Self {
        let mut bytes = [0u8; Self::SIZE];
        let len = text.len().min(Self::SIZE);
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Label(bytes)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:?})", self.as_str())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}
