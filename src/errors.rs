use crate::packet::MessageType;

/// Reasons a received datagram could not be decoded.
///
/// The controller never surfaces these to the caller for inbound traffic; a
/// packet that fails to decode is logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The datagram is shorter than the fixed 36-byte header.
    #[error("packet too short: {actual} bytes, header needs {expected}")]
    TooShort { expected: usize, actual: usize },

    /// The header's size field does not match the datagram length.
    #[error("declared size {declared} does not match received length {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// The payload is not the exact size required by its message type.
    #[error("payload for {message_type} must be {expected} bytes, got {actual}")]
    PayloadSize {
        message_type: MessageType,
        expected: usize,
        actual: usize,
    },

    /// The body does not match the field layout of its message type.
    #[error("payload for {message_type} does not match its layout")]
    Layout { message_type: MessageType },
}

/// All error types that can occur when talking to LIFX devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A network socket operation failed.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// A packet could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A message body could not be written.
    #[error("failed to encode payload: {0}")]
    Encode(std::io::Error),

    /// The encoded packet would not fit in a single datagram.
    #[error("packet of {size} bytes exceeds the maximum of {max}")]
    PacketTooLarge { size: usize, max: usize },

    /// Failed to parse a [`crate::MacAddress`] from a string.
    #[error("invalid mac address: {0}")]
    InvalidMac(String),

    /// Failed to load a configuration document.
    #[error("failed to load config: {0:?}")]
    ConfigLoad(serde_json::Error),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
