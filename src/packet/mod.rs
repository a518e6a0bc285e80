//! Wire codec for the LAN protocol.
//!
//! Every packet is a fixed 36-byte [`Header`] followed by a message body whose
//! size is fixed per message type. The header's size field always equals the
//! true encoded length; decoding rejects any datagram where it does not.

mod header;
mod message;

pub use header::Header;
pub use message::{Message, MessageType};

use crate::errors::{DecodeError, Error};
use crate::types::MacAddress;

type Result<T> = std::result::Result<T, Error>;

/// Size of the fixed packet header.
pub const HEADER_SIZE: usize = 36;
/// Protocol number carried in every header.
pub const PROTOCOL_NUMBER: u16 = 1024;
/// Largest packet this crate will encode.
pub const MAX_PACKET_SIZE: usize = 0x80;
/// Well-known UDP port devices listen on.
pub const DEFAULT_PORT: u16 = 56700;

/// A received datagram with a validated header.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'a> {
    pub header: Header,
    pub payload: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Validate framing and split off the payload.
    pub fn decode(bytes: &'a [u8]) -> std::result::Result<Self, DecodeError> {
        let header = Header::unpack(bytes)?;
        let declared = usize::from(header.size);
        if declared != bytes.len() {
            return Err(DecodeError::SizeMismatch {
                declared,
                actual: bytes.len(),
            });
        }
        Ok(Packet {
            header,
            payload: &bytes[HEADER_SIZE..],
        })
    }

    /// Decode the body according to the header's message type.
    pub fn message(&self) -> std::result::Result<Message, DecodeError> {
        Message::decode(self.header.message_type, self.payload)
    }

    pub fn source(&self) -> u32 {
        self.header.source
    }

    pub fn mac(&self) -> MacAddress {
        self.header.mac()
    }

    pub fn message_type(&self) -> u16 {
        self.header.message_type
    }
}

/// Decode a received datagram. See [`Packet::decode`].
pub fn decode(bytes: &[u8]) -> std::result::Result<Packet<'_>, DecodeError> {
    Packet::decode(bytes)
}

/// Encode a request addressed to `target`, or to every device when `None`.
///
/// # Examples
///
/// ```
/// use lifx_lan_rs::packet::{self, Message, MessageType};
///
/// let bytes = packet::encode(None, 0x1234, 0, &Message::GetService).unwrap();
/// assert_eq!(bytes.len(), 36);
///
/// let decoded = packet::decode(&bytes).unwrap();
/// assert!(decoded.header.tagged);
/// assert_eq!(decoded.source(), 0x1234);
/// assert_eq!(decoded.message_type(), MessageType::GetService.code());
/// ```
pub fn encode(
    target: Option<MacAddress>,
    source: u32,
    sequence: u8,
    message: &Message,
) -> Result<Vec<u8>> {
    let payload = message.encode_payload().map_err(Error::Encode)?;
    encode_raw(target, source, sequence, message.code(), &payload)
}

/// Encode an arbitrary payload under the given type code.
///
/// Payloads that would push the packet past [`MAX_PACKET_SIZE`] are rejected
/// rather than truncated.
pub fn encode_raw(
    target: Option<MacAddress>,
    source: u32,
    sequence: u8,
    message_type: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let size = HEADER_SIZE + payload.len();
    if size > MAX_PACKET_SIZE {
        return Err(Error::PacketTooLarge {
            size,
            max: MAX_PACKET_SIZE,
        });
    }

    // size <= MAX_PACKET_SIZE, so it fits in the u16 field
    let header = Header::request(target, source, sequence, message_type, size as u16);
    let mut bytes = Vec::with_capacity(size);
    bytes.extend_from_slice(&header.pack());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}


#[cfg(test)]
mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::{HEADER_SIZE, MAX_PACKET_SIZE, Message, PROTOCOL_NUMBER, decode, encode, encode_raw};
    use crate::errors::DecodeError;
    use crate::types::{FirmwareVersion, Label, MacAddress, PowerLevel, WireColor};

    fn wire_color() -> impl Strategy<Value = WireColor> {
        any::<[u16; 4]>().prop_map(|[hue, saturation, brightness, kelvin]| WireColor {
            hue,
            saturation,
            brightness,
            kelvin,
        })
    }

    fn message() -> impl Strategy<Value = Message> {
        prop_oneof![
            Just(Message::GetService),
            Just(Message::GetColor),
            (any::<u8>(), any::<u32>())
                .prop_map(|(service, port)| Message::StateService { service, port }),
            (any::<u64>(), any::<u16>(), any::<u16>()).prop_map(|(build, major, minor)| {
                Message::StateHostFirmware(FirmwareVersion {
                    build,
                    major,
                    minor,
                })
            }),
            (any::<u32>(), any::<u32>())
                .prop_map(|(vendor, product)| Message::StateVersion { vendor, product }),
            any::<[u8; 32]>().prop_map(|b| Message::StateLabel(Label::from_bytes(b))),
            (wire_color(), any::<u32>())
                .prop_map(|(color, duration_ms)| Message::SetColor { color, duration_ms }),
            (wire_color(), any::<u16>(), any::<[u8; 32]>()).prop_map(|(color, power, label)| {
                Message::LightState {
                    color,
                    power: PowerLevel::new(power),
                    label: Label::from_bytes(label),
                }
            }),
            (any::<u16>(), any::<u32>()).prop_map(|(level, duration_ms)| {
                Message::SetLightPower {
                    level: PowerLevel::new(level),
                    duration_ms,
                }
            }),
            any::<u16>().prop_map(|level| Message::StateLightPower(PowerLevel::new(level))),
        ]
    }

    proptest! {
        #[test]
        fn test_header_fields_survive_encoding(
            octets: [u8; 6],
            broadcast: bool,
            source: u32,
            sequence: u8,
            message_type: u16,
            payload in vec(any::<u8>(), 0..=MAX_PACKET_SIZE - HEADER_SIZE),
        ) {
            let target = (!broadcast).then(|| MacAddress::new(octets));
            let bytes = encode_raw(target, source, sequence, message_type, &payload).unwrap();
            let packet = decode(&bytes).unwrap();

            prop_assert_eq!(usize::from(packet.header.size), bytes.len());
            prop_assert_eq!(packet.header.protocol, PROTOCOL_NUMBER);
            prop_assert!(packet.header.addressable);
            prop_assert_eq!(packet.header.tagged, broadcast);
            prop_assert_eq!(packet.mac(), target.unwrap_or_default());
            prop_assert_eq!(packet.source(), source);
            prop_assert_eq!(packet.header.sequence, sequence);
            prop_assert_eq!(packet.message_type(), message_type);
            prop_assert_eq!(packet.payload, &payload[..]);
        }

        #[test]
        fn test_message_bodies_survive_encoding(message in message(), source: u32, sequence: u8) {
            let bytes = encode(None, source, sequence, &message).unwrap();
            prop_assert!(bytes.len() <= MAX_PACKET_SIZE);
            prop_assert_eq!(decode(&bytes).unwrap().message().unwrap(), message);
        }

        #[test]
        fn test_size_field_must_match_length(message in message(), declared: u16) {
            let mut bytes = encode(None, 1, 0, &message).unwrap();
            bytes[0..2].copy_from_slice(&declared.to_le_bytes());

            let result = decode(&bytes);
            if usize::from(declared) == bytes.len() {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(
                    result.unwrap_err(),
                    DecodeError::SizeMismatch {
                        declared: usize::from(declared),
                        actual: bytes.len(),
                    }
                );
            }
        }

        #[test]
        fn test_arbitrary_datagrams_never_panic(bytes in vec(any::<u8>(), 0..256)) {
            match decode(&bytes) {
                Ok(packet) => {
                    prop_assert_eq!(usize::from(packet.header.size), bytes.len());
                    let _ = packet.message();
                }
                Err(DecodeError::TooShort { .. }) => prop_assert!(bytes.len() < HEADER_SIZE),
                Err(e) => {
                    let is_size_mismatch = matches!(e, DecodeError::SizeMismatch { .. });
                    prop_assert!(is_size_mismatch);
                }
            }
        }
    }
}
