//! The fixed 36-byte packet header.
//!
//! ```text
//! offset  size  field
//! 0       2     size (u16)
//! 2       2     protocol:12 | addressable:1 | tagged:1 | origin:2
//! 4       4     source (u32)
//! 8       8     target (MAC + 2 zero bytes)
//! 16      6     reserved
//! 22      1     res_required:1 | ack_required:1 | reserved:6
//! 23      1     sequence (u8)
//! 24      8     reserved
//! 32      2     type (u16)
//! 34      2     reserved
//! ```
//!
//! All integers are little-endian. Bit fields are packed with explicit masks
//! so the layout does not depend on the host.

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::DecodeError;
use crate::types::MacAddress;

use super::{HEADER_SIZE, PROTOCOL_NUMBER};

const PROTOCOL_MASK: u16 = 0x0FFF;
const ADDRESSABLE_BIT: u16 = 1 << 12;
const TAGGED_BIT: u16 = 1 << 13;
const ORIGIN_SHIFT: u16 = 14;

const RES_REQUIRED_BIT: u8 = 1 << 0;
const ACK_REQUIRED_BIT: u8 = 1 << 1;

/// Decoded form of the 36-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total packet size including this header.
    pub size: u16,
    pub protocol: u16,
    pub addressable: bool,
    /// Set when the packet is addressed to all devices.
    pub tagged: bool,
    pub origin: u8,
    /// Per-session correlation value echoed by devices in their responses.
    pub source: u32,
    pub target: [u8; 8],
    pub res_required: bool,
    pub ack_required: bool,
    pub sequence: u8,
    pub message_type: u16,
}

impl Header {
    /// Header for an outbound request. A missing target addresses all devices.
    pub fn request(
        target: Option<MacAddress>,
        source: u32,
        sequence: u8,
        message_type: u16,
        size: u16,
    ) -> Self {
        Header {
            size,
            protocol: PROTOCOL_NUMBER,
            addressable: true,
            tagged: target.is_none(),
            origin: 0,
            source,
            target: target.map(MacAddress::to_target).unwrap_or_default(),
            res_required: true,
            ack_required: false,
            sequence,
            message_type,
        }
    }

    /// Hardware address of the sender (inbound) or recipient (outbound).
    pub fn mac(&self) -> MacAddress {
        MacAddress::from_target(&self.target)
    }

    pub fn pack(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];

        LittleEndian::write_u16(&mut out[0..2], self.size);

        let mut flags = self.protocol & PROTOCOL_MASK;
        if self.addressable {
            flags |= ADDRESSABLE_BIT;
        }
        if self.tagged {
            flags |= TAGGED_BIT;
        }
        flags |= (u16::from(self.origin) & 0b11) << ORIGIN_SHIFT;
        LittleEndian::write_u16(&mut out[2..4], flags);

        LittleEndian::write_u32(&mut out[4..8], self.source);
        out[8..16].copy_from_slice(&self.target);

        let mut response = 0u8;
        if self.res_required {
            response |= RES_REQUIRED_BIT;
        }
        if self.ack_required {
            response |= ACK_REQUIRED_BIT;
        }
        out[22] = response;
        out[23] = self.sequence;

        LittleEndian::write_u16(&mut out[32..34], self.message_type);
        out
    }

    /// Unpack the first 36 bytes of `bytes`.
    pub fn unpack(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some(raw) = bytes.get(..HEADER_SIZE) else {
            return Err(DecodeError::TooShort {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        };

        let flags = LittleEndian::read_u16(&raw[2..4]);
        let mut target = [0u8; 8];
        target.copy_from_slice(&raw[8..16]);

        Ok(Header {
            size: LittleEndian::read_u16(&raw[0..2]),
            protocol: flags & PROTOCOL_MASK,
            addressable: flags & ADDRESSABLE_BIT != 0,
            tagged: flags & TAGGED_BIT != 0,
            origin: (flags >> ORIGIN_SHIFT) as u8,
            source: LittleEndian::read_u32(&raw[4..8]),
            target,
            res_required: raw[22] & RES_REQUIRED_BIT != 0,
            ack_required: raw[22] & ACK_REQUIRED_BIT != 0,
            sequence: raw[23],
            message_type: LittleEndian::read_u16(&raw[32..34]),
        })
    }
}
