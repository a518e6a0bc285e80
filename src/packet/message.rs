//! Message types and the bodies the engine sends or understands.

use std::io::{self, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::errors::DecodeError;
use crate::types::{FirmwareVersion, Label, PowerLevel, WireColor};

/// Numeric message types of the LAN protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum MessageType {
    GetService = 2,
    StateService = 3,
    GetHostFirmware = 14,
    StateHostFirmware = 15,
    GetWifiInfo = 16,
    StateWifiInfo = 17,
    GetWifiFirmware = 18,
    StateWifiFirmware = 19,
    GetPower = 20,
    SetPower = 21,
    StatePower = 22,
    GetLabel = 23,
    SetLabel = 24,
    StateLabel = 25,
    GetVersion = 32,
    StateVersion = 33,
    GetInfo = 34,
    StateInfo = 35,
    SetReboot = 38,
    GetLocation = 48,
    SetLocation = 49,
    StateLocation = 50,
    GetGroup = 51,
    SetGroup = 52,
    StateGroup = 53,
    EchoRequest = 58,
    EchoResponse = 59,
    GetColor = 101,
    SetColor = 102,
    SetWaveform = 103,
    LightState = 107,
    GetLightPower = 116,
    SetLightPower = 117,
    StateLightPower = 118,
    SetWaveformOptional = 119,
    GetInfrared = 120,
    StateInfrared = 121,
    SetInfrared = 122,
    GetHevCycle = 142,
    SetHevCycle = 143,
    StateHevCycle = 144,
    SetHevCycleConfiguration = 146,
    StateHevCycleConfiguration = 147,
    GetLastHevCycleResult = 148,
    StateLastHevCycleResult = 149,
}

impl MessageType {
    pub fn from_code(code: u16) -> Option<Self> {
        MessageType::iter().find(|t| t.code() == code)
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Exact body size for the types this crate encodes or decodes.
    pub fn payload_size(&self) -> Option<usize> {
        match self {
            MessageType::GetService
            | MessageType::GetHostFirmware
            | MessageType::GetLabel
            | MessageType::GetVersion
            | MessageType::GetColor
            | MessageType::GetLightPower => Some(0),
            MessageType::StateService => Some(5),
            MessageType::StateHostFirmware => Some(20),
            MessageType::StateVersion => Some(12),
            MessageType::StateLabel => Some(Label::SIZE),
            MessageType::LightState => Some(52),
            MessageType::StateLightPower => Some(2),
            MessageType::SetColor => Some(13),
            MessageType::SetLightPower => Some(6),
            _ => None,
        }
    }
}

/// A decoded message body, each variant carrying its validated payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    GetService,
    StateService { service: u8, port: u32 },
    GetHostFirmware,
    StateHostFirmware(FirmwareVersion),
    GetLabel,
    StateLabel(Label),
    GetVersion,
    StateVersion { vendor: u32, product: u32 },
    GetColor,
    SetColor { color: WireColor, duration_ms: u32 },
    LightState {
        color: WireColor,
        power: PowerLevel,
        label: Label,
    },
    GetLightPower,
    SetLightPower { level: PowerLevel, duration_ms: u32 },
    StateLightPower(PowerLevel),
    /// A message type this crate does not interpret.
    Unhandled { code: u16 },
}

impl Message {
    pub fn code(&self) -> u16 {
        match self {
            Message::Unhandled { code } => *code,
            known => known.message_type().map_or(0, |t| t.code()),
        }
    }

    pub fn message_type(&self) -> Option<MessageType> {
        let t = match self {
            Message::GetService => MessageType::GetService,
            Message::StateService { .. } => MessageType::StateService,
            Message::GetHostFirmware => MessageType::GetHostFirmware,
            Message::StateHostFirmware(_) => MessageType::StateHostFirmware,
            Message::GetLabel => MessageType::GetLabel,
            Message::StateLabel(_) => MessageType::StateLabel,
            Message::GetVersion => MessageType::GetVersion,
            Message::StateVersion { .. } => MessageType::StateVersion,
            Message::GetColor => MessageType::GetColor,
            Message::SetColor { .. } => MessageType::SetColor,
            Message::LightState { .. } => MessageType::LightState,
            Message::GetLightPower => MessageType::GetLightPower,
            Message::SetLightPower { .. } => MessageType::SetLightPower,
            Message::StateLightPower(_) => MessageType::StateLightPower,
            Message::Unhandled { code } => return MessageType::from_code(*code),
        };
        Some(t)
    }

    /// Decode a body for the given type code.
    ///
    /// Types without a body layout here decode to [`Message::Unhandled`]; a
    /// known type whose payload is not exactly the expected size is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_lan_rs::packet::{Message, MessageType};
    ///
    /// let msg = Message::decode(MessageType::StateLightPower.code(), &[0xFF, 0xFF]).unwrap();
    /// assert!(matches!(msg, Message::StateLightPower(level) if level.is_powered()));
    ///
    /// assert!(Message::decode(MessageType::StateLightPower.code(), &[0xFF]).is_err());
    /// assert_eq!(Message::decode(9999, &[1, 2, 3]).unwrap(), Message::Unhandled { code: 9999 });
    /// ```
    pub fn decode(code: u16, payload: &[u8]) -> Result<Self, DecodeError> {
        let Some(message_type) = MessageType::from_code(code) else {
            return Ok(Message::Unhandled { code });
        };
        let Some(expected) = message_type.payload_size() else {
            return Ok(Message::Unhandled { code });
        };
        if payload.len() != expected {
            return Err(DecodeError::PayloadSize {
                message_type,
                expected,
                actual: payload.len(),
            });
        }

        Self::parse(message_type, payload)
    }

    /// Read a body whose length was already checked against the type.
    ///
    /// Every byte must be consumed by the layout; a short or long body is a
    /// [`DecodeError::Layout`].
    fn parse(message_type: MessageType, payload: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Cursor::new(payload);
        let message = Self::read_body(message_type, &mut r)
            .map_err(|_| DecodeError::Layout { message_type })?;
        if r.position() != payload.len() as u64 {
            return Err(DecodeError::Layout { message_type });
        }
        Ok(message)
    }

    fn read_body(message_type: MessageType, r: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let code = message_type.code();
        let message = match message_type {
            MessageType::GetService => Message::GetService,
            MessageType::StateService => Message::StateService {
                service: r.read_u8()?,
                port: r.read_u32::<LittleEndian>()?,
            },
            MessageType::GetHostFirmware => Message::GetHostFirmware,
            MessageType::StateHostFirmware => {
                let build = r.read_u64::<LittleEndian>()?;
                skip(r, 8)?;
                let minor = r.read_u16::<LittleEndian>()?;
                let major = r.read_u16::<LittleEndian>()?;
                Message::StateHostFirmware(FirmwareVersion {
                    build,
                    major,
                    minor,
                })
            }
            MessageType::GetLabel => Message::GetLabel,
            MessageType::StateLabel => Message::StateLabel(read_label(r)?),
            MessageType::GetVersion => Message::GetVersion,
            MessageType::StateVersion => {
                let vendor = r.read_u32::<LittleEndian>()?;
                let product = r.read_u32::<LittleEndian>()?;
                // hardware version, unused
                skip(r, 4)?;
                Message::StateVersion { vendor, product }
            }
            MessageType::GetColor => Message::GetColor,
            MessageType::SetColor => {
                skip(r, 1)?;
                Message::SetColor {
                    color: read_color(r)?,
                    duration_ms: r.read_u32::<LittleEndian>()?,
                }
            }
            MessageType::LightState => {
                let color = read_color(r)?;
                skip(r, 2)?;
                let power = PowerLevel::new(r.read_u16::<LittleEndian>()?);
                let label = read_label(r)?;
                skip(r, 8)?;
                Message::LightState {
                    color,
                    power,
                    label,
                }
            }
            MessageType::GetLightPower => Message::GetLightPower,
            MessageType::SetLightPower => Message::SetLightPower {
                level: PowerLevel::new(r.read_u16::<LittleEndian>()?),
                duration_ms: r.read_u32::<LittleEndian>()?,
            },
            MessageType::StateLightPower => {
                Message::StateLightPower(PowerLevel::new(r.read_u16::<LittleEndian>()?))
            }
            _ => Message::Unhandled { code },
        };
        Ok(message)
    }

    /// Encode the body. Reserved fields are written as zero.
    pub fn encode_payload(&self) -> io::Result<Vec<u8>> {
        let size = self
            .message_type()
            .and_then(|t| t.payload_size())
            .unwrap_or(0);
        let mut w = Vec::with_capacity(size);
        match self {
            Message::GetService
            | Message::GetHostFirmware
            | Message::GetLabel
            | Message::GetVersion
            | Message::GetColor
            | Message::GetLightPower
            | Message::Unhandled { .. } => {}
            Message::StateService { service, port } => {
                w.write_u8(*service)?;
                w.write_u32::<LittleEndian>(*port)?;
            }
            Message::StateHostFirmware(firmware) => {
                w.write_u64::<LittleEndian>(firmware.build)?;
                w.write_all(&[0; 8])?;
                w.write_u16::<LittleEndian>(firmware.minor)?;
                w.write_u16::<LittleEndian>(firmware.major)?;
            }
            Message::StateLabel(label) => w.write_all(label.as_bytes())?,
            Message::StateVersion { vendor, product } => {
                w.write_u32::<LittleEndian>(*vendor)?;
                w.write_u32::<LittleEndian>(*product)?;
                w.write_all(&[0; 4])?;
            }
            Message::SetColor { color, duration_ms } => {
                w.write_u8(0)?;
                write_color(&mut w, color)?;
                w.write_u32::<LittleEndian>(*duration_ms)?;
            }
            Message::LightState {
                color,
                power,
                label,
            } => {
                write_color(&mut w, color)?;
                w.write_all(&[0; 2])?;
                w.write_u16::<LittleEndian>(power.level())?;
                w.write_all(label.as_bytes())?;
                w.write_all(&[0; 8])?;
            }
            Message::SetLightPower { level, duration_ms } => {
                w.write_u16::<LittleEndian>(level.level())?;
                w.write_u32::<LittleEndian>(*duration_ms)?;
            }
            Message::StateLightPower(level) => w.write_u16::<LittleEndian>(level.level())?,
        }
        Ok(w)
    }
}

fn skip<R: Read>(r: &mut R, n: usize) -> io::Result<()> {
    let mut reserved = [0u8; 8];
    r.read_exact(&mut reserved[..n])
}

fn read_label<R: Read>(r: &mut R) -> io::Result<Label> {
    let mut bytes = [0u8; Label::SIZE];
    r.read_exact(&mut bytes)?;
    Ok(Label::from_bytes(bytes))
}

fn read_color<R: ReadBytesExt>(r: &mut R) -> io::Result<WireColor> {
    Ok(WireColor {
        hue: r.read_u16::<LittleEndian>()?,
        saturation: r.read_u16::<LittleEndian>()?,
        brightness: r.read_u16::<LittleEndian>()?,
        kelvin: r.read_u16::<LittleEndian>()?,
    })
}

fn write_color<W: WriteBytesExt>(w: &mut W, c: &WireColor) -> io::Result<()> {
    w.write_u16::<LittleEndian>(c.hue)?;
    w.write_u16::<LittleEndian>(c.saturation)?;
    w.write_u16::<LittleEndian>(c.brightness)?;
    w.write_u16::<LittleEndian>(c.kelvin)
}
