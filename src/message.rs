//!# CAN message encoding
//! Maps [CanFrame] objects onto the register layout of the MCP2515 transmit and receive buffers.
//!
//! Each buffer starts with four identifier registers (SIDH, SIDL, EID8, EID0), followed by the
//! data length code register and eight data registers.
//!
//! ```
//!# use mcp2515::frame::CanFrame;
//!# use mcp2515::message::TxBufferImage;
//!# use embedded_can::{Frame, Id, StandardId};
//!#
//! let id = Id::Standard(StandardId::new(0x123).unwrap());
//! let frame = CanFrame::new_remote(id, 4).unwrap();
//!
//! let image = TxBufferImage::encode(&frame);
//! assert_eq!(0x44, image.data_length_code());
//! assert!(image.payload().is_empty());
//!
//! // The chip reports the received frame in its own receive layout
//! let received = image.loopback().decode();
//! assert_eq!(frame, received);
//! ```

use crate::frame::{CanFrame, MAX_PAYLOAD};
use crate::registers::{DataLengthCode, SidLow};
use embedded_can::{ExtendedId, Id, StandardId};

pub const STANDARD_IDENTIFIER_MASK: u16 = 0x7FF;

pub const EXTENDED_IDENTIFIER_MASK: u32 = 0x1FFF_FFFF;

/// Number of registers of a transmit/receive buffer starting at SIDH
pub const BUFFER_LENGTH: usize = 13;

/// Identifier registers SIDH, SIDL, EID8 and EID0
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentifierRegisters {
    pub(crate) bytes: [u8; 4],
}

impl IdentifierRegisters {
    /// Encodes the given identifier
    pub fn encode(identifier: Id) -> Self {
        match identifier {
            Id::Standard(sid) => Self::standard(sid.as_raw()),
            Id::Extended(eid) => Self::extended(eid.as_raw()),
        }
    }

    /// Encodes the lower 11 bits as standard identifier, extended bytes are zeroed
    pub fn standard(raw: u16) -> Self {
        let raw = raw & STANDARD_IDENTIFIER_MASK;
        let sid_low = SidLow::new().with_sid((raw & 0x07) as u8);

        Self {
            bytes: [(raw >> 3) as u8, sid_low.into(), 0x00, 0x00],
        }
    }

    /// Encodes the lower 29 bits as extended identifier
    pub fn extended(raw: u32) -> Self {
        let raw = raw & EXTENDED_IDENTIFIER_MASK;
        let sid_low = SidLow::new()
            .with_sid(((raw >> 18) & 0x07) as u8)
            .with_ide(true)
            .with_eid(((raw >> 16) & 0x03) as u8);

        Self {
            bytes: [(raw >> 21) as u8, sid_low.into(), (raw >> 8) as u8, raw as u8],
        }
    }

    /// Decodes the identifier, the IDE bit selects between standard and extended format
    pub fn decode(&self) -> Id {
        let sid_low = self.sid_low();
        let sid = ((self.bytes[0] as u16) << 3) | sid_low.sid() as u16;

        if !sid_low.ide() {
            return Id::Standard(StandardId::new(sid).unwrap_or(StandardId::ZERO));
        }

        let raw = ((sid as u32) << 18)
            | ((sid_low.eid() as u32) << 16)
            | ((self.bytes[2] as u32) << 8)
            | self.bytes[3] as u32;

        // at most 29 bits are assembled above
        Id::Extended(ExtendedId::new(raw).unwrap_or(ExtendedId::ZERO))
    }

    /// True if the IDE bit is set
    pub fn is_extended(&self) -> bool {
        self.sid_low().ide()
    }

    /// Register values in address order
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.bytes
    }

    fn sid_low(&self) -> SidLow {
        SidLow::from(self.bytes[1])
    }
}

/// Register contents of a transmit buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TxBufferImage {
    pub(crate) identifier: IdentifierRegisters,
    pub(crate) dlc: u8,
    pub(crate) data: [u8; MAX_PAYLOAD],
}

impl TxBufferImage {
    /// Encodes the frame into transmit buffer registers
    pub fn encode(frame: &CanFrame) -> Self {
        let control = DataLengthCode::new()
            .with_rtr(frame.rtr)
            .with_dlc(frame.dlc & 0x0F);

        let mut data = [0u8; MAX_PAYLOAD];
        if !frame.rtr {
            data = frame.data;
        }

        Self {
            identifier: IdentifierRegisters::encode(frame.identifier),
            dlc: control.into(),
            data,
        }
    }

    /// Identifier registers
    pub fn identifier(&self) -> &IdentifierRegisters {
        &self.identifier
    }

    /// Value of the DLC register
    pub fn data_length_code(&self) -> u8 {
        self.dlc
    }

    /// Payload bytes to be written into the data registers, empty for remote frames
    pub fn payload(&self) -> &[u8] {
        let control = DataLengthCode::from(self.dlc);

        if control.rtr() {
            return &[];
        }

        &self.data[..(control.dlc() as usize).min(MAX_PAYLOAD)]
    }

    /// Returns the receive buffer image the chip presents for this frame when it is looped back.
    /// Remote requests of standard frames are reported by the SRR bit instead of the DLC register.
    pub fn loopback(&self) -> RxBufferImage {
        let mut identifier = self.identifier;
        let mut control = DataLengthCode::from(self.dlc);
        let mut data = self.data;

        if control.rtr() {
            data = [0u8; MAX_PAYLOAD];

            if !identifier.is_extended() {
                identifier.bytes[1] = identifier.sid_low().with_srr(true).into();
                control.set_rtr(false);
            }
        }

        RxBufferImage {
            identifier,
            dlc: control.into(),
            data,
        }
    }

    /// Creates an image from buffer registers SIDH to D7
    pub fn from_bytes(buffer: &[u8; BUFFER_LENGTH]) -> Self {
        let mut data = [0u8; MAX_PAYLOAD];
        data.copy_from_slice(&buffer[5..]);

        Self {
            identifier: IdentifierRegisters {
                bytes: [buffer[0], buffer[1], buffer[2], buffer[3]],
            },
            dlc: buffer[4],
            data,
        }
    }

    /// Buffer registers from SIDH to D7
    pub fn to_bytes(&self) -> [u8; BUFFER_LENGTH] {
        to_buffer(&self.identifier, self.dlc, &self.data)
    }
}

/// Register contents of a receive buffer
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxBufferImage {
    pub(crate) identifier: IdentifierRegisters,
    pub(crate) dlc: u8,
    pub(crate) data: [u8; MAX_PAYLOAD],
}

impl RxBufferImage {
    /// Creates an image from buffer registers SIDH to D7
    pub fn from_bytes(buffer: &[u8; BUFFER_LENGTH]) -> Self {
        let mut image = Self::from_header(&[buffer[0], buffer[1], buffer[2], buffer[3], buffer[4]]);
        image.data.copy_from_slice(&buffer[5..]);

        image
    }

    /// Creates an image without payload from registers SIDH to DLC
    pub(crate) fn from_header(header: &[u8; 5]) -> Self {
        Self {
            identifier: IdentifierRegisters {
                bytes: [header[0], header[1], header[2], header[3]],
            },
            dlc: header[4],
            data: [0u8; MAX_PAYLOAD],
        }
    }

    /// Buffer registers from SIDH to D7
    pub fn to_bytes(&self) -> [u8; BUFFER_LENGTH] {
        to_buffer(&self.identifier, self.dlc, &self.data)
    }

    /// True for remote frames. Standard frames report RTR in the SRR bit, extended frames in the DLC register.
    pub fn is_remote(&self) -> bool {
        if self.identifier.is_extended() {
            DataLengthCode::from(self.dlc).rtr()
        } else {
            self.identifier.sid_low().srr()
        }
    }

    /// Data length code (0-15)
    pub fn data_length_code(&self) -> u8 {
        DataLengthCode::from(self.dlc).dlc()
    }

    /// Number of data registers holding payload
    pub fn payload_length(&self) -> usize {
        if self.is_remote() {
            return 0;
        }

        (self.data_length_code() as usize).min(MAX_PAYLOAD)
    }

    /// Decodes the receive buffer into a frame
    pub fn decode(&self) -> CanFrame {
        let rtr = self.is_remote();
        let mut data = [0u8; MAX_PAYLOAD];
        let length = self.payload_length();
        data[..length].copy_from_slice(&self.data[..length]);

        CanFrame {
            identifier: self.identifier.decode(),
            rtr,
            dlc: self.data_length_code(),
            data,
        }
    }
}

fn to_buffer(identifier: &IdentifierRegisters, dlc: u8, data: &[u8; MAX_PAYLOAD]) -> [u8; BUFFER_LENGTH] {
    let mut buffer = [0u8; BUFFER_LENGTH];
    buffer[..4].copy_from_slice(identifier.as_bytes());
    buffer[4] = dlc;
    buffer[5..].copy_from_slice(data);

    buffer
}
