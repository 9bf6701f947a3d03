//!# CAN Filter
//! The [Filter] object holds the acceptance filter and mask programmed into the MCP2515.
//! The chip offers two masks (one per receive buffer) and six filters. The driver programs
//! the same identifier into all six filters and the same mask into both masks.
//!
//! A mask bit set to 1 requires the corresponding identifier bit to match the filter.
//!
//! ```
//!# use mcp2515::filter::{Filter, ReceiveMode};
//!# use embedded_can::{ExtendedId, StandardId};
//!
//! // Accept standard frames 0x120..=0x12F only
//! let filter = Filter::standard(StandardId::new(0x120).unwrap(), 0x7F0);
//! assert_eq!(ReceiveMode::StandardOnly, filter.receive_mode());
//!
//! // Accept the extended frame 0x18DAF110 only
//! let filter = Filter::extended(ExtendedId::new(0x18DA_F110).unwrap(), 0x1FFF_FFFF);
//! assert_eq!(ReceiveMode::ExtendedOnly, filter.receive_mode());
//! ```

use crate::message::{IdentifierRegisters, EXTENDED_IDENTIFIER_MASK, STANDARD_IDENTIFIER_MASK};
use crate::registers::RxBufferControl;
use embedded_can::{ExtendedId, StandardId};

/// Receive buffer operating mode (RXM bits of RXBnCTRL)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReceiveMode {
    /// Receive only valid messages with standard identifiers that meet filter criteria
    StandardOnly = 0b01,
    /// Receive only valid messages with extended identifiers that meet filter criteria
    ExtendedOnly = 0b10,
    /// Turn masks and filters off, receive any message
    Any = 0b11,
}

impl ReceiveMode {
    /// Encodes the RXBnCTRL register value
    pub(crate) fn as_register(&self) -> u8 {
        RxBufferControl::new().with_rxm(*self as u8).into()
    }
}

/// Acceptance filter and mask
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    /// filter register values
    pub(crate) filter_bits: IdentifierRegisters,
    /// mask register values
    pub(crate) mask_bits: IdentifierRegisters,
    pub(crate) mode: ReceiveMode,
}

impl Filter {
    /// Filter matching standard frames only. Bits of `mask` above bit 10 are ignored.
    pub fn standard(identifier: StandardId, mask: u16) -> Self {
        Self {
            filter_bits: IdentifierRegisters::standard(identifier.as_raw()),
            mask_bits: IdentifierRegisters::standard(mask & STANDARD_IDENTIFIER_MASK),
            mode: ReceiveMode::StandardOnly,
        }
    }

    /// Filter matching extended frames only. Bits of `mask` above bit 28 are ignored.
    pub fn extended(identifier: ExtendedId, mask: u32) -> Self {
        Self {
            filter_bits: IdentifierRegisters::extended(identifier.as_raw()),
            mask_bits: IdentifierRegisters::extended(mask & EXTENDED_IDENTIFIER_MASK),
            mode: ReceiveMode::ExtendedOnly,
        }
    }

    /// Receive buffer mode required by this filter
    pub fn receive_mode(&self) -> ReceiveMode {
        self.mode
    }

    /// Filter register values (RXFnSIDH, RXFnSIDL, RXFnEID8, RXFnEID0)
    pub fn filter_registers(&self) -> &[u8; 4] {
        self.filter_bits.as_bytes()
    }

    /// Mask register values (RXMnSIDH, RXMnSIDL, RXMnEID8, RXMnEID0)
    pub fn mask_registers(&self) -> &[u8; 4] {
        self.mask_bits.as_bytes()
    }
}
