#![allow(unused_braces)]
use modular_bitfield_msb::prelude::*;

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// CAN control register (CANCTRL)
pub struct CanControl {
    /// Request operation mode bits
    pub reqop: B3,
    /// Abort all pending transmissions bit
    pub abat: bool,
    /// One-shot mode bit
    pub osm: bool,
    /// CLKOUT pin enable bit
    pub clken: bool,
    /// CLKOUT pin prescaler bits
    pub clkpre: B2,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// CAN status register (CANSTAT)
pub struct CanStatus {
    /// Operation mode bits
    pub opmod: B3,
    #[skip]
    __: B1,
    /// Interrupt flag code bits
    pub icod: B3,
    #[skip]
    __: B1,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Interrupt flag register (CANINTF), also the layout of the interrupt enable register (CANINTE)
pub struct InterruptFlags {
    /// Message error interrupt flag bit
    pub merrf: bool,
    /// Wake-up interrupt flag bit
    pub wakif: bool,
    /// Error interrupt flag bit
    pub errif: bool,
    /// Transmit buffer 2 empty interrupt flag bit
    pub tx2if: bool,
    /// Transmit buffer 1 empty interrupt flag bit
    pub tx1if: bool,
    /// Transmit buffer 0 empty interrupt flag bit
    pub tx0if: bool,
    /// Receive buffer 1 full interrupt flag bit
    pub rx1if: bool,
    /// Receive buffer 0 full interrupt flag bit
    pub rx0if: bool,
}

impl InterruptFlags {
    /// Flag bit of the given receive buffer
    pub fn rx_flag(buffer_index: u8) -> u8 {
        match buffer_index {
            0 => Self::new().with_rx0if(true).into(),
            _ => Self::new().with_rx1if(true).into(),
        }
    }

    /// Flag bit of the given transmit buffer
    pub fn tx_flag(buffer_index: u8) -> u8 {
        match buffer_index {
            0 => Self::new().with_tx0if(true).into(),
            1 => Self::new().with_tx1if(true).into(),
            _ => Self::new().with_tx2if(true).into(),
        }
    }
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Transmit buffer control register (TXBnCTRL)
pub struct TxBufferControl {
    #[skip]
    __: B1,
    /// Message aborted flag bit
    pub abtf: bool,
    /// Message lost arbitration bit
    pub mloa: bool,
    /// Transmission error detected bit
    pub txerr: bool,
    /// Message transmit request bit
    pub txreq: bool,
    #[skip]
    __: B1,
    /// Transmit buffer priority bits
    pub txp: B2,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Receive buffer control register (RXBnCTRL)
pub struct RxBufferControl {
    #[skip]
    __: B1,
    /// Receive buffer operating mode bits
    pub rxm: B2,
    #[skip]
    __: B1,
    /// Received remote transfer request bit
    pub rxrtr: bool,
    #[skip]
    __: B3,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Low byte of the standard identifier (TXBnSIDL, RXBnSIDL, RXFnSIDL, RXMnSIDL)
pub struct SidLow {
    /// Three LSB of the standard identifier
    pub sid: B3,
    /// Standard frame remote transmit request bit (received frames only)
    pub srr: bool,
    /// Extended identifier flag bit
    pub ide: bool,
    #[skip]
    __: B1,
    /// Two MSB of the extended identifier
    pub eid: B2,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Data length code register (TXBnDLC, RXBnDLC)
pub struct DataLengthCode {
    #[skip]
    __: B1,
    /// Remote transmission request bit
    pub rtr: bool,
    #[skip]
    __: B2,
    /// Data length code bits
    pub dlc: B4,
}

#[bitfield]
#[derive(Default, Copy, Clone)]
#[repr(u8)]
/// Third configuration register (CNF3)
pub struct Cnf3 {
    /// Start-of-frame signal bit, CLKOUT carries SOF instead of the clock if set
    pub sof: bool,
    /// Wake-up filter bit
    pub wakfil: bool,
    #[skip]
    __: B3,
    /// Phase segment 2 length bits
    pub phseg2: B3,
}
