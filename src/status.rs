use crate::registers::{CanStatus, TxBufferControl};

///  Operation status read from CANSTAT register
#[derive(Copy, Clone, Debug)]
pub struct OperationStatus {
    /// Current operation mode, None for reserved mode bits
    pub mode: Option<OperationMode>,

    /// Raw operation mode bits
    pub mode_bits: u8,

    /// Highest priority pending interrupt
    pub interrupt: InterruptCode,
}

impl OperationStatus {
    pub(crate) fn from_register(register: u8) -> Self {
        let status = CanStatus::from(register);

        Self {
            mode: OperationMode::from_bits(status.opmod()),
            mode_bits: status.opmod(),
            interrupt: InterruptCode::from_bits(status.icod()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationMode {
    /// Module is in normal operation mode
    Normal = 0b000,
    /// Module is in sleep mode
    Sleep = 0b001,
    /// Module is in loopback mode, transmitted frames are received internally
    Loopback = 0b010,
    /// Module is in listen-only mode
    ListenOnly = 0b011,
    /// Module is in configuration mode
    Configuration = 0b100,
}

impl OperationMode {
    /// Maps the three mode bits (REQOP/OPMOD)
    pub(crate) fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Self::Normal),
            0b001 => Some(Self::Sleep),
            0b010 => Some(Self::Loopback),
            0b011 => Some(Self::ListenOnly),
            0b100 => Some(Self::Configuration),
            _ => None,
        }
    }
}

/// Interrupt flag code of CANSTAT register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterruptCode {
    None = 0b000,
    Error = 0b001,
    WakeUp = 0b010,
    TxBuffer0 = 0b011,
    TxBuffer1 = 0b100,
    TxBuffer2 = 0b101,
    RxBuffer0 = 0b110,
    RxBuffer1 = 0b111,
}

impl InterruptCode {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b001 => Self::Error,
            0b010 => Self::WakeUp,
            0b011 => Self::TxBuffer0,
            0b100 => Self::TxBuffer1,
            0b101 => Self::TxBuffer2,
            0b110 => Self::RxBuffer0,
            0b111 => Self::RxBuffer1,
            _ => Self::None,
        }
    }
}

/// Status of a transmit buffer read from TXBnCTRL register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransmitStatus {
    /// Transmission is pending
    pub pending: bool,

    /// Message was aborted
    pub aborted: bool,

    /// Message lost arbitration while being sent
    pub lost_arbitration: bool,

    /// Bus error occurred while the message was being transmitted
    pub error: bool,
}

impl TransmitStatus {
    pub(crate) fn from_register(register: u8) -> Self {
        let control = TxBufferControl::from(register);

        Self {
            pending: control.txreq(),
            aborted: control.abtf(),
            lost_arbitration: control.mloa(),
            error: control.txerr(),
        }
    }

    /// True if any of the abort, arbitration or error flags is set
    pub fn is_failed(&self) -> bool {
        self.aborted || self.lost_arbitration || self.error
    }
}
