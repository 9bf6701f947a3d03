use crate::status::OperationMode;
use embedded_time::duration::Milliseconds;
use log::debug;

/// Oscillator frequency of most MCP2515 breakout boards
pub const DEFAULT_CLOCK_FREQUENCY: u32 = 16_000_000;

/// Entire configuration currently supported
#[derive(Copy, Clone, Debug)]
pub struct Configuration {
    /// Frequency of the oscillator attached to the MCP2515 in Hz
    pub clock_frequency: u32,

    /// CAN bus bit rate in bit/s
    pub bit_rate: u32,

    /// Mode entered after configuration
    pub mode: OperationMode,

    /// Enables the CLKOUT pin with the given prescaler
    pub clock_output: Option<ClockOutputDivisor>,

    /// Maximum time to wait for a pending transmission
    pub transmit_timeout: Milliseconds<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
            bit_rate: 500_000,
            mode: OperationMode::Normal,
            clock_output: None,
            transmit_timeout: Milliseconds::new(100),
        }
    }
}

impl Configuration {
    /// Looks up the timing registers for the configured oscillator and bit rate
    pub fn timing(&self) -> Result<TimingRegisters, ConfigError> {
        configure_bit_rate(self.clock_frequency, self.bit_rate)
    }
}

/// Divisor for the CLKOUT pin
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockOutputDivisor {
    DivideBy1 = 0b00,
    DivideBy2 = 0b01,
    DivideBy4 = 0b10,
    DivideBy8 = 0b11,
}

impl Default for ClockOutputDivisor {
    fn default() -> Self {
        Self::DivideBy1
    }
}

impl ClockOutputDivisor {
    /// Maps CANCTRL register values to configuration
    pub(crate) fn from_register(register: u8) -> Self {
        match register & 0b11 {
            0b01 => Self::DivideBy2,
            0b10 => Self::DivideBy4,
            0b11 => Self::DivideBy8,
            _ => Self::DivideBy1,
        }
    }
}

/// Values of the bit timing registers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingRegisters {
    pub cnf1: u8,
    pub cnf2: u8,
    pub cnf3: u8,
}

impl TimingRegisters {
    pub(crate) const fn new(cnf1: u8, cnf2: u8, cnf3: u8) -> Self {
        Self { cnf1, cnf2, cnf3 }
    }
}

/// Timing register values realizing a bit rate with a given oscillator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitTimingProfile {
    /// Oscillator frequency in Hz
    pub clock_frequency: u32,
    /// Bit rate in bit/s
    pub bit_rate: u32,
    pub registers: TimingRegisters,
}

impl BitTimingProfile {
    const fn new(clock_frequency: u32, bit_rate: u32, registers: TimingRegisters) -> Self {
        Self {
            clock_frequency,
            bit_rate,
            registers,
        }
    }
}

const MHZ_8: u32 = 8_000_000;
const MHZ_16: u32 = 16_000_000;

/// Supported combinations of oscillator frequency and bit rate
pub const BIT_TIMING_PROFILES: [BitTimingProfile; 24] = [
    BitTimingProfile::new(MHZ_8, 1_000_000, TimingRegisters::new(0x00, 0x80, 0x00)),
    BitTimingProfile::new(MHZ_8, 500_000, TimingRegisters::new(0x00, 0x90, 0x02)),
    BitTimingProfile::new(MHZ_8, 250_000, TimingRegisters::new(0x00, 0xb1, 0x05)),
    BitTimingProfile::new(MHZ_8, 200_000, TimingRegisters::new(0x00, 0xb4, 0x06)),
    BitTimingProfile::new(MHZ_8, 125_000, TimingRegisters::new(0x01, 0xb1, 0x05)),
    BitTimingProfile::new(MHZ_8, 100_000, TimingRegisters::new(0x01, 0xb4, 0x06)),
    BitTimingProfile::new(MHZ_8, 80_000, TimingRegisters::new(0x01, 0xbf, 0x07)),
    BitTimingProfile::new(MHZ_8, 50_000, TimingRegisters::new(0x03, 0xb4, 0x06)),
    BitTimingProfile::new(MHZ_8, 40_000, TimingRegisters::new(0x03, 0xbf, 0x07)),
    BitTimingProfile::new(MHZ_8, 20_000, TimingRegisters::new(0x07, 0xbf, 0x07)),
    BitTimingProfile::new(MHZ_8, 10_000, TimingRegisters::new(0x0f, 0xbf, 0x07)),
    BitTimingProfile::new(MHZ_8, 5_000, TimingRegisters::new(0x1f, 0xbf, 0x07)),
    BitTimingProfile::new(MHZ_16, 1_000_000, TimingRegisters::new(0x00, 0xd0, 0x82)),
    BitTimingProfile::new(MHZ_16, 500_000, TimingRegisters::new(0x00, 0xf0, 0x86)),
    BitTimingProfile::new(MHZ_16, 250_000, TimingRegisters::new(0x41, 0xf1, 0x85)),
    BitTimingProfile::new(MHZ_16, 200_000, TimingRegisters::new(0x01, 0xfa, 0x87)),
    BitTimingProfile::new(MHZ_16, 125_000, TimingRegisters::new(0x03, 0xf0, 0x86)),
    BitTimingProfile::new(MHZ_16, 100_000, TimingRegisters::new(0x03, 0xfa, 0x87)),
    BitTimingProfile::new(MHZ_16, 80_000, TimingRegisters::new(0x03, 0xff, 0x87)),
    BitTimingProfile::new(MHZ_16, 50_000, TimingRegisters::new(0x07, 0xfa, 0x87)),
    BitTimingProfile::new(MHZ_16, 40_000, TimingRegisters::new(0x07, 0xff, 0x87)),
    BitTimingProfile::new(MHZ_16, 20_000, TimingRegisters::new(0x0f, 0xff, 0x87)),
    BitTimingProfile::new(MHZ_16, 10_000, TimingRegisters::new(0x1f, 0xff, 0x87)),
    BitTimingProfile::new(MHZ_16, 5_000, TimingRegisters::new(0x3f, 0xff, 0x87)),
];

/// Possible errors when creating the configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No timing profile for the given oscillator frequency and bit rate
    UnsupportedBitRate { clock_frequency: u32, bit_rate: u32 },
}

/// Returns the timing register values for the given oscillator frequency and bit rate.
/// Only exact matches of the profile table are accepted.
pub fn configure_bit_rate(clock_frequency: u32, bit_rate: u32) -> Result<TimingRegisters, ConfigError> {
    BIT_TIMING_PROFILES
        .iter()
        .find(|profile| profile.clock_frequency == clock_frequency && profile.bit_rate == bit_rate)
        .map(|profile| profile.registers)
        .ok_or_else(|| {
            debug!("No timing profile for {bit_rate} bit/s with {clock_frequency} Hz oscillator");
            ConfigError::UnsupportedBitRate {
                clock_frequency,
                bit_rate,
            }
        })
}
