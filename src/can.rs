//!# CAN Controller device
//!
//!```
//!# use mcp2515::can::{CanController, MCP2515};
//!# use mcp2515::config::Configuration;
//!# use mcp2515::example::*;
//!# use mcp2515::frame::CanFrame;
//!# use mcp2515::status::OperationMode;
//!# use embedded_can::{Frame, Id, StandardId};
//!#
//! let clock = ExampleClock::default();
//! let mut delay = ExampleDelay::default();
//! let spi_dev = ExampleSPIDevice::default();
//!
//! // Initialize controller object
//! let mut can_controller = MCP2515::new(spi_dev);
//!
//! // 500 kbit/s with 16 MHz oscillator, frames are looped back internally
//! let can_config = Configuration {
//!     mode: OperationMode::Loopback,
//!     ..Configuration::default()
//! };
//!
//! // Configure CAN controller
//! can_controller.configure(&can_config, &clock, &mut delay).unwrap();
//!
//! let id = Id::Standard(StandardId::new(0x55).unwrap());
//! let frame = CanFrame::new(id, &[1, 2, 3]).unwrap();
//!
//! // Yield to the host scheduler while the transmission is pending
//! can_controller.transmit(&frame, &clock, &mut || {}).unwrap();
//!
//! let received = can_controller.receive().unwrap().unwrap();
//! assert_eq!(&[1, 2, 3], received.data());
//! assert!(can_controller.receive().unwrap().is_none());
//! ```

use crate::config::{ClockOutputDivisor, ConfigError, Configuration};
use crate::filter::{Filter, ReceiveMode};
use crate::frame::CanFrame;
use crate::message::{RxBufferImage, TxBufferImage};
use crate::registers::{CanControl, Cnf3, InterruptFlags, TxBufferControl};
use crate::status::{OperationMode, OperationStatus, TransmitStatus};
use core::fmt::Write;
use core::marker::PhantomData;
use embedded_can::{ExtendedId, StandardId};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use embedded_time::duration::Milliseconds;
use embedded_time::Clock;
use log::{debug, warn};

const REGISTER_BFPCTRL: u8 = 0x0C;

const REGISTER_TXRTSCTRL: u8 = 0x0D;

const REGISTER_CANSTAT: u8 = 0x0E;

const REGISTER_CANCTRL: u8 = 0x0F;

const REGISTER_CNF3: u8 = 0x28;

const REGISTER_CNF2: u8 = 0x29;

const REGISTER_CNF1: u8 = 0x2A;

const REGISTER_CANINTE: u8 = 0x2B;

const REGISTER_CANINTF: u8 = 0x2C;

/// Number of addressable registers
pub const REGISTER_COUNT: u8 = 128;

/// Transmit buffer used for sending frames
const TX_BUFFER_INDEX: u8 = 0;

/// Number of receive buffers, lower index wins if both are full
const RX_BUFFER_COUNT: u8 = 2;

/// Number of acceptance filters
const FILTER_COUNT: u8 = 6;

/// Minimum delay after reset command
const RESET_DELAY_US: u32 = 10;

/// Maximum time for reaching a requested operation mode
const MODE_TIMEOUT_MS: u32 = 2;

/// Maximum time for a pending transmission to stop after ABAT was set
const ABORT_TIMEOUT_MS: u32 = 2;

#[derive(Debug)]
pub enum SpiError<D: SpiDevice<u8>> {
    BusError(D::Error),
}
impl<D: SpiDevice<u8>> PartialEq for SpiError<D> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (Self::BusError(_), Self::BusError(_)))
    }
}

/// Possible CAN errors during Configuration/Transmission/Reception
#[derive(Debug, PartialEq)]
pub enum CanError<D: SpiDevice<u8>> {
    /// SPI bus transfer error
    BusErr(SpiError<D>),
    /// Internal clock error
    ClockError,
    /// Invalid configuration
    Config(ConfigError),
    /// Device did not report the requested operation mode
    ModeVerificationFailure {
        requested: OperationMode,
        /// Mode bits reported by CANSTAT
        actual: u8,
    },
    /// Pending transmission was aborted
    TransmitAborted,
    /// Chip reported an error or lost arbitration after the transmission completed
    TransmitFailed(TransmitStatus),
    /// Transmission still pending after the configured timeout, an abort was requested
    TransmitTimeout,
    /// Writing the register dump failed
    Format,
}

impl<D: SpiDevice<u8>> CanError<D> {
    /// True for transmit outcomes which callers may retry. Bus and configuration errors are fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CanError::TransmitAborted | CanError::TransmitFailed(_) | CanError::TransmitTimeout
        )
    }
}

impl<D: SpiDevice<u8>> From<SpiError<D>> for CanError<D> {
    fn from(value: SpiError<D>) -> Self {
        CanError::BusErr(value)
    }
}

impl<D: SpiDevice<u8>> From<ConfigError> for CanError<D> {
    fn from(value: ConfigError) -> Self {
        CanError::Config(value)
    }
}

/// Host primitive for handing control back while waiting on the chip
pub trait Scheduler {
    /// Yields control to the host scheduler
    fn yield_now(&mut self);
}

impl<F: FnMut()> Scheduler for F {
    fn yield_now(&mut self) {
        self()
    }
}

/// Main MCP2515 CAN controller device
pub struct MCP2515<D: SpiDevice<u8>, CLK: Clock> {
    /// Device on SPI bus
    device: D,

    /// Maximum wait time of pending transmissions
    transmit_timeout: Milliseconds<u32>,

    /// Frame returned by the last successful receive
    last_received: Option<CanFrame>,

    /// System clock
    clock: PhantomData<CLK>,
}

/// Trait for CAN controller
pub trait CanController<CLK: Clock> {
    type Error;

    /// Transmit CAN frame and wait for completion
    /// * `clock`: used for the transmit timeout
    /// * `scheduler`: invoked on every poll of the pending transmission
    fn transmit<S: Scheduler>(&mut self, frame: &CanFrame, clock: &CLK, scheduler: &mut S) -> Result<(), Self::Error>;

    /// Receive next pending CAN frame. Receive buffer 0 takes precedence over buffer 1.
    fn receive(&mut self) -> Result<Option<CanFrame>, Self::Error>;

    /// Set corresponding filter and mask registers
    fn set_filter_object(&mut self, filter: &Filter) -> Result<(), Self::Error>;
}

impl<D, CLK> CanController<CLK> for MCP2515<D, CLK>
where
    D: SpiDevice<u8>,
    CLK: Clock,
{
    type Error = CanError<D>;

    fn transmit<S: Scheduler>(&mut self, frame: &CanFrame, clock: &CLK, scheduler: &mut S) -> Result<(), Self::Error> {
        let control_reg = Self::tx_buffer_register(TX_BUFFER_INDEX);
        let image = TxBufferImage::encode(frame);

        self.load_tx_buffer(control_reg, &image)?;

        // Request transmission
        self.write_register(control_reg, TxBufferControl::new().with_txreq(true).into())?;

        let result = self.await_transmission(control_reg, clock, scheduler);

        // Interrupt flag is cleared whether sent, aborted or timed out
        self.modify_register(REGISTER_CANINTF, InterruptFlags::tx_flag(TX_BUFFER_INDEX), 0x00)?;

        if result? {
            return Err(CanError::TransmitAborted);
        }

        let status = TransmitStatus::from_register(self.read_register(control_reg)?);
        if status.is_failed() {
            debug!("Transmission completed with error flags: {status:?}");
            return Err(CanError::TransmitFailed(status));
        }

        Ok(())
    }

    fn receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        let flags = InterruptFlags::from(self.read_register(REGISTER_CANINTF)?);

        let buffer_index = if flags.rx0if() {
            0
        } else if flags.rx1if() {
            1
        } else {
            self.last_received = None;
            return Ok(None);
        };

        let frame = self.read_rx_buffer(buffer_index)?;

        self.modify_register(REGISTER_CANINTF, InterruptFlags::rx_flag(buffer_index), 0x00)?;

        self.last_received = Some(frame);
        Ok(Some(frame))
    }

    fn set_filter_object(&mut self, filter: &Filter) -> Result<(), Self::Error> {
        self.set_mode(OperationMode::Configuration)?;

        for buffer_index in 0..RX_BUFFER_COUNT {
            self.write_register(
                Self::rx_buffer_register(buffer_index),
                filter.receive_mode().as_register(),
            )?;
            self.write_identifier(Self::mask_register(buffer_index), filter.mask_registers())?;
        }

        for filter_index in 0..FILTER_COUNT {
            self.write_identifier(Self::filter_register(filter_index), filter.filter_registers())?;
        }

        self.set_mode(OperationMode::Normal)?;

        Ok(())
    }
}

impl<D, CLK> MCP2515<D, CLK>
where
    D: SpiDevice<u8>,
    CLK: Clock,
{
    pub fn new(spi_dev: D) -> Self {
        Self {
            device: spi_dev,
            transmit_timeout: Configuration::default().transmit_timeout,
            last_received: None,
            clock: Default::default(),
        }
    }

    /// Resets the device and configures it with the given settings.
    /// Bit rate lookup happens before any register access.
    pub fn configure<DL: DelayNs>(
        &mut self,
        config: &Configuration,
        clock: &CLK,
        delay: &mut DL,
    ) -> Result<(), CanError<D>> {
        let timing = config.timing()?;

        self.reset(delay)?;

        let mut control = CanControl::new().with_reqop(OperationMode::Configuration as u8);
        let mut cnf3 = Cnf3::from(timing.cnf3);

        if let Some(divisor) = config.clock_output {
            control = control.with_clken(true).with_clkpre(divisor as u8);
            cnf3.set_sof(false);
        }

        self.write_register(REGISTER_CANCTRL, control.into())?;
        self.await_mode(OperationMode::Configuration, clock)?;

        self.write_register(REGISTER_CNF1, timing.cnf1)?;
        self.write_register(REGISTER_CNF2, timing.cnf2)?;
        self.write_register(REGISTER_CNF3, cnf3.into())?;

        let interrupts = InterruptFlags::new().with_rx0if(true).with_rx1if(true);
        self.write_register(REGISTER_CANINTE, interrupts.into())?;
        self.write_register(REGISTER_BFPCTRL, 0x00)?;
        self.write_register(REGISTER_TXRTSCTRL, 0x00)?;

        for buffer_index in 0..RX_BUFFER_COUNT {
            self.write_register(Self::rx_buffer_register(buffer_index), ReceiveMode::Any.as_register())?;
        }

        self.transmit_timeout = config.transmit_timeout;

        self.enter_mode(config.mode, clock)
    }

    /// Requests the given operation mode without verifying it
    pub fn set_mode(&mut self, mode: OperationMode) -> Result<(), CanError<D>> {
        let mask = CanControl::new().with_reqop(0b111);
        let value = CanControl::new().with_reqop(mode as u8);

        self.modify_register(REGISTER_CANCTRL, mask.into(), value.into())?;

        Ok(())
    }

    /// Checks once that the device reports the given operation mode
    pub fn verify_mode(&mut self, mode: OperationMode) -> Result<(), CanError<D>> {
        let status = self.read_operation_status()?;

        if status.mode != Some(mode) {
            debug!("Requested mode {mode:?}, device reports mode bits {:#05b}", status.mode_bits);
            return Err(CanError::ModeVerificationFailure {
                requested: mode,
                actual: status.mode_bits,
            });
        }

        Ok(())
    }

    /// Requests the given mode and waits max. 2 ms for the device to reach it
    pub fn enter_mode(&mut self, mode: OperationMode, clock: &CLK) -> Result<(), CanError<D>> {
        self.set_mode(mode)?;
        self.await_mode(mode, clock)
    }

    /// Programs the given standard identifier filter and mask
    pub fn set_filter(&mut self, identifier: StandardId, mask: u16) -> Result<(), CanError<D>> {
        self.set_filter_object(&Filter::standard(identifier, mask))
    }

    /// Programs the given extended identifier filter and mask
    pub fn set_filter_extended(&mut self, identifier: ExtendedId, mask: u32) -> Result<(), CanError<D>> {
        self.set_filter_object(&Filter::extended(identifier, mask))
    }

    /// Enables the CLKOUT pin with the given prescaler and returns to normal mode
    pub fn enable_clock_output(&mut self, divisor: ClockOutputDivisor) -> Result<(), CanError<D>> {
        self.set_mode(OperationMode::Configuration)?;

        let mask = CanControl::new().with_clken(true).with_clkpre(0b11);
        let value = CanControl::new().with_clken(true).with_clkpre(divisor as u8);
        self.modify_register(REGISTER_CANCTRL, mask.into(), value.into())?;

        // CLKOUT carries the clock signal instead of SOF
        self.modify_register(REGISTER_CNF3, Cnf3::new().with_sof(true).into(), 0x00)?;

        self.set_mode(OperationMode::Normal)
    }

    /// Reads the CLKOUT configuration, None if the pin is disabled
    pub fn read_clock_output(&mut self) -> Result<Option<ClockOutputDivisor>, CanError<D>> {
        let control = CanControl::from(self.read_register(REGISTER_CANCTRL)?);

        if !control.clken() {
            return Ok(None);
        }

        Ok(Some(ClockOutputDivisor::from_register(control.clkpre())))
    }

    /// Reads and returns the operation status
    pub fn read_operation_status(&mut self) -> Result<OperationStatus, CanError<D>> {
        let data = self.read_register(REGISTER_CANSTAT)?;

        Ok(OperationStatus::from_register(data))
    }

    /// Drains all pending frames and hands each to `on_frame`.
    /// Returns the number of delivered frames. Nothing is written if no interrupt flag is set.
    pub fn handle_interrupt<F: FnMut(CanFrame)>(&mut self, mut on_frame: F) -> Result<usize, CanError<D>> {
        if self.read_register(REGISTER_CANINTF)? == 0 {
            return Ok(0);
        }

        let mut count = 0;
        while let Some(frame) = self.receive()? {
            on_frame(frame);
            count += 1;
        }

        Ok(count)
    }

    /// Frame returned by the last receive call, None if the last call found no pending frame
    pub fn last_received(&self) -> Option<&CanFrame> {
        self.last_received.as_ref()
    }

    /// Writes address and value of all registers, one `0xAA: 0xVV` line per register
    pub fn dump_registers<W: Write>(&mut self, out: &mut W) -> Result<(), CanError<D>> {
        for address in 0..REGISTER_COUNT {
            let value = self.read_register(address)?;
            writeln!(out, "0x{address:02X}: 0x{value:02X}").map_err(|_| CanError::Format)?;
        }

        Ok(())
    }

    /// Reset internal register to default and switch to Configuration mode
    pub fn reset<DL: DelayNs>(&mut self, delay: &mut DL) -> Result<(), CanError<D>> {
        self.device
            .write(&[Instruction::Reset as u8])
            .map_err(SpiError::BusError)?;

        delay.delay_us(RESET_DELAY_US);

        Ok(())
    }

    /// Returns the device on the SPI bus
    pub fn release(self) -> D {
        self.device
    }

    /// Polls the transmit buffer until TXREQ is cleared. Returns true if an abort was requested.
    /// ABAT is released on every exit once it was set, otherwise all later transmissions get aborted.
    fn await_transmission<S: Scheduler>(
        &mut self,
        control_reg: u8,
        clock: &CLK,
        scheduler: &mut S,
    ) -> Result<bool, CanError<D>> {
        let mut aborted = false;
        let result = self.poll_transmission(control_reg, clock, scheduler, &mut aborted);

        let released = match aborted {
            true => self.modify_register(REGISTER_CANCTRL, CanControl::new().with_abat(true).into(), 0x00),
            false => Ok(()),
        };

        result?;
        released?;

        Ok(aborted)
    }

    fn poll_transmission<S: Scheduler>(
        &mut self,
        control_reg: u8,
        clock: &CLK,
        scheduler: &mut S,
        aborted: &mut bool,
    ) -> Result<(), CanError<D>> {
        let deadline = clock
            .try_now()?
            .checked_add(self.transmit_timeout)
            .ok_or(CanError::ClockError)?;

        loop {
            let control = TxBufferControl::from(self.read_register(control_reg)?);

            if !control.txreq() {
                return Ok(());
            }

            // The device retransmits after bus errors, a pending frame with TXERR is aborted
            if control.txerr() && !*aborted {
                debug!("Transmission error on pending frame, requesting abort");
                self.request_abort()?;
                *aborted = true;
            }

            if clock.try_now()? > deadline {
                warn!("Transmission still pending after {:?}, aborting", self.transmit_timeout);

                if !*aborted {
                    self.request_abort()?;
                    *aborted = true;
                }

                self.await_abort(control_reg, clock, scheduler)?;
                return Err(CanError::TransmitTimeout);
            }

            scheduler.yield_now();
        }
    }

    /// Waits max. 2 ms for TXREQ to clear after ABAT was set
    fn await_abort<S: Scheduler>(
        &mut self,
        control_reg: u8,
        clock: &CLK,
        scheduler: &mut S,
    ) -> Result<(), CanError<D>> {
        let target = clock
            .try_now()?
            .checked_add(Milliseconds::new(ABORT_TIMEOUT_MS))
            .ok_or(CanError::ClockError)?;

        loop {
            if !TxBufferControl::from(self.read_register(control_reg)?).txreq() {
                return Ok(());
            }

            if clock.try_now()? > target {
                warn!("Transmit request still set {ABORT_TIMEOUT_MS} ms after abort");
                return Ok(());
            }

            scheduler.yield_now();
        }
    }

    /// Sets ABAT, the device aborts all pending transmissions
    fn request_abort(&mut self) -> Result<(), SpiError<D>> {
        let abort = CanControl::new().with_abat(true).into();

        self.modify_register(REGISTER_CANCTRL, abort, abort)
    }

    /// Waits max. 2 ms for the device to report the given mode
    fn await_mode(&mut self, mode: OperationMode, clock: &CLK) -> Result<(), CanError<D>> {
        let target = clock
            .try_now()?
            .checked_add(Milliseconds::new(MODE_TIMEOUT_MS))
            .ok_or(CanError::ClockError)?;

        loop {
            let status = self.read_operation_status()?;

            if status.mode == Some(mode) {
                return Ok(());
            }

            if clock.try_now()? > target {
                debug!("Device did not enter mode {mode:?} within timeout. Mode bits: {:#05b}", status.mode_bits);
                return Err(CanError::ModeVerificationFailure {
                    requested: mode,
                    actual: status.mode_bits,
                });
            }
        }
    }

    /// Writes identifier, DLC and payload registers of the transmit buffer
    fn load_tx_buffer(&mut self, control_reg: u8, image: &TxBufferImage) -> Result<(), CanError<D>> {
        self.write_identifier(control_reg + 1, image.identifier().as_bytes())?;
        self.write_register(control_reg + 5, image.data_length_code())?;

        for (i, byte) in image.payload().iter().enumerate() {
            self.write_register(control_reg + 6 + i as u8, *byte)?;
        }

        Ok(())
    }

    /// Reads and decodes the given receive buffer
    fn read_rx_buffer(&mut self, buffer_index: u8) -> Result<CanFrame, CanError<D>> {
        let base = Self::rx_buffer_register(buffer_index);

        let mut header = [0u8; 5];
        for (i, value) in header.iter_mut().enumerate() {
            *value = self.read_register(base + 1 + i as u8)?;
        }

        let mut image = RxBufferImage::from_header(&header);
        let length = image.payload_length();

        for (i, value) in image.data[..length].iter_mut().enumerate() {
            *value = self.read_register(base + 6 + i as u8)?;
        }

        Ok(image.decode())
    }

    /// Writes the four identifier registers starting at the given SIDH register
    fn write_identifier(&mut self, register: u8, values: &[u8; 4]) -> Result<(), SpiError<D>> {
        for (i, value) in values.iter().enumerate() {
            self.write_register(register + i as u8, *value)?;
        }

        Ok(())
    }

    /// Writes a single register byte
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), SpiError<D>> {
        let buffer = [Instruction::Write as u8, register, value];

        self.device.write(&buffer).map_err(SpiError::BusError)
    }

    /// Changes the register bits selected by `mask`, other bits are preserved by the device
    fn modify_register(&mut self, register: u8, mask: u8, value: u8) -> Result<(), SpiError<D>> {
        let buffer = [Instruction::BitModify as u8, register, mask, value];

        self.device.write(&buffer).map_err(SpiError::BusError)
    }

    /// Reads a single register byte
    fn read_register(&mut self, register: u8) -> Result<u8, SpiError<D>> {
        let mut buffer = [Instruction::Read as u8, register, 0x00];

        self.device.transfer_in_place(&mut buffer).map_err(SpiError::BusError)?;

        Ok(buffer[2])
    }

    /// Returns the control register address (TXBnCTRL) of the given transmit buffer
    fn tx_buffer_register(buffer_index: u8) -> u8 {
        0x30 + 0x10 * buffer_index
    }

    /// Returns the control register address (RXBnCTRL) of the given receive buffer
    fn rx_buffer_register(buffer_index: u8) -> u8 {
        0x60 + 0x10 * buffer_index
    }

    /// Returns the RXFnSIDH address of the given filter, filters 3-5 start after CANCTRL
    fn filter_register(filter_index: u8) -> u8 {
        if filter_index < 3 {
            4 * filter_index
        } else {
            0x10 + 4 * (filter_index - 3)
        }
    }

    /// Returns the RXMnSIDH address of the given mask
    fn mask_register(mask_index: u8) -> u8 {
        0x20 + 4 * mask_index
    }
}

/// SPI instruction bytes
#[derive(Copy, Clone)]
enum Instruction {
    Write = 0x02,
    Read = 0x03,
    BitModify = 0x05,
    Reset = 0xC0,
}

impl<D: SpiDevice> From<embedded_time::clock::Error> for CanError<D> {
    fn from(_error: embedded_time::clock::Error) -> Self {
        CanError::ClockError
    }
}
