//! # Dummy devices for doc examples
//!
//! [ExampleSPIDevice] emulates the register file of the MCP2515: read, write, bit modify and reset
//! instructions, immediate mode changes and internal loopback of transmit buffer 0.
use crate::message::{TxBufferImage, BUFFER_LENGTH};
use crate::registers::{CanControl, CanStatus, InterruptFlags, TxBufferControl};
use crate::status::OperationMode;
use core::cell::Cell;
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin};
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use embedded_time::clock::Error;
use embedded_time::duration::{Duration, Fraction};
use embedded_time::fixed_point::FixedPoint;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};

const REGISTER_CANSTAT: u8 = 0x0E;
const REGISTER_CANCTRL: u8 = 0x0F;
const REGISTER_CANINTF: u8 = 0x2C;
const REGISTER_TXB0CTRL: u8 = 0x30;
const REGISTER_RXB0SIDH: u8 = 0x61;
const RX_BUFFER_OFFSET: u8 = 0x10;

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSPIDevice {
    pub registers: [u8; 128],
}

impl Default for ExampleSPIDevice {
    fn default() -> Self {
        let mut device = Self { registers: [0u8; 128] };
        device.reset();
        device
    }
}

impl ExampleSPIDevice {
    /// Executes the instruction in `buffer`, read values are written to `buffer[2..]`
    pub fn execute(&mut self, buffer: &mut [u8]) {
        if buffer.len() >= 2 && buffer[0] == 0x03 {
            let address = buffer[1];

            for (i, value) in buffer[2..].iter_mut().enumerate() {
                *value = self.register(address.wrapping_add(i as u8));
            }
            return;
        }

        self.execute_command(buffer);
    }

    /// Executes a reset, write or bit modify instruction
    pub fn execute_command(&mut self, command: &[u8]) {
        match command {
            [0xC0, ..] => self.reset(),
            [0x02, address, values @ ..] => {
                for (i, value) in values.iter().enumerate() {
                    self.write_register(address.wrapping_add(i as u8), *value);
                }
            }
            [0x05, address, mask, value] => {
                let current = self.register(*address);
                self.write_register(*address, (current & !mask) | (value & mask));
            }
            _ => {}
        }
    }

    /// Current value of the given register
    pub fn register(&self, address: u8) -> u8 {
        self.registers[(address & 0x7F) as usize]
    }

    /// Register values after power-on or reset: configuration mode with CLKOUT enabled
    fn reset(&mut self) {
        self.registers = [0u8; 128];
        self.registers[REGISTER_CANSTAT as usize] = 0x80;
        self.registers[REGISTER_CANCTRL as usize] = 0x87;
    }

    fn write_register(&mut self, address: u8, value: u8) {
        let address = address & 0x7F;

        match address {
            // read only
            REGISTER_CANSTAT => {}
            REGISTER_CANCTRL => {
                self.registers[address as usize] = value;
                self.change_mode(CanControl::from(value));
            }
            REGISTER_TXB0CTRL => {
                let requested = TxBufferControl::from(value);
                let current = TxBufferControl::from(self.register(address));
                let mut control = current.with_txreq(requested.txreq()).with_txp(requested.txp());

                // Flags are cleared by a new transmit request
                if requested.txreq() {
                    control = control.with_abtf(false).with_mloa(false).with_txerr(false);
                }

                self.registers[address as usize] = control.into();

                if requested.txreq() {
                    self.transmit();
                }
            }
            _ => self.registers[address as usize] = value,
        }
    }

    fn operation_mode(&self) -> Option<OperationMode> {
        OperationMode::from_bits(CanStatus::from(self.register(REGISTER_CANSTAT)).opmod())
    }

    /// Requested modes are entered immediately, ABAT aborts the pending transmission
    fn change_mode(&mut self, control: CanControl) {
        let status = CanStatus::from(self.register(REGISTER_CANSTAT)).with_opmod(control.reqop());
        self.registers[REGISTER_CANSTAT as usize] = status.into();

        let tx_control = TxBufferControl::from(self.register(REGISTER_TXB0CTRL));
        if control.abat() && tx_control.txreq() {
            self.registers[REGISTER_TXB0CTRL as usize] = tx_control.with_txreq(false).with_abtf(true).into();
        }
    }

    /// Frames are acknowledged at once in normal mode and copied to a receive buffer in loopback mode.
    /// Other modes leave the request pending.
    fn transmit(&mut self) {
        match self.operation_mode() {
            Some(OperationMode::Normal) => {}
            Some(OperationMode::Loopback) => self.loopback(),
            _ => return,
        }

        let tx_control = TxBufferControl::from(self.register(REGISTER_TXB0CTRL));
        self.registers[REGISTER_TXB0CTRL as usize] = tx_control.with_txreq(false).into();

        let flags = InterruptFlags::from(self.register(REGISTER_CANINTF)).with_tx0if(true);
        self.registers[REGISTER_CANINTF as usize] = flags.into();
    }

    fn loopback(&mut self) {
        let start = (REGISTER_TXB0CTRL + 1) as usize;
        let mut buffer = [0u8; BUFFER_LENGTH];
        buffer.copy_from_slice(&self.registers[start..start + BUFFER_LENGTH]);

        let received = TxBufferImage::from_bytes(&buffer).loopback().to_bytes();
        let mut flags = InterruptFlags::from(self.register(REGISTER_CANINTF));

        // Overflow if both buffers are full
        let buffer_index = if !flags.rx0if() {
            flags.set_rx0if(true);
            0
        } else if !flags.rx1if() {
            flags.set_rx1if(true);
            1
        } else {
            return;
        };

        let start = (REGISTER_RXB0SIDH + RX_BUFFER_OFFSET * buffer_index) as usize;
        self.registers[start..start + BUFFER_LENGTH].copy_from_slice(&received);
        self.registers[REGISTER_CANINTF as usize] = flags.into();
    }
}

impl ErrorType for ExampleSPIDevice {
    type Error = Infallible;
}

impl SpiDevice<u8> for ExampleSPIDevice {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(command) => self.execute_command(command),
                Operation::TransferInPlace(buffer) => self.execute(buffer),
                _ => {}
            }
        }

        Ok(())
    }
}

/// Clock advancing 10 us on every access
#[derive(Debug, Default)]
pub struct ExampleClock {
    ticks: Cell<u64>,
}

impl Clock for ExampleClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        let now = self.ticks.get();
        self.ticks.set(now + 10);

        Ok(Instant::new(now))
    }

    fn new_timer<Dur: Duration + FixedPoint>(&self, duration: Dur) -> Timer<OneShot, Armed, Self, Dur> {
        Timer::new(self, duration)
    }
}

/// Delay which only sums up the requested time
#[derive(Debug, Default)]
pub struct ExampleDelay {
    pub elapsed_ns: u64,
}

impl DelayNs for ExampleDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// INT line with a fixed level
#[derive(Debug, Default)]
pub struct ExampleInterruptPin {
    pub asserted: bool,
}

impl PinErrorType for ExampleInterruptPin {
    type Error = Infallible;
}

impl InputPin for ExampleInterruptPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.asserted)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.asserted)
    }
}
