use crate::can::Scheduler;
use crate::example::ExampleSPIDevice;
use core::cell::RefCell;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind as PinErrorKind, ErrorType as PinErrorType, InputPin};
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use embedded_time::clock::Error;
use embedded_time::duration::Duration;
use embedded_time::fixed_point::FixedPoint;
use embedded_time::fraction::Fraction;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};
use mockall::mock;

#[derive(Debug, PartialEq, Eq)]
pub struct TestClock {
    pub next_instants: RefCell<Vec<u64>>,
}

impl TestClock {
    pub fn new(next_instants: Vec<u64>) -> Self {
        Self {
            next_instants: RefCell::new(next_instants),
        }
    }
}

impl Clock for TestClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        if self.next_instants.borrow().len() == 0 {
            return Err(Error::Unspecified);
        }

        Ok(Instant::new(self.next_instants.borrow_mut().remove(0)))
    }

    fn new_timer<Dur>(&self, duration: Dur) -> Timer<OneShot, Armed, Self, Dur>
    where
        Dur: Duration + FixedPoint,
    {
        Timer::new(self, duration)
    }
}

/// SPI device logging every instruction on top of the register emulation.
/// Register reads can be scripted to simulate status changes of the device.
#[derive(Debug, Default, PartialEq)]
pub struct TestChip {
    pub chip: ExampleSPIDevice,
    /// Instruction bytes of every transaction in order
    pub commands: Vec<Vec<u8>>,
    /// Values returned by the next reads of a register, before falling back to the emulation
    scripted_reads: Vec<(u8, Vec<u8>)>,
    /// Fails all transactions if set
    pub fail: bool,
}

impl TestChip {
    pub fn script_reads(&mut self, register: u8, values: &[u8]) {
        self.scripted_reads.push((register, values.to_vec()));
    }

    /// Write, bit modify and reset instructions in order
    pub fn write_commands(&self) -> Vec<Vec<u8>> {
        self.commands
            .iter()
            .filter(|command| matches!(command.first(), Some(0x02) | Some(0x05) | Some(0xC0)))
            .cloned()
            .collect()
    }

    /// Registers addressed by read instructions in order
    pub fn read_registers(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter(|command| command.first() == Some(&0x03))
            .map(|command| command[1])
            .collect()
    }

    fn scripted_read(&mut self, register: u8) -> Option<u8> {
        let (_, values) = self
            .scripted_reads
            .iter_mut()
            .find(|(address, values)| *address == register && !values.is_empty())?;

        Some(values.remove(0))
    }
}

impl ErrorType for TestChip {
    type Error = ErrorKind;
}

impl SpiDevice<u8> for TestChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::Other);
        }

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(command) => {
                    self.commands.push(command.to_vec());
                    self.chip.execute_command(command);
                }
                Operation::TransferInPlace(buffer) => {
                    self.commands.push(buffer.to_vec());

                    let scripted = match buffer[..] {
                        [0x03, register, _] => self.scripted_read(register),
                        _ => None,
                    };

                    match scripted {
                        Some(value) => buffer[2] = value,
                        None => self.chip.execute(buffer),
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

mock! {
    pub HostScheduler {}

    impl Scheduler for HostScheduler {
        fn yield_now(&mut self);
    }
}

mock! {
    pub Delay {}

    impl DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32);
    }
}

mock! {
    pub Pin {}

    impl PinErrorType for Pin {
        type Error = PinErrorKind;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, PinErrorKind>;
        fn is_low(&mut self) -> Result<bool, PinErrorKind>;
    }
}
