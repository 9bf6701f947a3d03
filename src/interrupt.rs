//!# Interrupt routing
//! The MCP2515 holds its INT pin low as long as any enabled interrupt flag is set.
//! Edge detection and ISR registration stay with the host. The ISR passes the controller it owns
//! to [on_interrupt], which drains all received frames before returning, as a level triggered line
//! does not signal again for frames already queued.
//!
//! ```
//!# use mcp2515::can::MCP2515;
//!# use mcp2515::example::*;
//!# use mcp2515::interrupt::{on_interrupt, InterruptPin};
//!#
//! let mut controller: MCP2515<_, ExampleClock> = MCP2515::new(ExampleSPIDevice::default());
//! let mut int_pin = InterruptPin::new(ExampleInterruptPin::default());
//!
//! if int_pin.is_asserted().unwrap() {
//!     on_interrupt(&mut controller, |_frame| {
//!         // dispatch frame
//!     })
//!     .unwrap();
//! }
//!
//! // Detach on teardown
//! let _pin = int_pin.release();
//! ```

use crate::can::{CanError, MCP2515};
use crate::frame::CanFrame;
use embedded_hal::digital::InputPin;
use embedded_hal::spi::SpiDevice;
use embedded_time::Clock;

/// Active low INT line of the MCP2515
pub struct InterruptPin<P: InputPin> {
    pin: P,
}

impl<P: InputPin> InterruptPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// True while the device pulls the line low
    pub fn is_asserted(&mut self) -> Result<bool, P::Error> {
        self.pin.is_low()
    }

    /// Returns the pin
    pub fn release(self) -> P {
        self.pin
    }
}

/// Drains all pending frames of the given controller, handing each to `on_frame`.
/// Returns the number of delivered frames.
pub fn on_interrupt<D, CLK, F>(controller: &mut MCP2515<D, CLK>, on_frame: F) -> Result<usize, CanError<D>>
where
    D: SpiDevice<u8>,
    CLK: Clock,
    F: FnMut(CanFrame),
{
    controller.handle_interrupt(on_frame)
}
