#![no_std]
#![no_main]

pub mod clock;
pub mod mutex;

use crate::clock::SystemClock;
use embedded_can::{Frame, StandardId};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;
use embedded_hal_bus::spi::ExclusiveDevice;
use hal::clocks::Clock;
use hal::fugit::RateExtU32;
use hal::pac;
use mcp2515::can::{CanController, MCP2515};
use mcp2515::config::Configuration;
use mcp2515::frame::CanFrame;
use mcp2515::interrupt::{on_interrupt, InterruptPin};
use mcp2515::status::OperationMode;
use panic_halt as _;
use rp2040_hal as hal;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

const XTAL_FREQ_HZ: u32 = 12_000_000u32;

static CLOCK: SystemClock = SystemClock::default();

#[rp2040_hal::entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    CLOCK.initialize(timer);
    let mut delay = timer;

    let sio = hal::Sio::new(pac.SIO);

    let pins = hal::gpio::Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);

    let spi_mosi = pins.gpio7.into_function::<hal::gpio::FunctionSpi>();
    let spi_miso = pins.gpio4.into_function::<hal::gpio::FunctionSpi>();
    let spi_sclk = pins.gpio6.into_function::<hal::gpio::FunctionSpi>();
    let spi = hal::spi::Spi::<_, _, _, 8>::new(pac.SPI0, (spi_mosi, spi_miso, spi_sclk));

    // Exchange the uninitialised SPI driver for an initialised one
    let spi = spi.init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        10.MHz(),
        embedded_hal::spi::MODE_0,
    );

    // Configure GPIO5 as an CS pin
    let pin_cs = pins.gpio5.into_push_pull_output();
    let spi_dev = ExclusiveDevice::new_no_delay(spi, pin_cs).unwrap();

    // Onboard LED toggles on every received frame
    let mut led = pins.gpio25.into_push_pull_output();

    // INT line of the MCP2515 on GPIO8
    let mut int_pin = InterruptPin::new(pins.gpio8.into_pull_up_input());

    let mut controller: MCP2515<_, SystemClock> = MCP2515::new(spi_dev);

    // Common breakout boards carry an 8 MHz crystal
    controller
        .configure(
            &Configuration {
                clock_frequency: 8_000_000,
                bit_rate: 500_000,
                mode: OperationMode::Loopback,
                ..Configuration::default()
            },
            &CLOCK,
            &mut delay,
        )
        .unwrap();

    let frame = CanFrame::new(StandardId::new(0x55).unwrap(), &[0x01, 0x02, 0x03, 0x04]).unwrap();

    loop {
        controller.transmit(&frame, &CLOCK, &mut cortex_m::asm::nop).unwrap();

        if int_pin.is_asserted().unwrap() {
            on_interrupt(&mut controller, |_frame| {
                led.toggle().unwrap();
            })
            .unwrap();
        }

        delay.delay_ms(500);
    }
}
