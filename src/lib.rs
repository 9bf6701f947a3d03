#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(dead_code)]
#![allow(clippy::identity_op)]

//! # Library for MCP2515 CAN controller
//!
//! Crate currently offer the following features:
//! * CAN2.0 standard and extended ID formats, data and remote frames
//! * Bit timing lookup for 8 MHz and 16 MHz oscillators (5 kbit/s to 1 Mbit/s)
//! * Acceptance filters and masks
//! * Interrupt driven reception without global state
//! * no_std support
//!
//!## CAN Tx/Rx example
//!
//!```
//!use mcp2515::example::{ExampleClock, ExampleDelay, ExampleSPIDevice};
//!use mcp2515::can::{CanController, MCP2515};
//!use mcp2515::config::Configuration;
//!use mcp2515::frame::CanFrame;
//!use mcp2515::status::OperationMode;
//!use embedded_can::{Frame, Id, StandardId};
//!
//!let spi_dev = ExampleSPIDevice::default();
//!let clock = ExampleClock::default();
//!let mut delay = ExampleDelay::default();
//!
//!let mut controller = MCP2515::new(spi_dev);
//! // configure CAN controller
//!controller
//!    .configure(
//!        &Configuration {
//!            clock_frequency: 8_000_000,
//!            bit_rate: 125_000,
//!            mode: OperationMode::Loopback,
//!            ..Configuration::default()
//!        },
//!        &clock,
//!        &mut delay,
//!    )
//!    .unwrap();
//!
//! // Only accept frames with ID 0x55
//!let can_id = StandardId::new(0x55).unwrap();
//!controller.set_filter(can_id, 0x7FF).unwrap();
//!controller.set_mode(OperationMode::Loopback).unwrap();
//!
//! // Create message frame
//!let payload = [1, 2, 3, 4, 5, 6, 7, 8];
//!let frame = CanFrame::new(Id::Standard(can_id), &payload).unwrap();
//!
//!// Transmit CAN message
//!controller.transmit(&frame, &clock, &mut || {}).unwrap();
//!
//!// Receive CAN message
//!let received = controller.receive().unwrap().unwrap();
//!assert_eq!(received.data(), &payload);
//!```

pub mod can;
pub mod config;
pub mod status;

pub mod filter;
pub mod frame;
pub mod interrupt;
pub mod message;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
mod registers;
#[cfg(test)]
mod tests;
