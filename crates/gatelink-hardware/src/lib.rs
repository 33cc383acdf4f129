//! Hardware abstraction for the gate controller.
//!
//! The protocol engine never touches pins or serial registers directly; it
//! drives two small capabilities defined here:
//!
//! - [`DigitalOutput`]: one open-collector output per relay coil,
//! - [`BusTransceiver`]: the half-duplex RS-485 side with explicit
//!   transmit/receive direction control.
//!
//! Mock implementations record every interaction so the relay state machine
//! and the bus turnaround contract can be unit-tested without hardware. The
//! `serial` feature adds a real transceiver backed by the `serialport`
//! crate, using RTS as the DE/RE direction pin.

pub mod error;
pub mod mock;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{HardwareError, Result};
pub use mock::{BusEvent, MockBus, MockOutputs};
pub use traits::{BusTransceiver, DigitalOutput, PinLevel};
