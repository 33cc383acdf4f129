//! Capability traits consumed by the protocol engine.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Electrical level of a digital output pin.
///
/// The relay drivers on the reference hardware are active-low: driving the
/// pin [`Low`](PinLevel::Low) energizes the coil. That mapping belongs to
/// the relay controller; implementations of [`DigitalOutput`] report and
/// apply raw levels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinLevel {
    Low,
    High,
}

/// A bank of digital outputs, one per relay coil.
///
/// Channels are 0-based hardware indices. Implementations must apply the
/// level before returning; the relay state machine relies on the pin
/// reflecting the commanded level at the end of every tick.
pub trait DigitalOutput {
    fn write(&mut self, channel: usize, level: PinLevel) -> Result<()>;
}

/// Half-duplex bus side with explicit direction control.
///
/// The turnaround ordering is a hard contract: a reply must not be written
/// until transmit mode is asserted, and receive mode must not be restored
/// until the outbound bytes have fully drained. The controller always calls
/// `set_transmit`, `write_all`, `flush`, `set_receive`, in that order.
pub trait BusTransceiver {
    fn set_transmit(&mut self) -> Result<()>;
    fn set_receive(&mut self) -> Result<()>;
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
    /// Block until previously written bytes have left the transceiver.
    fn flush(&mut self) -> Result<()>;
}
