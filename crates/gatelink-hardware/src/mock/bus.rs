//! Recording half-duplex bus.

use crate::error::{HardwareError, Result};
use crate::traits::BusTransceiver;

/// One observable interaction with the transceiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Transmit,
    Write(Vec<u8>),
    Flush,
    Receive,
}

/// Mock transceiver that records the event transcript and the frames sent.
///
/// Enforces the turnaround contract: writing while in receive mode fails
/// with [`HardwareError::WrongDirection`], so a controller that skips
/// `set_transmit` is caught by tests immediately.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    events: Vec<BusEvent>,
    transmitting: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full event transcript, in order.
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// All byte sequences written, in order.
    pub fn writes(&self) -> Vec<&[u8]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Whether nothing was ever transmitted.
    pub fn is_silent(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl BusTransceiver for MockBus {
    fn set_transmit(&mut self) -> Result<()> {
        self.transmitting = true;
        self.events.push(BusEvent::Transmit);
        Ok(())
    }

    fn set_receive(&mut self) -> Result<()> {
        self.transmitting = false;
        self.events.push(BusEvent::Receive);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.transmitting {
            return Err(HardwareError::WrongDirection);
        }
        self.events.push(BusEvent::Write(bytes.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.events.push(BusEvent::Flush);
        Ok(())
    }
}
