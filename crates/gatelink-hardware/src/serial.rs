//! RS-485 transceiver over a serial port.
//!
//! Uses the port's RTS line as the DE/RE direction control, the usual wiring
//! for cheap MAX485-style transceivers on USB adapters. Only available with
//! the `serial` feature.

use crate::error::{HardwareError, Result};
use crate::traits::BusTransceiver;
use serialport::SerialPort;
use std::time::Duration;
use tracing::{debug, trace};

/// Settling time after toggling the direction line.
const DIRECTION_SETTLE: Duration = Duration::from_millis(1);

/// Half-duplex RS-485 bus on a serial port with RTS direction control.
pub struct SerialBus {
    port: Box<dyn SerialPort>,
}

impl SerialBus {
    /// Open a port at the given baud rate and leave it in receive mode.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| HardwareError::BusWrite(format!("open {path}: {e}")))?;
        debug!(path, baud_rate, "serial bus opened");

        let mut bus = SerialBus { port };
        bus.set_receive()?;
        Ok(bus)
    }

    /// Wrap an already configured port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        SerialBus { port }
    }

    /// Read whatever bytes are currently available, up to `buf.len()`.
    ///
    /// Returns 0 on a read timeout so the caller's poll loop keeps turning.
    pub fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        use std::io::Read;
        match self.port.read(buf) {
            Ok(n) => {
                trace!(bytes = n, "bus read");
                Ok(n)
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(HardwareError::Io(e)),
        }
    }
}

impl BusTransceiver for SerialBus {
    fn set_transmit(&mut self) -> Result<()> {
        self.port
            .write_request_to_send(true)
            .map_err(|e| HardwareError::DirectionControl(e.to_string()))?;
        std::thread::sleep(DIRECTION_SETTLE);
        trace!("bus direction: transmit");
        Ok(())
    }

    fn set_receive(&mut self) -> Result<()> {
        self.port
            .write_request_to_send(false)
            .map_err(|e| HardwareError::DirectionControl(e.to_string()))?;
        trace!("bus direction: receive");
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        use std::io::Write;
        self.port
            .write_all(bytes)
            .map_err(|e| HardwareError::BusWrite(e.to_string()))
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        self.port
            .flush()
            .map_err(|e| HardwareError::BusWrite(e.to_string()))?;
        // Let the UART shifter drain before the caller flips direction.
        std::thread::sleep(DIRECTION_SETTLE);
        Ok(())
    }
}
