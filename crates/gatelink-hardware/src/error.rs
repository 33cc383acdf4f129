use thiserror::Error;

/// Hardware-layer error types.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// Output channel outside the wired range.
    #[error("no output channel {0}")]
    UnknownChannel(usize),

    /// The transceiver rejected a direction change.
    #[error("direction control failed: {0}")]
    DirectionControl(String),

    /// Writing to the bus failed or did not drain.
    #[error("bus write failed: {0}")]
    BusWrite(String),

    /// Bytes were written while the transceiver was in receive mode.
    /// Violating the half-duplex turnaround corrupts the bus for every
    /// other addressee.
    #[error("write attempted in receive mode")]
    WrongDirection,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HardwareError>;
