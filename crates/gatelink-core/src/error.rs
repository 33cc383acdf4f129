use thiserror::Error;

/// Error taxonomy of the protocol engine.
///
/// Nothing here is fatal: a malformed or foreign frame is dropped, and every
/// bus-facing failure (`UnknownSubcode`, `InsufficientData`, `Unauthorized`)
/// is answered with a NAK while prior state stays intact.
#[derive(Error, Debug)]
pub enum Error {
    /// Frame shorter than the minimum or with wrong delimiters. Dropped
    /// silently, no bus response.
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    /// Function code outside the registered handler families. Produces a
    /// local failure only; no response is defined at the dispatch layer.
    #[error("unknown function code '{0}'")]
    UnknownFunction(char),

    /// Valid family, unrecognized subcode. Answered with NAK.
    #[error("unknown subcode {family}{subcode}")]
    UnknownSubcode { family: char, subcode: char },

    /// Payload shorter than the field width a set-command requires.
    /// Answered with NAK.
    #[error("insufficient data: expected {expected} bytes, got {got}")]
    InsufficientData { expected: usize, got: usize },

    /// Device-restricted command received by the wrong device id. Answered
    /// with NAK. This is an authorization gate, not a framing error.
    #[error("command not allowed for this device")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("hardware error: {0}")]
    Hardware(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
