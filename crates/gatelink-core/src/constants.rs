//! Protocol-level constants for the gate controller.
//!
//! These values define the wire protocol spoken on the half-duplex RS-485
//! bus and the fixed sizes of the controller's data model. They are shared
//! by every crate in the workspace; changing them breaks compatibility with
//! deployed gate hardware.
//!
//! # Frame Grammar
//!
//! ```text
//! Command:       STX addrHi addrLo FUNC SUB [payload] ETX
//! Data response: STX addrHi addrLo FUNC SUB [payload] SIB
//! ACK / NAK:     STX addrHi addrLo (ACK|NAK) ETX
//! ```
//!
//! The address is always the device's two-character id string. ACK and NAK
//! frames are exactly [`ACK_NAK_FRAME_LENGTH`] bytes and carry no payload.

// ============================================================================
// Framing bytes
// ============================================================================

/// Start of text marker (STX, 0x02). Every frame begins with this byte.
pub const START_BYTE: u8 = 0x02;

/// End of text marker (ETX, 0x03). Terminates command and ACK/NAK frames.
pub const END_BYTE: u8 = 0x03;

/// Positive acknowledgement (ACK, 0x06), sent as the function byte of an
/// acknowledgement frame.
pub const ACK_BYTE: u8 = 0x06;

/// Negative acknowledgement (NAK, 0x15), sent as the function byte of a
/// rejection frame.
pub const NAK_BYTE: u8 = 0x15;

/// Terminator for data and status responses (0x1B). Responses end with this
/// byte instead of [`END_BYTE`] so a master can distinguish them from
/// commands echoed on the shared bus.
pub const TERMINATOR_BYTE: u8 = 0x1B;

// ============================================================================
// Frame geometry
// ============================================================================

/// Smallest valid frame: STX + 2 address chars + function + subcode + ETX.
pub const MIN_FRAME_LENGTH: usize = 6;

/// Receive-buffer capacity. A frame that grows past this without closing is
/// subject to the receiver's overflow policy.
pub const MAX_FRAME_LENGTH: usize = 64;

/// Length of an ACK or NAK frame (STX + address + ACK/NAK + ETX).
pub const ACK_NAK_FRAME_LENGTH: usize = 5;

/// Device address width on the wire (two ASCII characters).
pub const DEVICE_ID_LENGTH: usize = 2;

// ============================================================================
// Device identity and modes
// ============================================================================

/// Highest device id considered valid by the configuration loader.
/// Out-of-range stored ids are defaulted to 0 at load time.
pub const MAX_DEVICE_ID: u8 = 99;

/// The only device id allowed to write factory serial-number bytes.
pub const SERIAL_WRITE_DEVICE_ID: u8 = 2;

/// Number of factory serial-number bytes.
pub const SERIAL_NUMBER_LENGTH: usize = 5;

/// Highest valid value for any operating-mode selector. Stored modes above
/// this default to 0 at load time.
pub const MAX_MODE: u8 = 9;

/// Work mode that marks the device as an exit gate; every other work mode
/// means entry gate.
pub const EXIT_GATE_WORK_MODE: u8 = 4;

/// Maximum stored company-name length in bytes (NUL-terminated in the store).
pub const COMPANY_NAME_LENGTH: usize = 16;

/// Company name substituted when the stored one is empty or erased.
pub const DEFAULT_COMPANY_NAME: &str = "OemAccess";

/// Firmware identification string reported by the version query.
pub const FIRMWARE_VERSION: &str = "OemProxy v1.0";

// ============================================================================
// Relays and timing
// ============================================================================

/// Number of physical relay actuators.
pub const RELAY_COUNT: usize = 5;

/// Relay-timer seconds substituted when the stored value is 0 or >= 100.
pub const DEFAULT_RELAY_SECONDS: u8 = 5;

/// Scheduling period of the relay state machine in milliseconds.
pub const TICK_MILLIS: u64 = 100;

/// Ticks per second of configured relay duration.
pub const TICKS_PER_SECOND: u16 = 10;

// ============================================================================
// Tickets
// ============================================================================

/// Number of configurable ticket text lines.
pub const TICKET_LINE_COUNT: usize = 4;

/// Fixed width of a ticket text line in bytes.
pub const TICKET_LINE_LENGTH: usize = 16;

/// Largest representable ticket counter: 255 stored "thousands" plus a
/// three-digit decimal remainder.
pub const MAX_TICKET_COUNTER: u32 = 255 * 1000 + 999;

// ============================================================================
// Status register bits
// ============================================================================

/// Metal-mass detector 1 triggered.
pub const STATUS_DETECTOR_1: u16 = 0x0001;

/// Metal-mass detector 2 triggered.
pub const STATUS_DETECTOR_2: u16 = 0x0002;

/// Relay 1 energized. Mirrors the relay controller; relays 3-5 have no
/// status-bit mirror.
pub const STATUS_RELAY_1: u16 = 0x0040;

/// Relay 2 energized.
pub const STATUS_RELAY_2: u16 = 0x0080;

/// A credential was read since the last reader reset.
pub const STATUS_CARD_READ: u16 = 0x0100;

/// Fraud condition detected.
pub const STATUS_FRAUD: u16 = 0x0200;

/// Paper push-button pulse.
pub const STATUS_PAPER_PULSE: u16 = 0x0400;

/// Scanner currently active.
pub const STATUS_SCANNER: u16 = 0x0800;

/// Set when the gate operates in the exit direction.
pub const STATUS_EXIT_DIRECTION: u16 = 0x8000;
