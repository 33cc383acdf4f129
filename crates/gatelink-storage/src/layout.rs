//! Field layout of the non-volatile address space.
//!
//! The store is a flat byte array; each logical field owns a fixed range.
//! These addresses are part of the device's upgrade contract: firmware
//! revisions must read old cells where they are.
//!
//! | field | address | width |
//! |---|---|---|
//! | device id | 0 | 1 |
//! | company name | 10 | 16, NUL-terminated |
//! | tcp / work / display / qr / clock / sensor mode | 30-35 | 1 each |
//! | serial-number bytes | 40-44 | 1 each |
//! | relay timers | 50-54 | 1 per relay |
//! | detector timings | 60-63 | 1 each |
//! | ticket lines 1-4 | 70 / 86 / 102 / 118 | 16 each |
//! | ticket thousands | 134 | 1 |
//! | ticket remainder | 135-137 | 3 ASCII decimal digits |

use gatelink_core::types::OperatingMode;

pub const ADDR_DEVICE_ID: usize = 0;
pub const ADDR_COMPANY_NAME: usize = 10;
pub const ADDR_TCP_MODE: usize = 30;
pub const ADDR_WORK_MODE: usize = 31;
pub const ADDR_DISPLAY_MODE: usize = 32;
pub const ADDR_QR_MODE: usize = 33;
pub const ADDR_CLOCK_MODE: usize = 34;
pub const ADDR_SENSOR_MODE: usize = 35;
pub const ADDR_SERIAL_NUMBER: usize = 40;
pub const ADDR_RELAY_TIMER: usize = 50;
pub const ADDR_DETECTOR_1_PRESENT: usize = 60;
pub const ADDR_DETECTOR_1_ABSENT: usize = 61;
pub const ADDR_DETECTOR_2_PRESENT: usize = 62;
pub const ADDR_DETECTOR_2_ABSENT: usize = 63;
pub const ADDR_TICKET_LINE_1: usize = 70;
pub const ADDR_TICKET_THOUSANDS: usize = 134;
pub const ADDR_TICKET_REMAINDER: usize = 135;

/// Minimum store capacity required by this layout.
pub const REQUIRED_CAPACITY: usize = ADDR_TICKET_REMAINDER + 3;

/// Cell address of an operating-mode selector.
#[must_use]
pub fn mode_address(key: OperatingMode) -> usize {
    match key {
        OperatingMode::Tcp => ADDR_TCP_MODE,
        OperatingMode::Work => ADDR_WORK_MODE,
        OperatingMode::Display => ADDR_DISPLAY_MODE,
        OperatingMode::Qr => ADDR_QR_MODE,
        OperatingMode::Clock => ADDR_CLOCK_MODE,
        OperatingMode::HeightSensor => ADDR_SENSOR_MODE,
    }
}

/// Base address of the 16-byte slot for a 1-based ticket line number.
#[must_use]
pub fn ticket_line_address(line: usize) -> usize {
    ADDR_TICKET_LINE_1 + (line - 1) * gatelink_core::constants::TICKET_LINE_LENGTH
}
