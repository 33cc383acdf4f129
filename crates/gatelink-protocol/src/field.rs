//! Payload field decoding helpers.
//!
//! The protocol carries numeric fields as two ASCII characters, but with two
//! deliberately different conventions depending on the field:
//!
//! - **hex pair**: `(hex(d0) << 4) | hex(d1)` — device ids, operating modes,
//!   serial-number bytes. `"FF"` decodes to 255.
//! - **decimal pair**: `10 * hex(d0) + hex(d1)` — timer seconds and detector
//!   times. `"45"` decodes to 45.
//!
//! Which convention applies is fixed per command and must not be unified;
//! masters in the field depend on both. Invalid digit characters decode as
//! zero rather than failing, matching the deployed firmware.

use gatelink_core::{Error, Result};

/// Value of a single ASCII hex digit; non-digits decode as 0.
#[must_use]
pub fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'A'..=b'F' => b - b'A' + 10,
        b'a'..=b'f' => b - b'a' + 10,
        _ => 0,
    }
}

/// ASCII hex digit (uppercase) for a nibble value. Values above 15 follow
/// the same `'A' + (v - 10)` progression the deployed firmware uses.
#[must_use]
pub fn hex_char(v: u8) -> u8 {
    if v < 10 { b'0' + v } else { b'A' + (v - 10) }
}

/// Fail with [`Error::InsufficientData`] when the payload is shorter than a
/// set-command's field width.
pub fn require(payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() < expected {
        return Err(Error::InsufficientData {
            expected,
            got: payload.len(),
        });
    }
    Ok(())
}

/// Decode a two-character ASCII-hex field: `(hex(d0) << 4) | hex(d1)`.
pub fn decode_hex_pair(payload: &[u8]) -> Result<u8> {
    require(payload, 2)?;
    Ok((hex_val(payload[0]) << 4) | hex_val(payload[1]))
}

/// Decode a two-character ASCII-decimal field: `10 * hex(d0) + hex(d1)`.
pub fn decode_decimal_pair(payload: &[u8]) -> Result<u8> {
    require(payload, 2)?;
    Ok(10 * hex_val(payload[0]) + hex_val(payload[1]))
}

/// Take at most `width` bytes of a text field as an owned string.
///
/// The wire carries raw bytes; anything that is not valid UTF-8 is replaced
/// rather than rejected, since text fields are display-only.
#[must_use]
pub fn take_text(payload: &[u8], width: usize) -> String {
    let end = payload.len().min(width);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
