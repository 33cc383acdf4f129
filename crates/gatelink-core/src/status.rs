//! Live status register of the device.
//!
//! A 16-bit bitmask of device conditions plus its four-digit uppercase hex
//! wire mirror. The mirror is re-derived synchronously on every bit
//! mutation, so it can be copied into a status response at any time without
//! further formatting. No other component mutates the register directly;
//! everything goes through [`StatusInfo::set_bit`] / [`StatusInfo::clear_bit`].

use serde::{Deserialize, Serialize};

/// Status register, hex mirror, last scanned token and transient reader
/// flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    status: u16,
    status_hex: String,
    token: Option<String>,
    /// A credential was read and not yet consumed by a reader reset.
    pub card_read: bool,
    /// A paper-pulse edge was detected.
    pub pulse_detected: bool,
    /// The scanner is armed and accepting reads.
    pub scanner_active: bool,
}

impl StatusInfo {
    pub fn new() -> Self {
        StatusInfo {
            status: 0,
            status_hex: "0000".to_string(),
            token: None,
            card_read: false,
            pulse_detected: false,
            scanner_active: false,
        }
    }

    /// Raw 16-bit register value.
    #[must_use]
    pub fn register(&self) -> u16 {
        self.status
    }

    /// Four-digit uppercase hex mirror of the register.
    #[must_use]
    pub fn hex(&self) -> &str {
        &self.status_hex
    }

    /// Set the given bit(s) and re-derive the hex mirror.
    pub fn set_bit(&mut self, bit: u16) {
        self.status |= bit;
        self.sync_hex();
    }

    /// Clear the given bit(s) and re-derive the hex mirror.
    pub fn clear_bit(&mut self, bit: u16) {
        self.status &= !bit;
        self.sync_hex();
    }

    /// Whether any of the given bit(s) is set.
    #[must_use]
    pub fn is_bit_set(&self, bit: u16) -> bool {
        self.status & bit != 0
    }

    /// Last scanned credential or code, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn sync_hex(&mut self) {
        self.status_hex = format!("{:04X}", self.status);
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        StatusInfo::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use rstest::rstest;

    #[test]
    fn starts_clear() {
        let status = StatusInfo::new();
        assert_eq!(status.register(), 0);
        assert_eq!(status.hex(), "0000");
        assert!(status.token().is_none());
    }

    #[rstest]
    #[case(STATUS_DETECTOR_1, "0001")]
    #[case(STATUS_RELAY_1, "0040")]
    #[case(STATUS_CARD_READ, "0100")]
    #[case(STATUS_SCANNER, "0800")]
    #[case(STATUS_EXIT_DIRECTION, "8000")]
    fn hex_mirror_tracks_set_bit(#[case] bit: u16, #[case] expected: &str) {
        let mut status = StatusInfo::new();
        assert!(!status.is_bit_set(bit));
        status.set_bit(bit);
        assert!(status.is_bit_set(bit));
        assert_eq!(status.hex(), expected);
    }

    #[test]
    fn clear_bit_restores_mirror() {
        let mut status = StatusInfo::new();
        status.set_bit(STATUS_RELAY_1 | STATUS_RELAY_2);
        assert_eq!(status.hex(), "00C0");
        status.clear_bit(STATUS_RELAY_1);
        assert!(!status.is_bit_set(STATUS_RELAY_1));
        assert!(status.is_bit_set(STATUS_RELAY_2));
        assert_eq!(status.hex(), "0080");
    }

    #[test]
    fn mirror_always_matches_register() {
        let mut status = StatusInfo::new();
        for bit in [
            STATUS_DETECTOR_1,
            STATUS_DETECTOR_2,
            STATUS_FRAUD,
            STATUS_PAPER_PULSE,
            STATUS_EXIT_DIRECTION,
        ] {
            status.set_bit(bit);
            assert_eq!(status.hex(), format!("{:04X}", status.register()));
            status.clear_bit(bit);
            assert_eq!(status.hex(), format!("{:04X}", status.register()));
        }
    }

    #[test]
    fn token_lifecycle() {
        let mut status = StatusInfo::new();
        status.set_token("04ABCDEF");
        assert_eq!(status.token(), Some("04ABCDEF"));
        status.clear_token();
        assert!(status.token().is_none());
    }
}
