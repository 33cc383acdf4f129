//! Byte-level frame model for the gate protocol.
//!
//! A [`Frame`] owns the raw bytes of one delimited protocol message,
//! including its framing bytes. Parsing splits a frame into address,
//! function code, subcode and payload without interpreting any of them;
//! routing and field decoding happen in the dispatcher.
//!
//! # Wire Format
//!
//! ```text
//! Command:       0x02 addrHi addrLo FUNC SUB [payload] 0x03
//! Data response: 0x02 addrHi addrLo FUNC SUB [payload] 0x1B
//! ACK / NAK:     0x02 addrHi addrLo (0x06|0x15) 0x03
//! ```
//!
//! The parser accepts either closing delimiter so that frames built by
//! [`ReplyBuilder`](crate::response::ReplyBuilder) can be parsed back in
//! tests and by monitoring tools; the byte-stream receiver itself only
//! completes a frame on the command terminator `0x03`.

use bytes::Bytes;
use gatelink_core::constants::{END_BYTE, MIN_FRAME_LENGTH, START_BYTE, TERMINATOR_BYTE};
use gatelink_core::{Error, Result};
use std::fmt;

/// One complete protocol message in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Bytes,
}

impl Frame {
    /// Create a frame from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Frame {
            data: Bytes::copy_from_slice(bytes),
        }
    }

    /// Create a frame from an owned byte vector without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Frame {
            data: Bytes::from(bytes),
        }
    }

    /// Raw bytes of the frame including delimiters.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Split the frame into address, function, subcode and payload.
    ///
    /// # Errors
    /// Returns [`Error::MalformedFrame`] if the frame is shorter than the
    /// minimum or its delimiters are wrong. A malformed frame carries no
    /// trustworthy address, so the caller must drop it without replying.
    pub fn parse(&self) -> Result<ParsedCommand> {
        let data = &self.data;
        if data.len() < MIN_FRAME_LENGTH {
            return Err(Error::MalformedFrame {
                reason: format!("frame too short ({} bytes)", data.len()),
            });
        }
        if data[0] != START_BYTE {
            return Err(Error::MalformedFrame {
                reason: format!("expected STX, got 0x{:02X}", data[0]),
            });
        }
        let last = data[data.len() - 1];
        if last != END_BYTE && last != TERMINATOR_BYTE {
            return Err(Error::MalformedFrame {
                reason: format!("expected ETX or terminator, got 0x{last:02X}"),
            });
        }

        Ok(ParsedCommand {
            address: [data[1], data[2]],
            function: data[3],
            subcode: data[4],
            payload: self.data.slice(5..data.len() - 1),
        })
    }
}

impl fmt::Display for Frame {
    /// Frames mix printable ASCII with control bytes; escape the latter so
    /// log lines stay single-line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.data.iter() {
            if (0x20..0x7F).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02X}")?;
            }
        }
        Ok(())
    }
}

/// A command frame split into its addressing and routing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Two wire address characters, exactly as received.
    pub address: [u8; 2],
    /// Function family letter.
    pub function: u8,
    /// Operation within the family.
    pub subcode: u8,
    /// Remaining bytes between subcode and closing delimiter.
    pub payload: Bytes,
}

impl ParsedCommand {
    /// Whether this frame is addressed to the device with the given wire
    /// address string.
    #[must_use]
    pub fn is_addressed_to(&self, device_id_str: &str) -> bool {
        device_id_str.as_bytes() == self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_command_frame() {
        let frame = Frame::from_bytes(b"\x0200A1\x03");
        let cmd = frame.parse().unwrap();
        assert_eq!(cmd.address, *b"00");
        assert_eq!(cmd.function, b'A');
        assert_eq!(cmd.subcode, b'1');
        assert!(cmd.payload.is_empty());
    }

    #[test]
    fn parse_frame_with_payload() {
        let frame = Frame::from_bytes(b"\x0200A0FF\x03");
        let cmd = frame.parse().unwrap();
        assert_eq!(cmd.function, b'A');
        assert_eq!(cmd.subcode, b'0');
        assert_eq!(&cmd.payload[..], b"FF");
    }

    #[test]
    fn parse_accepts_terminator_ended_responses() {
        let frame = Frame::from_bytes(b"\x0200S00040\x1B");
        let cmd = frame.parse().unwrap();
        assert_eq!(cmd.function, b'S');
        assert_eq!(cmd.subcode, b'0');
        assert_eq!(&cmd.payload[..], b"0040");
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"\x0200A\x03".as_slice())] // 5 bytes, below minimum
    #[case(b"0000A1\x03".as_slice())] // missing STX
    #[case(b"\x0200A1ZZ".as_slice())] // missing closing delimiter
    fn parse_rejects_malformed(#[case] bytes: &[u8]) {
        let frame = Frame::from_bytes(bytes);
        assert!(matches!(
            frame.parse(),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn foreign_address_still_parses() {
        // Addressing is the dispatcher's concern, not a parse error.
        let frame = Frame::from_bytes(b"\x0242S1\x03");
        let cmd = frame.parse().unwrap();
        assert!(cmd.is_addressed_to("42"));
        assert!(!cmd.is_addressed_to("00"));
    }

    #[test]
    fn display_escapes_control_bytes() {
        let frame = Frame::from_bytes(b"\x0200A1\x03");
        assert_eq!(frame.to_string(), "\\x0200A1\\x03");
    }
}
