//! Outbound frame construction.
//!
//! Handlers decide *what* to answer ([`WireReply`]); the [`ReplyBuilder`]
//! turns that decision into wire bytes stamped with the local device's
//! address. Keeping construction in one place guarantees every outbound
//! frame follows the grammar:
//!
//! ```text
//! ACK/NAK:       STX addr (ACK|NAK) ETX
//! Data response: STX addr FUNC SUB payload SIB
//! Command:       STX addr FUNC SUB payload ETX
//! ```

use crate::frame::Frame;
use gatelink_core::constants::{
    ACK_BYTE, ACK_NAK_FRAME_LENGTH, DEVICE_ID_LENGTH, END_BYTE, NAK_BYTE, START_BYTE,
    TERMINATOR_BYTE,
};

/// A handler's decision about what goes back on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireReply {
    /// Positive acknowledgement, no payload.
    Ack,
    /// Negative acknowledgement, no payload.
    Nak,
    /// Data (or status) response, terminator-ended.
    Data {
        function: u8,
        subcode: u8,
        payload: Vec<u8>,
    },
}

impl WireReply {
    /// Convenience constructor for text-payload data responses.
    pub fn data(function: u8, subcode: u8, payload: impl Into<Vec<u8>>) -> Self {
        WireReply::Data {
            function,
            subcode,
            payload: payload.into(),
        }
    }
}

/// Builds outbound frames carrying the local device address.
#[derive(Debug, Clone)]
pub struct ReplyBuilder {
    address: [u8; 2],
}

impl ReplyBuilder {
    /// Create a builder for the given two-character wire address.
    ///
    /// The address is taken from `DeviceConfig::device_id_str`, which is
    /// always exactly two characters.
    pub fn new(device_id_str: &str) -> Self {
        let bytes = device_id_str.as_bytes();
        debug_assert_eq!(bytes.len(), DEVICE_ID_LENGTH);
        ReplyBuilder {
            address: [bytes[0], bytes[1]],
        }
    }

    pub fn ack(&self) -> Frame {
        self.ack_nak(ACK_BYTE)
    }

    pub fn nak(&self) -> Frame {
        self.ack_nak(NAK_BYTE)
    }

    fn ack_nak(&self, code: u8) -> Frame {
        let mut buf = Vec::with_capacity(ACK_NAK_FRAME_LENGTH);
        buf.push(START_BYTE);
        buf.extend_from_slice(&self.address);
        buf.push(code);
        buf.push(END_BYTE);
        Frame::from_vec(buf)
    }

    /// Terminator-ended data/status response.
    pub fn data(&self, function: u8, subcode: u8, payload: &[u8]) -> Frame {
        self.framed(function, subcode, payload, TERMINATOR_BYTE)
    }

    /// ETX-ended command frame, for traffic this device originates.
    pub fn command(&self, function: u8, subcode: u8, payload: &[u8]) -> Frame {
        self.framed(function, subcode, payload, END_BYTE)
    }

    fn framed(&self, function: u8, subcode: u8, payload: &[u8], closing: u8) -> Frame {
        let mut buf = Vec::with_capacity(ACK_NAK_FRAME_LENGTH + 1 + payload.len());
        buf.push(START_BYTE);
        buf.extend_from_slice(&self.address);
        buf.push(function);
        buf.push(subcode);
        buf.extend_from_slice(payload);
        buf.push(closing);
        Frame::from_vec(buf)
    }

    /// Encode a handler's reply decision.
    pub fn encode(&self, reply: &WireReply) -> Frame {
        match reply {
            WireReply::Ack => self.ack(),
            WireReply::Nak => self.nak(),
            WireReply::Data {
                function,
                subcode,
                payload,
            } => self.data(*function, *subcode, payload),
        }
    }
}
