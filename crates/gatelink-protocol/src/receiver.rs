//! Incremental frame reassembly from the half-duplex bus.
//!
//! Bytes trickle in one at a time from the serial interrupt path. The
//! receiver accumulates them into a single bounded buffer until a complete
//! frame is available, then freezes it for the dispatcher. There is no frame
//! queue: the bus is command/response, so at most one command is in flight
//! per device, and the caller must drain and clear before feeding bytes past
//! a completed frame.
//!
//! # State machine
//!
//! ```text
//!             STX: reset + collect           ETX: complete
//! collecting ─────────────────────┐   ┌──────────────────────> complete
//!     ^                           │   │
//!     └───────────────────────────┴───┘
//!       other byte: append if room, else overflow policy
//! ```
//!
//! A START byte always resets the buffer, even mid-frame, so a retransmitted
//! command recovers the receiver. The response terminator (0x1B) is an
//! ordinary payload byte here; only ETX completes a frame.
//!
//! # Overflow
//!
//! The deployed firmware silently drops bytes once the buffer is full and
//! waits for an explicit clear, which can wedge the receiver behind a stuck
//! sender. That behavior is kept as the default policy
//! ([`OverflowPolicy::DropAndWait`]); [`OverflowPolicy::DropAndReset`]
//! instead clears the buffer on overflow and re-arms on the next START.

use crate::frame::Frame;
use gatelink_core::constants::{END_BYTE, MAX_FRAME_LENGTH, START_BYTE};

/// What to do with incoming bytes once the frame buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Silently drop bytes until the buffer is cleared (deployed-firmware
    /// behavior).
    #[default]
    DropAndWait,
    /// Clear the buffer and wait for the next START byte.
    DropAndReset,
}

/// Assembles inbound bytes into delimited frames.
#[derive(Debug)]
pub struct FrameReceiver {
    buf: Vec<u8>,
    complete: bool,
    policy: OverflowPolicy,
    dropped: u64,
}

impl FrameReceiver {
    pub fn new() -> Self {
        Self::with_policy(OverflowPolicy::default())
    }

    pub fn with_policy(policy: OverflowPolicy) -> Self {
        FrameReceiver {
            buf: Vec::with_capacity(MAX_FRAME_LENGTH),
            complete: false,
            policy,
            dropped: 0,
        }
    }

    /// Feed one byte; returns `true` when a complete frame is ready.
    ///
    /// After a frame completes, the caller must [`take_frame`](Self::take_frame)
    /// (or [`clear`](Self::clear)) before feeding further traffic; bytes fed
    /// past a completed frame are appended to it and will corrupt parsing.
    pub fn feed_byte(&mut self, byte: u8) -> bool {
        if byte == START_BYTE {
            self.buf.clear();
            self.buf.push(byte);
            self.complete = false;
            return false;
        }

        if byte == END_BYTE {
            if self.buf.len() < MAX_FRAME_LENGTH {
                self.buf.push(byte);
            }
            self.complete = true;
            return true;
        }

        // Reserve one slot so the closing ETX always fits.
        if self.buf.len() < MAX_FRAME_LENGTH - 1 {
            self.buf.push(byte);
        } else {
            self.dropped += 1;
            if self.policy == OverflowPolicy::DropAndReset {
                self.clear();
            }
        }
        false
    }

    /// Whether a complete frame is waiting to be taken.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Take the completed frame, clearing the receiver for the next one.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.complete {
            return None;
        }
        let frame = Frame::from_bytes(&self.buf);
        self.clear();
        Some(frame)
    }

    /// Discard any partial or completed frame.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.complete = false;
    }

    /// Bytes discarded by the overflow policy since construction.
    #[must_use]
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        FrameReceiver::new()
    }
}
