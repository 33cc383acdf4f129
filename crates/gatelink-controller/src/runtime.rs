//! The cooperative control loop.
//!
//! One task owns the [`Device`] and serializes its three duties:
//!
//! 1. feed inbound bytes into the receiver,
//! 2. dispatch completed frames to handlers (synchronously, including any
//!    blocking store commit),
//! 3. advance the relay state machines every 100 ms, independent of bus
//!    traffic.
//!
//! Because everything funnels through this loop there is no locking
//! anywhere in the engine. Transmission honors the half-duplex turnaround
//! contract in a single place: assert transmit, write, drain, restore
//! receive.
//!
//! Inbound bytes arrive over an mpsc channel so any transport (serial
//! reader thread, TCP bridge, test harness) can drive the loop.

use crate::device::Device;
use gatelink_core::constants::TICK_MILLIS;
use gatelink_hardware::{BusTransceiver, DigitalOutput};
use gatelink_protocol::Frame;
use gatelink_storage::NvStore;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Why the control loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// A reboot command was acknowledged; the caller should restart the
    /// device.
    RebootRequested,
    /// The byte source closed; the transport went away.
    InputClosed,
}

/// Control loop driving one device on one bus.
pub struct Runtime<S: NvStore, O: DigitalOutput, B: BusTransceiver> {
    device: Device<S, O>,
    bus: B,
    input: mpsc::Receiver<u8>,
}

impl<S: NvStore, O: DigitalOutput, B: BusTransceiver> Runtime<S, O, B> {
    pub fn new(device: Device<S, O>, bus: B, input: mpsc::Receiver<u8>) -> Self {
        Runtime { device, bus, input }
    }

    /// Run until the transport closes or a reboot is requested, returning
    /// the device and bus for inspection or restart.
    pub async fn run(mut self) -> (Device<S, O>, B, RunExit) {
        let mut tick = tokio::time::interval(Duration::from_millis(TICK_MILLIS));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            device_id = self.device.config().device_id_str(),
            "control loop started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => self.device.tick(),

                byte = self.input.recv() => match byte {
                    None => {
                        info!("input channel closed, stopping");
                        return (self.device, self.bus, RunExit::InputClosed);
                    }
                    Some(byte) => {
                        if self.device.feed_byte(byte) {
                            self.process_frame();
                            if self.device.take_reboot_request() {
                                info!("reboot requested by bus command");
                                return (self.device, self.bus, RunExit::RebootRequested);
                            }
                        }
                    }
                },
            }
        }
    }

    /// Dispatch the completed frame and answer on the bus.
    fn process_frame(&mut self) {
        let Some(frame) = self.device.take_frame() else {
            return;
        };
        debug!(%frame, "frame received");

        let result = self.device.handle_frame(&frame);
        debug!(
            success = result.response.success,
            message = %result.response.message,
            "command processed"
        );

        if let Some(wire) = result.wire {
            if let Err(e) = self.transmit(&wire) {
                warn!(%wire, error = %e, "failed to transmit reply");
            }
        }
    }

    /// Half-duplex turnaround: the reply is only written after transmit
    /// mode is asserted, and receive mode is only restored after the bytes
    /// drained.
    fn transmit(&mut self, frame: &Frame) -> gatelink_hardware::Result<()> {
        self.bus.set_transmit()?;
        self.bus.write_all(frame.as_bytes())?;
        self.bus.flush()?;
        self.bus.set_receive()
    }
}
