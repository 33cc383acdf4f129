//! The device context: all mutable controller state in one place.
//!
//! A [`Device`] bundles the configuration mirror, status register, relay
//! bank, receive buffer and persistent store, and owns the injected
//! digital-output capability. It is the single mutator of all of that
//! state: the control loop feeds it bytes, frames and ticks strictly in
//! sequence, so no locking exists anywhere in the engine.

use crate::dispatch::{HandlerTable, Lookup};
use crate::handlers;
use crate::relay::{RelayBank, RelayState};
use gatelink_core::constants::{
    RELAY_COUNT, STATUS_CARD_READ, STATUS_FRAUD, STATUS_PAPER_PULSE, STATUS_RELAY_1,
    STATUS_RELAY_2, STATUS_SCANNER, TICKET_LINE_COUNT,
};
use gatelink_core::{CommandResponse, DeviceConfig, Error, StatusInfo};
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::{Frame, FrameReceiver, OverflowPolicy, ParsedCommand, ReplyBuilder};
use gatelink_storage::{ConfigStore, NvStore, StorageError, StorageResult};
use tracing::{debug, trace};

/// Map a storage failure into the engine's error taxonomy.
pub(crate) fn storage_err(e: StorageError) -> Error {
    Error::Storage(e.to_string())
}

/// Result of processing one inbound frame.
///
/// `wire` is the frame to transmit, already encoded with this device's
/// address; `None` means stay silent (foreign address, malformed frame or
/// unknown function).
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub response: CommandResponse,
    pub wire: Option<Frame>,
}

impl DispatchResult {
    fn silent(response: CommandResponse) -> Self {
        DispatchResult {
            response,
            wire: None,
        }
    }
}

/// Gate controller state machine over a persistent store `S` and a
/// digital-output bank `O`.
pub struct Device<S: NvStore, O: DigitalOutput> {
    pub(crate) config: DeviceConfig,
    pub(crate) status: StatusInfo,
    pub(crate) relays: RelayBank,
    pub(crate) store: ConfigStore<S>,
    pub(crate) outputs: O,
    pub(crate) ticket_lines: [String; TICKET_LINE_COUNT],
    pub(crate) reboot_requested: bool,
    receiver: FrameReceiver,
    table: HandlerTable<S, O>,
}

impl<S: NvStore, O: DigitalOutput> Device<S, O> {
    /// Load a device from its persistent store.
    ///
    /// Applies every defaulting rule the store defines; a blank (erased)
    /// store yields a device with id 0, company `"OemAccess"`, all modes 0
    /// and 5-second relay timers.
    pub fn new(store: S, outputs: O) -> StorageResult<Self> {
        Self::with_overflow_policy(store, outputs, OverflowPolicy::default())
    }

    /// Same as [`new`](Self::new) with an explicit receive-buffer overflow
    /// policy.
    pub fn with_overflow_policy(
        store: S,
        outputs: O,
        policy: OverflowPolicy,
    ) -> StorageResult<Self> {
        let store = ConfigStore::new(store);
        let config = store.load_device_config()?;

        let mut durations = [0u8; RELAY_COUNT];
        for (i, slot) in durations.iter_mut().enumerate() {
            *slot = store.load_relay_timer(i + 1)?;
        }

        let mut ticket_lines: [String; TICKET_LINE_COUNT] =
            std::array::from_fn(|_| String::new());
        for (i, line) in ticket_lines.iter_mut().enumerate() {
            *line = store.load_ticket_line(i + 1)?;
        }

        Ok(Device {
            config,
            status: StatusInfo::new(),
            relays: RelayBank::with_durations(durations),
            store,
            outputs,
            ticket_lines,
            reboot_requested: false,
            receiver: FrameReceiver::with_policy(policy),
            table: handlers::build_table(),
        })
    }

    // ------------------------------------------------------------------
    // Transport integration
    // ------------------------------------------------------------------

    /// Feed one inbound byte; returns `true` when a frame is complete.
    pub fn feed_byte(&mut self, byte: u8) -> bool {
        self.receiver.feed_byte(byte)
    }

    /// Whether a completed frame is waiting in the receive buffer.
    pub fn frame_ready(&self) -> bool {
        self.receiver.is_complete()
    }

    /// Take the completed frame, clearing the receive buffer.
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.receiver.take_frame()
    }

    /// Discard any partial frame in the receive buffer.
    pub fn clear_receiver(&mut self) {
        self.receiver.clear();
    }

    /// Parse and dispatch a raw frame (façade entry point).
    pub fn process_command(&mut self, raw: &[u8]) -> DispatchResult {
        let frame = Frame::from_bytes(raw);
        self.handle_frame(&frame)
    }

    /// Dispatch one complete frame.
    pub fn handle_frame(&mut self, frame: &Frame) -> DispatchResult {
        let cmd = match frame.parse() {
            Ok(cmd) => cmd,
            Err(e) => {
                trace!(%frame, error = %e, "dropping malformed frame");
                return DispatchResult::silent(CommandResponse::fail(e.to_string()));
            }
        };

        // A valid frame for another address is normal bus traffic, not an
        // error: take no action and stay silent.
        if !cmd.is_addressed_to(self.config.device_id_str()) {
            trace!(%frame, "frame addressed to another device");
            return DispatchResult::silent(CommandResponse::fail(
                "frame not addressed to this device",
            ));
        }

        self.dispatch(&cmd)
    }

    fn dispatch(&mut self, cmd: &ParsedCommand) -> DispatchResult {
        match self.table.lookup(cmd.function, cmd.subcode) {
            Lookup::UnknownFunction => {
                let e = Error::UnknownFunction(cmd.function as char);
                debug!(function = %(cmd.function as char), "unknown function code");
                DispatchResult::silent(CommandResponse::fail(e.to_string()))
            }
            Lookup::UnknownSubcode { family } => {
                let e = Error::UnknownSubcode {
                    family: cmd.function as char,
                    subcode: cmd.subcode as char,
                };
                debug!(family, error = %e, "unknown subcode");
                DispatchResult {
                    response: CommandResponse::fail(e.to_string()),
                    wire: Some(self.reply_builder().nak()),
                }
            }
            Lookup::Found(handler) => match handler(self, cmd) {
                Ok(reply) => {
                    let wire = self.reply_builder().encode(&reply.wire);
                    DispatchResult {
                        response: reply.to_response(),
                        wire: Some(wire),
                    }
                }
                Err(e) => {
                    debug!(
                        function = %(cmd.function as char),
                        subcode = %(cmd.subcode as char),
                        error = %e,
                        "command rejected"
                    );
                    DispatchResult {
                        response: CommandResponse::fail(e.to_string()),
                        wire: Some(self.reply_builder().nak()),
                    }
                }
            },
        }
    }

    /// Builder stamped with the device's current wire address.
    ///
    /// Built after the handler ran, so a command that changes the device id
    /// is acknowledged under the new address.
    fn reply_builder(&self) -> ReplyBuilder {
        ReplyBuilder::new(self.config.device_id_str())
    }

    // ------------------------------------------------------------------
    // Timer tick
    // ------------------------------------------------------------------

    /// Advance every relay one 100 ms tick.
    pub fn tick(&mut self) {
        let Device {
            relays, outputs, ..
        } = self;
        relays.tick(outputs);
    }

    // ------------------------------------------------------------------
    // Relay operations (also wrapped by the façade)
    // ------------------------------------------------------------------

    /// Latch a relay on and mirror relays 1/2 into the status register.
    pub fn activate_relay(&mut self, relay: usize) -> bool {
        let Device {
            relays, outputs, ..
        } = self;
        if !relays.activate(relay, outputs) {
            return false;
        }
        match relay {
            1 => self.status.set_bit(STATUS_RELAY_1),
            2 => self.status.set_bit(STATUS_RELAY_2),
            _ => {}
        }
        true
    }

    /// Release a relay and mirror relays 1/2 into the status register.
    pub fn deactivate_relay(&mut self, relay: usize) -> bool {
        let Device {
            relays, outputs, ..
        } = self;
        if !relays.deactivate(relay, outputs) {
            return false;
        }
        match relay {
            1 => self.status.clear_bit(STATUS_RELAY_1),
            2 => self.status.clear_bit(STATUS_RELAY_2),
            _ => {}
        }
        true
    }

    /// Persist and apply a relay duration in seconds.
    pub fn set_relay_timer(&mut self, relay: usize, seconds: u8) -> gatelink_core::Result<bool> {
        if !(1..=RELAY_COUNT).contains(&relay) {
            return Ok(false);
        }
        self.store
            .save_relay_timer(relay, seconds)
            .map_err(storage_err)?;
        self.relays.set_duration(relay, seconds);
        Ok(true)
    }

    /// Live duration of a relay in seconds.
    pub fn relay_timer(&self, relay: usize) -> Option<u8> {
        self.relays.duration(relay)
    }

    pub fn relay_state(&self, relay: usize) -> Option<RelayState> {
        self.relays.state(relay)
    }

    // ------------------------------------------------------------------
    // Reader / scanner state
    // ------------------------------------------------------------------

    /// Record a scanned credential: token, transient flag and status bit.
    pub fn scan_token(&mut self, token: impl Into<String>) {
        self.status.set_token(token);
        self.status.card_read = true;
        self.status.set_bit(STATUS_CARD_READ);
    }

    /// Re-arm the reader/scanner after a passage (wire command R7).
    ///
    /// Relay 3 is latched on without an immediate drive and relay 1 gets a
    /// short leftover countdown while being forced idle; both quirks match
    /// the deployed firmware.
    pub fn reset_reader_state(&mut self) {
        self.status.scanner_active = true;
        self.status.card_read = false;
        self.status
            .clear_bit(STATUS_CARD_READ | STATUS_FRAUD | STATUS_PAPER_PULSE | STATUS_SCANNER);

        self.relays.set_state(3, RelayState::Latched);
        self.relays.set_countdown(1, 10);
        self.relays.set_state(1, RelayState::Idle);
        self.deactivate_relay(1);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusInfo {
        &self.status
    }

    /// Ticket line text for a 1-based line number.
    pub fn ticket_line(&self, line: usize) -> Option<&str> {
        (1..=TICKET_LINE_COUNT)
            .contains(&line)
            .then(|| self.ticket_lines[line - 1].as_str())
    }

    /// The injected output bank (mock inspection in tests).
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn config_store(&self) -> &ConfigStore<S> {
        &self.store
    }

    /// Take the pending reboot request, if any. The runtime observes this
    /// after each dispatched frame; the engine itself never exits the
    /// process.
    pub fn take_reboot_request(&mut self) -> bool {
        std::mem::take(&mut self.reboot_requested)
    }
}
