//! Relay control families.
//!
//! - `S`: activate relays, query status, latch the barrier ("lot full" on
//!   subcode 6).
//! - `R`: deactivate relays, free the lot, reset the reader.
//! - `H`: relay pulse/hold durations (query all, set per relay).
//! - `J`/`K`: start a timed pulse / timed hold using the configured
//!   duration; the next 100 ms tick drives the coil.

use crate::device::Device;
use crate::dispatch::{HandlerReply, HandlerTable};
use crate::relay::RelayState;
use gatelink_core::Result;
use gatelink_core::constants::RELAY_COUNT;
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_protocol::field;
use gatelink_storage::NvStore;

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    let mut activation = table.family(b'S', "activation");
    activation.on(b'0', query_status).on(b'7', latch_barrier);
    for sub in b'1'..=b'5' {
        activation.on(sub, activate_relay);
    }
    activation.on(b'6', lot_full);

    let mut deactivation = table.family(b'R', "deactivation");
    for sub in b'1'..=b'5' {
        deactivation.on(sub, deactivate_relay);
    }
    deactivation.on(b'6', lot_free).on(b'7', reset_reader);

    let mut timers = table.family(b'H', "relay-timers");
    timers.on(b'0', query_timers);
    for sub in b'1'..=b'5' {
        timers.on(sub, set_timer);
    }

    let mut pulse = table.family(b'J', "relay-pulse");
    for sub in b'1'..=b'5' {
        pulse.on(sub, start_pulse);
    }

    let mut hold = table.family(b'K', "relay-hold");
    for sub in b'1'..=b'5' {
        hold.on(sub, start_hold);
    }
}

/// Relay number carried in the subcode digit. Only subcodes '1'-'5' are
/// registered, so the result is always in range.
fn relay_number(cmd: &ParsedCommand) -> usize {
    (cmd.subcode - b'0') as usize
}

/// S0: status response with the four-digit register mirror followed by the
/// scanned token, if any.
fn query_status<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let mut payload = device.status.hex().to_string();
    if let Some(token) = device.status.token() {
        payload.push_str(token);
    }
    Ok(HandlerReply::data(
        b'S',
        b'0',
        payload,
        format!("status: {}", device.status.hex()),
    ))
}

/// S1-S5: latch relay n on.
fn activate_relay<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let relay = relay_number(cmd);
    device.activate_relay(relay);
    Ok(HandlerReply::ack(format!("relay {relay} activated")))
}

/// S6: lot full, inhibit entry via relay 2.
fn lot_full<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.activate_relay(2);
    Ok(HandlerReply::ack("lot full, entry inhibited"))
}

/// S7: latch the barrier permanently (relay 1, state 7).
fn latch_barrier<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.relays.set_state(1, RelayState::PermanentOn);
    Ok(HandlerReply::ack("barrier latched on"))
}

/// R1-R5: release relay n.
fn deactivate_relay<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let relay = relay_number(cmd);
    device.deactivate_relay(relay);
    Ok(HandlerReply::ack(format!("relay {relay} deactivated")))
}

/// R6: lot free, allow entry again.
fn lot_free<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.deactivate_relay(2);
    Ok(HandlerReply::ack("lot free, entry enabled"))
}

/// R7: re-arm the reader/scanner.
fn reset_reader<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.reset_reader_state();
    Ok(HandlerReply::ack("reader state reset"))
}

/// H0: report all five durations as two decimal digits each.
fn query_timers<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let mut payload = String::with_capacity(RELAY_COUNT * 2);
    for relay in 1..=RELAY_COUNT {
        let secs = device.relays.duration(relay).unwrap_or(0);
        payload.push_str(&format!("{secs:02}"));
    }
    Ok(HandlerReply::data(
        b'H',
        b'0',
        payload.clone(),
        format!("relay timers: {payload}"),
    ))
}

/// H1-H5: persist and apply the duration for relay n, decimal seconds.
fn set_timer<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let relay = relay_number(cmd);
    let seconds = field::decode_decimal_pair(&cmd.payload)?;
    device.set_relay_timer(relay, seconds)?;
    Ok(HandlerReply::ack(format!(
        "relay {relay} timer set to {seconds} s"
    )))
}

/// J1-J5: start a timed pulse on relay n.
fn start_pulse<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let relay = relay_number(cmd);
    device.relays.set_state(relay, RelayState::PulseStart);
    Ok(HandlerReply::ack(format!("relay {relay} pulse started")))
}

/// K1-K5: start a timed hold on relay n.
fn start_hold<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let relay = relay_number(cmd);
    device.relays.set_state(relay, RelayState::HoldStart);
    Ok(HandlerReply::ack(format!("relay {relay} hold started")))
}
