//! Families `B`/`C`/`D`/`E`/`G`: the remaining operating-mode selectors,
//! plus family `M`: configuration summary and factory reset.
//!
//! Every selector family follows the same shape: subcode `0` sets the mode
//! from a hex pair, subcode `1` reports it as two hex digits. Family `B`
//! additionally reports the derived gate direction, which recomputes from
//! the work mode and is never stored.

use crate::device::{Device, storage_err};
use crate::dispatch::{HandlerReply, HandlerTable};
use gatelink_core::Result;
use gatelink_core::types::OperatingMode;
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_protocol::field;
use gatelink_storage::NvStore;

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    table
        .family(b'B', "work-mode")
        .on(b'0', set_work)
        .on(b'1', query_work)
        .on(b'2', query_direction);
    table
        .family(b'C', "display-mode")
        .on(b'0', set_display)
        .on(b'1', query_display);
    table
        .family(b'D', "qr-mode")
        .on(b'0', set_qr)
        .on(b'1', query_qr);
    table
        .family(b'E', "clock-mode")
        .on(b'0', set_clock)
        .on(b'1', query_clock);
    table
        .family(b'G', "height-sensor-mode")
        .on(b'0', set_height_sensor)
        .on(b'1', query_height_sensor);
    table
        .family(b'M', "config-summary")
        .on(b'0', query_summary)
        .on(b'9', factory_reset);
}

fn apply_mode<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
    key: OperatingMode,
) -> Result<HandlerReply> {
    let value = field::decode_hex_pair(&cmd.payload)?;
    device.store.save_mode(key, value).map_err(storage_err)?;
    device.config.set_mode(key, value);
    Ok(HandlerReply::ack(format!("{key} mode set to {value:02X}")))
}

fn report_mode<S: NvStore, O: DigitalOutput>(
    device: &Device<S, O>,
    cmd: &ParsedCommand,
    key: OperatingMode,
) -> Result<HandlerReply> {
    let value = device.config.mode(key);
    Ok(HandlerReply::data(
        cmd.function,
        cmd.subcode,
        format!("{value:02X}"),
        format!("{key} mode: {value:02X}"),
    ))
}

fn set_work<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    apply_mode(device, cmd, OperatingMode::Work)
}

fn query_work<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    report_mode(device, cmd, OperatingMode::Work)
}

/// B2: report the derived gate direction, `E` for entry, `S` for exit.
fn query_direction<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let (code, name) = if device.config.is_entry_gate() {
        ("E", "entry")
    } else {
        ("S", "exit")
    };
    Ok(HandlerReply::data(
        b'B',
        b'2',
        code,
        format!("gate direction: {name}"),
    ))
}

fn set_display<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    apply_mode(device, cmd, OperatingMode::Display)
}

fn query_display<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    report_mode(device, cmd, OperatingMode::Display)
}

fn set_qr<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    apply_mode(device, cmd, OperatingMode::Qr)
}

fn query_qr<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    report_mode(device, cmd, OperatingMode::Qr)
}

fn set_clock<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    apply_mode(device, cmd, OperatingMode::Clock)
}

fn query_clock<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    report_mode(device, cmd, OperatingMode::Clock)
}

fn set_height_sensor<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    apply_mode(device, cmd, OperatingMode::HeightSensor)
}

fn query_height_sensor<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    report_mode(device, cmd, OperatingMode::HeightSensor)
}

/// M0: report the six mode selectors as one digit each, in persisted order.
fn query_summary<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    // The wire form carries one digit per selector; values only exceed 9
    // when a set command stored an out-of-range byte the loader would
    // discard on the next boot.
    let summary: String = OperatingMode::ALL
        .iter()
        .map(|&key| {
            char::from_digit(u32::from(device.config.mode(key)) % 10, 10).unwrap_or('0')
        })
        .collect();
    Ok(HandlerReply::data(
        b'M',
        b'0',
        summary.clone(),
        format!("mode summary: {summary}"),
    ))
}

/// M9: restore and persist factory defaults.
fn factory_reset<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.config = device.store.reset_to_defaults().map_err(storage_err)?;
    Ok(HandlerReply::ack("factory defaults restored"))
}
