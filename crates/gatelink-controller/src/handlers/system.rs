//! Device-level families: `O` credential token, `V` version, `X` reboot.

use crate::device::Device;
use crate::dispatch::{HandlerReply, HandlerTable};
use gatelink_core::Result;
use gatelink_core::constants::{FIRMWARE_VERSION, STATUS_CARD_READ};
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_storage::NvStore;

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    table
        .family(b'O', "credential")
        .on(b'0', query_token)
        .on(b'1', clear_token);
    table.family(b'V', "version").on(b'0', query_version);
    table
        .family(b'X', "reboot")
        .on(b'0', request_reboot)
        .on(b'9', request_reboot);
}

/// O0: report the last scanned token; empty payload when none is pending.
fn query_token<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let token = device.status.token().unwrap_or("").to_string();
    let message = if token.is_empty() {
        "no token pending".to_string()
    } else {
        format!("token: {token}")
    };
    Ok(HandlerReply::data(b'O', b'0', token, message))
}

/// O1: consume the pending token and card-read indication.
fn clear_token<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.status.clear_token();
    device.status.card_read = false;
    device.status.clear_bit(STATUS_CARD_READ);
    Ok(HandlerReply::ack("token cleared"))
}

/// V0: report the firmware identification string.
fn query_version<S: NvStore, O: DigitalOutput>(
    _device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    Ok(HandlerReply::data(
        b'V',
        b'0',
        FIRMWARE_VERSION,
        "version sent",
    ))
}

/// X0/X9: acknowledge, then ask the runtime to restart the device. The
/// engine itself never exits the process.
fn request_reboot<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    device.reboot_requested = true;
    Ok(HandlerReply::ack("rebooting device"))
}
