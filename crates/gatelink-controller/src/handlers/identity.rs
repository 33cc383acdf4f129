//! Family `A`: device identity, company name, TCP mode and the factory
//! serial number.

use crate::device::{Device, storage_err};
use crate::dispatch::{HandlerReply, HandlerTable};
use gatelink_core::constants::{COMPANY_NAME_LENGTH, SERIAL_WRITE_DEVICE_ID};
use gatelink_core::types::OperatingMode;
use gatelink_core::{Error, Result};
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_protocol::field;
use gatelink_storage::NvStore;

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    let mut family = table.family(b'A', "identity");
    family
        .on(b'0', set_device_id)
        .on(b'1', query_device_id)
        .on(b'4', set_company_name)
        .on(b'5', query_company_name)
        .on(b'6', set_tcp_mode)
        .on(b'7', query_tcp_mode)
        .on(b'A', set_serial_byte)
        .on(b'B', set_serial_byte)
        .on(b'C', set_serial_byte)
        .on(b'D', set_serial_byte)
        .on(b'E', set_serial_byte)
        .on(b'F', query_serial_number);
}

/// A0: persist a new device id and re-derive the wire address.
///
/// The decoded byte is stored as-is; the 0-99 range rule is only applied by
/// the loader on the next boot. The acknowledgement already carries the new
/// address.
fn set_device_id<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let id = field::decode_hex_pair(&cmd.payload)?;
    device.store.save_device_id(id).map_err(storage_err)?;
    device.config.set_device_id(id);
    Ok(HandlerReply::ack(format!(
        "device id set to {}",
        device.config.device_id_str()
    )))
}

/// A1: report the two-character device id string.
fn query_device_id<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let id = device.config.device_id_str();
    Ok(HandlerReply::data(
        b'A',
        b'1',
        id,
        format!("device id: {id}"),
    ))
}

/// A4: persist the company name (up to 16 bytes).
fn set_company_name<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    field::require(&cmd.payload, 1)?;
    let name = field::take_text(&cmd.payload, COMPANY_NAME_LENGTH);
    device.store.save_company_name(&name).map_err(storage_err)?;
    device.config.company_name = name;
    Ok(HandlerReply::ack("company name updated"))
}

/// A5: report the company name.
fn query_company_name<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let name = device.config.company_name.clone();
    Ok(HandlerReply::data(
        b'A',
        b'5',
        name.clone(),
        format!("company name: {name}"),
    ))
}

/// A6: persist the TCP/RS-485 transport mode.
fn set_tcp_mode<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let mode = field::decode_hex_pair(&cmd.payload)?;
    device
        .store
        .save_mode(OperatingMode::Tcp, mode)
        .map_err(storage_err)?;
    device.config.set_mode(OperatingMode::Tcp, mode);
    Ok(HandlerReply::ack(format!("tcp mode set to {mode:02X}")))
}

/// A7: report the TCP/RS-485 transport mode.
fn query_tcp_mode<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let mode = device.config.mode(OperatingMode::Tcp);
    Ok(HandlerReply::data(
        b'A',
        b'7',
        format!("{mode:02X}"),
        format!("tcp mode: {mode:02X}"),
    ))
}

/// AA-AE: write one factory serial-number byte.
///
/// Restricted to the programming station's device id; any other device gets
/// a NAK. This is an authorization gate, not a framing error.
fn set_serial_byte<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    if device.config.device_id() != SERIAL_WRITE_DEVICE_ID {
        return Err(Error::Unauthorized);
    }
    let index = (cmd.subcode - b'A') as usize;
    let value = field::decode_hex_pair(&cmd.payload)?;
    device
        .store
        .save_serial_number_byte(index, value)
        .map_err(storage_err)?;
    Ok(HandlerReply::ack(format!(
        "serial number byte {index} set to {value:02X}"
    )))
}

/// AF: report all five serial-number bytes as ten hex digits.
fn query_serial_number<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let sn = device.store.load_serial_number().map_err(storage_err)?;
    let hex: String = sn.iter().map(|b| format!("{b:02X}")).collect();
    Ok(HandlerReply::data(
        b'A',
        b'F',
        hex.clone(),
        format!("serial number: {hex}"),
    ))
}
