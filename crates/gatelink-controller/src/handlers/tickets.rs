//! Family `T`: ticket lines and printing; family `Z`: the ticket counter.
//!
//! The printer prints four 16-character text lines plus a sequential ticket
//! number. The counter persists as a "thousands" byte and a three-digit
//! decimal remainder; printing increments it durably before the number goes
//! on the wire, so a power cycle never reissues a number.

use crate::device::{Device, storage_err};
use crate::dispatch::{HandlerReply, HandlerTable};
use gatelink_core::Result;
use gatelink_core::constants::{MAX_TICKET_COUNTER, TICKET_LINE_LENGTH};
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_protocol::field::{self, hex_char, hex_val};
use gatelink_storage::NvStore;

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    let mut tickets = table.family(b'T', "tickets");
    for sub in b'0'..=b'3' {
        tickets.on(sub, query_line);
    }
    for sub in b'4'..=b'7' {
        tickets.on(sub, set_line);
    }
    tickets.on(b'9', print_ticket);

    table
        .family(b'Z', "ticket-counter")
        .on(b'0', set_counter)
        .on(b'1', query_counter)
        .on(b'9', show_config);
}

/// T0-T3: report ticket line 1-4.
fn query_line<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let line = (cmd.subcode - b'0') as usize + 1;
    let text = device.ticket_lines[line - 1].clone();
    Ok(HandlerReply::data(
        b'T',
        cmd.subcode,
        text,
        format!("ticket line {line} sent"),
    ))
}

/// T4-T7: persist ticket line 1-4; requires the full 16-byte field.
fn set_line<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let line = (cmd.subcode - b'4') as usize + 1;
    field::require(&cmd.payload, TICKET_LINE_LENGTH)?;
    let text = field::take_text(&cmd.payload, TICKET_LINE_LENGTH);
    device
        .store
        .save_ticket_line(line, &text)
        .map_err(storage_err)?;
    device.ticket_lines[line - 1] = text;
    Ok(HandlerReply::ack(format!("ticket line {line} stored")))
}

/// T9: issue the next ticket number and report it zero-padded to 12 digits.
fn print_ticket<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let current = device.store.load_ticket_counter().map_err(storage_err)?;
    let next = if current >= MAX_TICKET_COUNTER {
        1
    } else {
        current + 1
    };
    device.store.save_ticket_counter(next).map_err(storage_err)?;
    Ok(HandlerReply::data(
        b'T',
        b'9',
        format!("{next:012}"),
        format!("ticket {next} printed"),
    ))
}

/// Z0: set the counter from a thousands hex digit plus three decimal digits.
fn set_counter<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    field::require(&cmd.payload, 4)?;
    let thousands = u32::from(hex_val(cmd.payload[0]));
    let remainder = 100 * u32::from(hex_val(cmd.payload[1]))
        + 10 * u32::from(hex_val(cmd.payload[2]))
        + u32::from(hex_val(cmd.payload[3]));
    let counter = thousands * 1000 + remainder;
    device
        .store
        .save_ticket_counter(counter)
        .map_err(storage_err)?;
    Ok(HandlerReply::ack(format!("ticket counter set to {counter}")))
}

/// Z1: report the counter in the same four-character form.
fn query_counter<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let counter = device.store.load_ticket_counter().map_err(storage_err)?;
    // The wire form carries a single hex digit of thousands.
    let thousands = hex_char(((counter / 1000) & 0x0F) as u8);
    let payload = format!("{}{:03}", thousands as char, counter % 1000);
    Ok(HandlerReply::data(
        b'Z',
        b'1',
        payload.clone(),
        format!("ticket counter: {counter}"),
    ))
}

/// Z9: show the configuration on the local display. Display rendering is
/// outside the protocol engine; the command only acknowledges.
fn show_config<S: NvStore, O: DigitalOutput>(
    _device: &mut Device<S, O>,
    _cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    Ok(HandlerReply::ack("configuration shown on display"))
}
