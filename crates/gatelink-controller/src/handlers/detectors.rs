//! Family `P`: mass-detector presence/absence timing.
//!
//! Two inductive-loop detectors watch the gate lane; each has a configured
//! presence time and absence time in seconds. Subcodes `1`-`4` query the
//! four fields, `5`-`8` set them from two ASCII decimal digits. Timing
//! fields use the decimal-pair convention, not the hex-pair one.

use crate::device::{Device, storage_err};
use crate::dispatch::{HandlerReply, HandlerTable};
use gatelink_core::Result;
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::ParsedCommand;
use gatelink_protocol::field;
use gatelink_storage::{DetectorTiming, NvStore};

pub(crate) fn register<S: NvStore, O: DigitalOutput>(table: &mut HandlerTable<S, O>) {
    let mut family = table.family(b'P', "detector-timing");
    for sub in b'1'..=b'4' {
        family.on(sub, query_time);
    }
    for sub in b'5'..=b'8' {
        family.on(sub, set_time);
    }
}

/// Field addressed by a subcode; queries `1`-`4` mirror sets `5`-`8`.
fn timing_for(subcode: u8) -> DetectorTiming {
    match subcode {
        b'1' | b'5' => DetectorTiming::Detector1Absent,
        b'2' | b'6' => DetectorTiming::Detector1Present,
        b'3' | b'7' => DetectorTiming::Detector2Absent,
        _ => DetectorTiming::Detector2Present,
    }
}

fn describe(timing: DetectorTiming) -> &'static str {
    match timing {
        DetectorTiming::Detector1Absent => "detector 1 absence time",
        DetectorTiming::Detector1Present => "detector 1 presence time",
        DetectorTiming::Detector2Absent => "detector 2 absence time",
        DetectorTiming::Detector2Present => "detector 2 presence time",
    }
}

/// P1-P4: report a timing field as two decimal digits.
fn query_time<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let timing = timing_for(cmd.subcode);
    let seconds = device.store.load_detector_time(timing).map_err(storage_err)?;
    Ok(HandlerReply::data(
        b'P',
        cmd.subcode,
        format!("{seconds:02}"),
        format!("{}: {seconds} s", describe(timing)),
    ))
}

/// P5-P8: persist a timing field from two decimal digits.
fn set_time<S: NvStore, O: DigitalOutput>(
    device: &mut Device<S, O>,
    cmd: &ParsedCommand,
) -> Result<HandlerReply> {
    let timing = timing_for(cmd.subcode);
    let seconds = field::decode_decimal_pair(&cmd.payload)?;
    device
        .store
        .save_detector_time(timing, seconds)
        .map_err(storage_err)?;
    Ok(HandlerReply::ack(format!(
        "{} set to {seconds} s",
        describe(timing)
    )))
}
