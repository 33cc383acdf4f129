//! End-to-end command flows against a device on mock hardware.
//!
//! Frames go in as raw wire bytes; assertions cover the wire reply, the
//! local result and the observable state of outputs, status register and
//! persistent store.

use gatelink_controller::{Device, DispatchResult, RelayState};
use gatelink_core::constants::*;
use gatelink_core::types::OperatingMode;
use gatelink_hardware::MockOutputs;
use gatelink_storage::MemoryNvStore;

type TestDevice = Device<MemoryNvStore, MockOutputs>;

fn device() -> TestDevice {
    Device::new(
        MemoryNvStore::sized_for_layout(),
        MockOutputs::new(RELAY_COUNT),
    )
    .unwrap()
}

fn send(device: &mut TestDevice, frame: &[u8]) -> DispatchResult {
    device.process_command(frame)
}

fn wire_bytes(result: &DispatchResult) -> &[u8] {
    result.wire.as_ref().expect("expected a wire reply").as_bytes()
}

#[test]
fn fresh_device_loads_defaults_from_erased_store() {
    let device = device();
    assert_eq!(device.config().device_id(), 0);
    assert_eq!(device.config().device_id_str(), "00");
    assert_eq!(device.config().company_name, "OemAccess");
    for relay in 1..=RELAY_COUNT {
        assert_eq!(device.relay_timer(relay), Some(DEFAULT_RELAY_SECONDS));
        assert_eq!(device.relay_state(relay), Some(RelayState::Idle));
    }
}

#[test]
fn query_device_id_returns_hex_string() {
    let mut device = device();
    let result = send(&mut device, b"\x0200A1\x03");
    assert!(result.response.success);
    assert_eq!(result.response.data.as_deref(), Some("00"));
    assert_eq!(wire_bytes(&result), b"\x0200A100\x1B");
}

#[test]
fn activate_relay_one_sets_output_state_and_status() {
    let mut device = device();
    let result = send(&mut device, b"\x0200S1\x03");

    assert!(result.response.success);
    assert_eq!(wire_bytes(&result), b"\x0200\x06\x03");
    assert_eq!(device.relay_state(1), Some(RelayState::Latched));
    assert!(device.outputs().is_energized(0));
    assert!(device.status().is_bit_set(STATUS_RELAY_1));
    assert_eq!(device.status().hex(), "0040");
}

#[test]
fn foreign_address_is_ignored_without_reply_or_mutation() {
    let mut device = device();
    let result = send(&mut device, b"\x0242S1\x03");

    assert!(!result.response.success);
    assert!(result.wire.is_none());
    assert_eq!(device.relay_state(1), Some(RelayState::Idle));
    assert!(device.outputs().history().is_empty());
    assert_eq!(device.status().register(), 0);
}

#[test]
fn malformed_frames_are_dropped_silently() {
    let mut device = device();
    for raw in [
        b"\x0200A\x03".as_slice(), // too short
        b"0000A1\x03".as_slice(),  // no STX
        b"\x0200A1ZZ".as_slice(),  // no closing delimiter
    ] {
        let result = send(&mut device, raw);
        assert!(!result.response.success);
        assert!(result.wire.is_none());
    }
}

#[test]
fn set_device_id_persists_without_range_check() {
    let mut device = device();
    let result = send(&mut device, b"\x0200A0FF\x03");

    // The set path stores the raw byte; only the loader applies the 0-99
    // rule. The acknowledgement already carries the new address.
    assert!(result.response.success);
    assert_eq!(wire_bytes(&result), b"\x02FF\x06\x03");
    assert_eq!(device.config().device_id(), 0xFF);
    assert_eq!(device.config().device_id_str(), "FF");

    // The old address no longer matches; the new one does.
    assert!(send(&mut device, b"\x0200A1\x03").wire.is_none());
    let requery = send(&mut device, b"\x02FFA1\x03");
    assert_eq!(requery.response.data.as_deref(), Some("FF"));
}

#[test]
fn unknown_function_fails_locally_without_reply() {
    let mut device = device();
    let result = send(&mut device, b"\x0200Q0\x03");
    assert!(!result.response.success);
    assert!(result.wire.is_none());
}

#[test]
fn unknown_subcode_of_known_family_naks() {
    let mut device = device();
    let result = send(&mut device, b"\x0200A9\x03");
    assert!(!result.response.success);
    assert!(result.response.message.contains("A9"));
    assert_eq!(wire_bytes(&result), b"\x0200\x15\x03");
}

#[test]
fn short_payload_naks_with_insufficient_data() {
    let mut device = device();
    let result = send(&mut device, b"\x0200A6F\x03");
    assert!(!result.response.success);
    assert!(result.response.message.contains("insufficient data"));
    assert_eq!(wire_bytes(&result), b"\x0200\x15\x03");
}

#[test]
fn serial_number_write_is_device_restricted() {
    let mut device = device();

    // Device id 0: rejected with NAK, nothing stored.
    let denied = send(&mut device, b"\x0200AA1F\x03");
    assert!(!denied.response.success);
    assert_eq!(wire_bytes(&denied), b"\x0200\x15\x03");

    // Re-address the device to the programming station id and retry.
    send(&mut device, b"\x0200A002\x03");
    let granted = send(&mut device, b"\x0202AA1F\x03");
    assert!(granted.response.success);
    assert_eq!(wire_bytes(&granted), b"\x0202\x06\x03");

    let sn = send(&mut device, b"\x0202AF\x03");
    // Unprogrammed bytes still read as erased flash.
    assert_eq!(sn.response.data.as_deref(), Some("1FFFFFFFFF"));
}

#[test]
fn company_name_set_and_query() {
    let mut device = device();
    let set = send(&mut device, b"\x0200A4Parking Norte\x03");
    assert!(set.response.success);
    assert_eq!(device.config().company_name, "Parking Norte");

    let query = send(&mut device, b"\x0200A5\x03");
    assert_eq!(query.response.data.as_deref(), Some("Parking Norte"));
    assert_eq!(wire_bytes(&query), b"\x0200A5Parking Norte\x1B");
}

#[test]
fn status_query_carries_hex_mirror_and_token() {
    let mut device = device();
    device.scan_token("04ABCDEF");
    send(&mut device, b"\x0200S1\x03");

    let result = send(&mut device, b"\x0200S0\x03");
    // Relay-1 bit 0x0040 plus card-read bit 0x0100.
    assert_eq!(wire_bytes(&result), b"\x0200S0014004ABCDEF\x1B");
    assert_eq!(result.response.data.as_deref(), Some("014004ABCDEF"));
}

#[test]
fn lot_full_and_free_drive_relay_two() {
    let mut device = device();
    send(&mut device, b"\x0200S6\x03");
    assert!(device.outputs().is_energized(1));
    assert!(device.status().is_bit_set(STATUS_RELAY_2));

    send(&mut device, b"\x0200R6\x03");
    assert!(!device.outputs().is_energized(1));
    assert!(!device.status().is_bit_set(STATUS_RELAY_2));
}

#[test]
fn barrier_latch_survives_ticks() {
    let mut device = device();
    send(&mut device, b"\x0200S7\x03");
    assert_eq!(device.relay_state(1), Some(RelayState::PermanentOn));
    for _ in 0..200 {
        device.tick();
        assert!(device.outputs().is_energized(0));
    }
}

#[test]
fn pulse_command_runs_for_configured_duration() {
    let mut device = device();
    send(&mut device, b"\x0200H102\x03"); // relay 1 duration: 2 s
    send(&mut device, b"\x0200J1\x03"); // start pulse

    let ticks = 2 * TICKS_PER_SECOND;
    for _ in 0..ticks - 1 {
        device.tick();
        assert!(device.outputs().is_energized(0));
    }
    device.tick();
    assert!(!device.outputs().is_energized(0));
    assert_eq!(device.relay_state(1), Some(RelayState::Idle));
}

#[test]
fn hold_command_uses_hold_states() {
    let mut device = device();
    send(&mut device, b"\x0200K3\x03");
    device.tick();
    assert_eq!(device.relay_state(3), Some(RelayState::HoldWait));
    assert!(device.outputs().is_energized(2));
}

#[test]
fn relay_timer_set_persists_and_queries() {
    let mut device = device();
    let set = send(&mut device, b"\x0200H207\x03");
    assert!(set.response.success);
    assert_eq!(device.relay_timer(2), Some(7));
    assert_eq!(device.config_store().load_relay_timer(2).unwrap(), 7);

    let all = send(&mut device, b"\x0200H0\x03");
    assert_eq!(all.response.data.as_deref(), Some("0507050505"));
}

#[test]
fn reader_reset_rearms_scanner_and_relays() {
    let mut device = device();
    device.scan_token("1234567890");
    send(&mut device, b"\x0200S1\x03");

    let result = send(&mut device, b"\x0200R7\x03");
    assert!(result.response.success);
    assert!(device.status().scanner_active);
    assert!(!device.status().card_read);
    assert!(!device.status().is_bit_set(STATUS_CARD_READ));
    assert!(!device.status().is_bit_set(STATUS_RELAY_1));
    assert_eq!(device.relay_state(3), Some(RelayState::Latched));
    assert_eq!(device.relay_state(1), Some(RelayState::Idle));
    assert!(!device.outputs().is_energized(0));
}

#[test]
fn work_mode_determines_gate_direction() {
    let mut device = device();
    assert_eq!(
        send(&mut device, b"\x0200B2\x03").response.data.as_deref(),
        Some("E")
    );

    send(&mut device, b"\x0200B004\x03");
    assert!(!device.config().is_entry_gate());
    assert_eq!(
        send(&mut device, b"\x0200B2\x03").response.data.as_deref(),
        Some("S")
    );
    assert_eq!(
        device
            .config_store()
            .load_mode(OperatingMode::Work)
            .unwrap(),
        4
    );
}

#[test]
fn mode_families_set_and_query() {
    let mut device = device();
    for (set, query, expected) in [
        (b"\x0200C003\x03".as_slice(), b"\x0200C1\x03".as_slice(), "03"),
        (b"\x0200D001\x03".as_slice(), b"\x0200D1\x03".as_slice(), "01"),
        (b"\x0200E002\x03".as_slice(), b"\x0200E1\x03".as_slice(), "02"),
        (b"\x0200G009\x03".as_slice(), b"\x0200G1\x03".as_slice(), "09"),
    ] {
        assert!(send(&mut device, set).response.success);
        assert_eq!(
            send(&mut device, query).response.data.as_deref(),
            Some(expected)
        );
    }

    let summary = send(&mut device, b"\x0200M0\x03");
    // tcp, work, display, qr, clock, height-sensor.
    assert_eq!(summary.response.data.as_deref(), Some("003129"));
}

#[test]
fn factory_reset_restores_defaults() {
    let mut device = device();
    send(&mut device, b"\x0200A4Custom Name\x03");
    send(&mut device, b"\x0200C003\x03");

    let result = send(&mut device, b"\x0200M9\x03");
    assert!(result.response.success);
    assert_eq!(device.config().company_name, "OemAccess");
    assert_eq!(device.config().mode(OperatingMode::Display), 0);
    assert_eq!(device.config_store().load_company_name().unwrap(), "OemAccess");
}

#[test]
fn detector_timing_set_and_query_use_decimal_pairs() {
    let mut device = device();
    let set = send(&mut device, b"\x0200P545\x03");
    assert!(set.response.success);
    // "45" is decimal 45 here, not 0x45.
    assert_eq!(
        send(&mut device, b"\x0200P1\x03").response.data.as_deref(),
        Some("45")
    );

    send(&mut device, b"\x0200P812\x03");
    assert_eq!(
        send(&mut device, b"\x0200P4\x03").response.data.as_deref(),
        Some("12")
    );
}

#[test]
fn ticket_lines_read_write() {
    let mut device = device();
    assert_eq!(
        send(&mut device, b"\x0200T0\x03").response.data.as_deref(),
        Some("Ticket Linea 1")
    );

    let set = send(&mut device, b"\x0200T4Parking Oem 24h \x03");
    assert!(set.response.success);
    assert_eq!(
        send(&mut device, b"\x0200T0\x03").response.data.as_deref(),
        Some("Parking Oem 24h ")
    );

    // Short payload for a full-width field is rejected.
    let short = send(&mut device, b"\x0200T5abc\x03");
    assert!(!short.response.success);
    assert_eq!(wire_bytes(&short), b"\x0200\x15\x03");
}

#[test]
fn ticket_print_increments_persisted_counter() {
    let mut device = device();
    send(&mut device, b"\x0200Z00000\x03"); // zero the counter

    let first = send(&mut device, b"\x0200T9\x03");
    assert_eq!(first.response.data.as_deref(), Some("000000000001"));

    let second = send(&mut device, b"\x0200T9\x03");
    assert_eq!(second.response.data.as_deref(), Some("000000000002"));
    assert_eq!(device.config_store().load_ticket_counter().unwrap(), 2);
}

#[test]
fn ticket_counter_wire_form_round_trips() {
    let mut device = device();
    let set = send(&mut device, b"\x0200Z0A123\x03");
    assert!(set.response.success);
    assert_eq!(device.config_store().load_ticket_counter().unwrap(), 10_123);

    let query = send(&mut device, b"\x0200Z1\x03");
    assert_eq!(query.response.data.as_deref(), Some("A123"));
}

#[test]
fn credential_token_query_and_clear() {
    let mut device = device();
    assert_eq!(
        send(&mut device, b"\x0200O0\x03").response.data.as_deref(),
        Some("")
    );

    device.scan_token("00112233");
    assert!(device.status().is_bit_set(STATUS_CARD_READ));
    assert_eq!(
        send(&mut device, b"\x0200O0\x03").response.data.as_deref(),
        Some("00112233")
    );

    let clear = send(&mut device, b"\x0200O1\x03");
    assert!(clear.response.success);
    assert!(device.status().token().is_none());
    assert!(!device.status().is_bit_set(STATUS_CARD_READ));
}

#[test]
fn version_query_reports_firmware_string() {
    let mut device = device();
    let result = send(&mut device, b"\x0200V0\x03");
    assert_eq!(result.response.data.as_deref(), Some("OemProxy v1.0"));
    assert_eq!(wire_bytes(&result), b"\x0200V0OemProxy v1.0\x1B");
}

#[test]
fn reboot_command_acks_and_raises_flag() {
    let mut device = device();
    for frame in [b"\x0200X0\x03".as_slice(), b"\x0200X9\x03".as_slice()] {
        let result = send(&mut device, frame);
        assert!(result.response.success);
        assert_eq!(wire_bytes(&result), b"\x0200\x06\x03");
        assert!(device.take_reboot_request());
        assert!(!device.take_reboot_request());
    }
}

#[test]
fn byte_stream_feeds_into_dispatch() {
    let mut device = device();
    let mut ready = false;
    for &b in b"\x0200A1\x03" {
        ready = device.feed_byte(b);
    }
    assert!(ready);
    assert!(device.frame_ready());

    let frame = device.take_frame().unwrap();
    let result = device.handle_frame(&frame);
    assert_eq!(result.response.data.as_deref(), Some("00"));
    assert!(!device.frame_ready());
}
