//! Control-loop tests over mock hardware with a paused clock.

use gatelink_controller::{Device, RelayState, RunExit, Runtime};
use gatelink_core::constants::RELAY_COUNT;
use gatelink_hardware::{BusEvent, MockBus, MockOutputs};
use gatelink_storage::MemoryNvStore;
use std::time::Duration;
use tokio::sync::mpsc;

fn device() -> Device<MemoryNvStore, MockOutputs> {
    Device::new(
        MemoryNvStore::sized_for_layout(),
        MockOutputs::new(RELAY_COUNT),
    )
    .unwrap()
}

async fn send_frame(tx: &mpsc::Sender<u8>, frame: &[u8]) {
    for &byte in frame {
        tx.send(byte).await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn replies_with_correct_bus_turnaround() {
    let (tx, rx) = mpsc::channel(64);
    let handle = tokio::spawn(Runtime::new(device(), MockBus::new(), rx).run());

    send_frame(&tx, b"\x0200S1\x03").await;
    drop(tx);

    let (device, bus, exit) = handle.await.unwrap();
    assert_eq!(exit, RunExit::InputClosed);

    // One reply, framed by the half-duplex turnaround in order.
    assert_eq!(
        bus.events(),
        &[
            BusEvent::Transmit,
            BusEvent::Write(b"\x0200\x06\x03".to_vec()),
            BusEvent::Flush,
            BusEvent::Receive,
        ]
    );
    assert_eq!(device.relay_state(1), Some(RelayState::Latched));
    assert!(device.outputs().is_energized(0));
}

#[tokio::test(start_paused = true)]
async fn foreign_frames_keep_the_bus_silent() {
    let (tx, rx) = mpsc::channel(64);
    let handle = tokio::spawn(Runtime::new(device(), MockBus::new(), rx).run());

    send_frame(&tx, b"\x0242S1\x03").await;
    drop(tx);

    let (device, bus, _) = handle.await.unwrap();
    assert!(bus.is_silent());
    assert_eq!(device.relay_state(1), Some(RelayState::Idle));
}

#[tokio::test(start_paused = true)]
async fn reboot_command_stops_the_loop_after_acking() {
    let (tx, rx) = mpsc::channel(64);
    let handle = tokio::spawn(Runtime::new(device(), MockBus::new(), rx).run());

    send_frame(&tx, b"\x0200X0\x03").await;

    let (_device, bus, exit) = handle.await.unwrap();
    assert_eq!(exit, RunExit::RebootRequested);
    assert_eq!(bus.writes(), vec![b"\x0200\x06\x03".as_slice()]);
    // Channel still open: the exit came from the reboot flag.
    drop(tx);
}

#[tokio::test(start_paused = true)]
async fn ticks_complete_a_pulse_without_bus_traffic() {
    let (tx, rx) = mpsc::channel(64);
    let handle = tokio::spawn(Runtime::new(device(), MockBus::new(), rx).run());

    // Start a pulse on relay 1 (default 5 s duration), then let the loop
    // tick well past expiry.
    send_frame(&tx, b"\x0200J1\x03").await;
    tokio::time::sleep(Duration::from_secs(6)).await;
    drop(tx);

    let (device, _bus, _) = handle.await.unwrap();
    assert_eq!(device.relay_state(1), Some(RelayState::Idle));
    assert!(!device.outputs().is_energized(0));

    // The pulse actually drove the coil low and released it.
    let history = device.outputs().history();
    assert!(history.contains(&(0, gatelink_hardware::PinLevel::Low)));
    assert_eq!(
        history.last(),
        Some(&(0, gatelink_hardware::PinLevel::High))
    );
}
