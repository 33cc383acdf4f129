//! Loopback demo: a gate controller on mock hardware.
//!
//! Wires a [`Device`] to an in-memory store, mock relay outputs and a mock
//! half-duplex bus, then plays a short master session against it through
//! the real control loop. Useful for eyeballing wire traffic without any
//! hardware attached:
//!
//! ```sh
//! RUST_LOG=debug cargo run -p gatelink-cli
//! ```

use anyhow::Result;
use gatelink_controller::{Device, RunExit, Runtime};
use gatelink_core::constants::RELAY_COUNT;
use gatelink_hardware::{MockBus, MockOutputs};
use gatelink_protocol::Frame;
use gatelink_storage::MemoryNvStore;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A short master session: queries, relay control and a ticket print.
const SESSION: &[(&str, &[u8])] = &[
    ("query device id", b"\x0200A1\x03"),
    ("query firmware version", b"\x0200V0\x03"),
    ("zero the ticket counter", b"\x0200Z00000\x03"),
    ("activate relay 1", b"\x0200S1\x03"),
    ("query status", b"\x0200S0\x03"),
    ("set relay 2 timer to 7 s", b"\x0200H207\x03"),
    ("print a ticket", b"\x0200T9\x03"),
    ("deactivate relay 1", b"\x0200R1\x03"),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let device = Device::new(
        MemoryNvStore::sized_for_layout(),
        MockOutputs::new(RELAY_COUNT),
    )?;
    info!(
        device_id = device.config().device_id_str(),
        company = %device.config().company_name,
        "device loaded from erased store"
    );

    let (tx, rx) = mpsc::channel(256);
    let loop_handle = tokio::spawn(Runtime::new(device, MockBus::new(), rx).run());

    for (label, frame) in SESSION {
        info!(command = %label, frame = %Frame::from_bytes(frame), "master sends");
        for &byte in *frame {
            tx.send(byte).await?;
        }
    }
    drop(tx);

    let (device, bus, exit) = loop_handle.await?;
    assert!(matches!(exit, RunExit::InputClosed));

    info!("--- bus transcript (device replies) ---");
    for reply in bus.writes() {
        info!(reply = %Frame::from_bytes(reply), "device sent");
    }

    info!(
        relay1 = ?device.relay_state(1),
        relay2_timer = ?device.relay_timer(2),
        status = device.status().hex(),
        tickets = device.config_store().load_ticket_counter()?,
        "final device state"
    );

    Ok(())
}
