use crate::constants::{DEFAULT_COMPANY_NAME, EXIT_GATE_WORK_MODE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six independent operating-mode selectors of the device.
///
/// Each selector holds a single digit (0-9). Their meanings are opaque to
/// the protocol engine; it only stores, reports and persists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Bus transport selection (TCP vs RS-485).
    Tcp,
    /// Work mode. Also determines the gate direction, see
    /// [`DeviceConfig::is_entry_gate`].
    Work,
    /// Display behavior.
    Display,
    /// QR code digit-length handling.
    Qr,
    /// Clock behavior.
    Clock,
    /// Height-sensor behavior.
    HeightSensor,
}

impl OperatingMode {
    /// All selectors in their persisted order.
    pub const ALL: [OperatingMode; 6] = [
        OperatingMode::Tcp,
        OperatingMode::Work,
        OperatingMode::Display,
        OperatingMode::Qr,
        OperatingMode::Clock,
        OperatingMode::HeightSensor,
    ];
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatingMode::Tcp => "tcp",
            OperatingMode::Work => "work",
            OperatingMode::Display => "display",
            OperatingMode::Qr => "qr",
            OperatingMode::Clock => "clock",
            OperatingMode::HeightSensor => "height-sensor",
        };
        write!(f, "{name}")
    }
}

/// In-memory mirror of the persisted device configuration.
///
/// Loaded once at startup from the config store and mutated by
/// configuration-set commands. The two-character wire address
/// ([`device_id_str`](Self::device_id_str)) is kept in sync with the numeric
/// id on every mutation and is always its two-digit uppercase hex encoding.
///
/// Note that the numeric id is *not* range-limited here: the set-id command
/// persists whatever byte it decodes, and only the loader applies the 0-99
/// range check. An out-of-range id therefore survives in memory until the
/// next restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    device_id: u8,
    device_id_str: String,
    /// Company name shown on tickets and displays, at most 16 bytes.
    pub company_name: String,
    tcp_mode: u8,
    work_mode: u8,
    display_mode: u8,
    qr_mode: u8,
    clock_mode: u8,
    height_sensor_mode: u8,
}

impl DeviceConfig {
    /// Build a configuration with the given id and everything else at its
    /// documented default.
    pub fn new(device_id: u8) -> Self {
        DeviceConfig {
            device_id,
            device_id_str: format!("{device_id:02X}"),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            tcp_mode: 0,
            work_mode: 0,
            display_mode: 0,
            qr_mode: 0,
            clock_mode: 0,
            height_sensor_mode: 0,
        }
    }

    /// Numeric device id.
    #[must_use]
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Two-character uppercase hex wire address of this device.
    #[must_use]
    pub fn device_id_str(&self) -> &str {
        &self.device_id_str
    }

    /// Set the device id, re-deriving the wire address.
    pub fn set_device_id(&mut self, id: u8) {
        self.device_id = id;
        self.device_id_str = format!("{id:02X}");
    }

    /// Current value of an operating-mode selector.
    #[must_use]
    pub fn mode(&self, key: OperatingMode) -> u8 {
        match key {
            OperatingMode::Tcp => self.tcp_mode,
            OperatingMode::Work => self.work_mode,
            OperatingMode::Display => self.display_mode,
            OperatingMode::Qr => self.qr_mode,
            OperatingMode::Clock => self.clock_mode,
            OperatingMode::HeightSensor => self.height_sensor_mode,
        }
    }

    /// Set an operating-mode selector.
    pub fn set_mode(&mut self, key: OperatingMode, value: u8) {
        let slot = match key {
            OperatingMode::Tcp => &mut self.tcp_mode,
            OperatingMode::Work => &mut self.work_mode,
            OperatingMode::Display => &mut self.display_mode,
            OperatingMode::Qr => &mut self.qr_mode,
            OperatingMode::Clock => &mut self.clock_mode,
            OperatingMode::HeightSensor => &mut self.height_sensor_mode,
        };
        *slot = value;
    }

    /// Whether this device controls an entry gate. Derived from the work
    /// mode, never stored.
    #[must_use]
    pub fn is_entry_gate(&self) -> bool {
        self.work_mode != EXIT_GATE_WORK_MODE
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig::new(0)
    }
}

/// Local, programmatic result of processing one command.
///
/// This is what the façade layers see; the wire reply (ACK, NAK or a data
/// frame) is produced separately by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        CommandResponse {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: impl Into<String>) -> Self {
        CommandResponse {
            success: true,
            message: message.into(),
            data: Some(data.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        CommandResponse {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
