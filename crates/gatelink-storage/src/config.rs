//! Validating, defaulting view over the raw store.
//!
//! [`ConfigStore`] maps logical configuration fields onto the address space
//! in [`layout`](crate::layout). Loads never fail on bad *values*: anything
//! out of range or erased comes back as its documented default. Saves write
//! the field and durably commit before returning; callers may treat a save
//! as synchronous and blocking.

use crate::error::{StorageError, StorageResult};
use crate::layout;
use crate::nvram::{ERASED, NvStore};
use gatelink_core::constants::{
    COMPANY_NAME_LENGTH, DEFAULT_COMPANY_NAME, DEFAULT_RELAY_SECONDS, MAX_DEVICE_ID, MAX_MODE,
    RELAY_COUNT, SERIAL_NUMBER_LENGTH, TICKET_LINE_COUNT, TICKET_LINE_LENGTH,
};
use gatelink_core::types::{DeviceConfig, OperatingMode};

/// The four persisted mass-detector timing fields, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorTiming {
    Detector1Present,
    Detector1Absent,
    Detector2Present,
    Detector2Absent,
}

impl DetectorTiming {
    fn address(self) -> usize {
        match self {
            DetectorTiming::Detector1Present => layout::ADDR_DETECTOR_1_PRESENT,
            DetectorTiming::Detector1Absent => layout::ADDR_DETECTOR_1_ABSENT,
            DetectorTiming::Detector2Present => layout::ADDR_DETECTOR_2_PRESENT,
            DetectorTiming::Detector2Absent => layout::ADDR_DETECTOR_2_ABSENT,
        }
    }
}

/// Persistent configuration store over any [`NvStore`].
#[derive(Debug)]
pub struct ConfigStore<S: NvStore> {
    store: S,
}

impl<S: NvStore> ConfigStore<S> {
    pub fn new(store: S) -> Self {
        ConfigStore { store }
    }

    /// Access the underlying store (test inspection).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write one cell and commit.
    fn put(&mut self, addr: usize, value: u8) -> StorageResult<()> {
        self.store.write(addr, value)?;
        self.store.commit()
    }

    // ------------------------------------------------------------------
    // Device identity
    // ------------------------------------------------------------------

    /// Load the device id, defaulting out-of-range values to 0.
    pub fn load_device_id(&self) -> StorageResult<u8> {
        let id = self.store.read(layout::ADDR_DEVICE_ID)?;
        Ok(if id <= MAX_DEVICE_ID { id } else { 0 })
    }

    /// Persist the device id as-is.
    ///
    /// No range check here: the wire set-id path stores whatever byte it
    /// decoded, and only [`load_device_id`](Self::load_device_id) applies
    /// the 0-99 rule on the next boot.
    pub fn save_device_id(&mut self, id: u8) -> StorageResult<()> {
        self.put(layout::ADDR_DEVICE_ID, id)
    }

    /// Load the company name, substituting the default when the slot is
    /// empty or erased.
    pub fn load_company_name(&self) -> StorageResult<String> {
        let mut bytes = Vec::with_capacity(COMPANY_NAME_LENGTH);
        for i in 0..COMPANY_NAME_LENGTH {
            let b = self.store.read(layout::ADDR_COMPANY_NAME + i)?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        if bytes.is_empty() || bytes[0] == ERASED {
            return Ok(DEFAULT_COMPANY_NAME.to_string());
        }
        Ok(String::from_utf8(bytes).unwrap_or_else(|_| DEFAULT_COMPANY_NAME.to_string()))
    }

    /// Persist the company name, truncated to 16 bytes and NUL-terminated.
    pub fn save_company_name(&mut self, name: &str) -> StorageResult<()> {
        let bytes = name.as_bytes();
        let len = bytes.len().min(COMPANY_NAME_LENGTH);
        for (i, &b) in bytes[..len].iter().enumerate() {
            self.store.write(layout::ADDR_COMPANY_NAME + i, b)?;
        }
        if len < COMPANY_NAME_LENGTH {
            self.store.write(layout::ADDR_COMPANY_NAME + len, 0)?;
        }
        self.store.commit()
    }

    // ------------------------------------------------------------------
    // Operating modes
    // ------------------------------------------------------------------

    /// Load a mode selector, defaulting values above 9 to 0.
    pub fn load_mode(&self, key: OperatingMode) -> StorageResult<u8> {
        let mode = self.store.read(layout::mode_address(key))?;
        Ok(if mode <= MAX_MODE { mode } else { 0 })
    }

    pub fn save_mode(&mut self, key: OperatingMode, value: u8) -> StorageResult<()> {
        self.put(layout::mode_address(key), value)
    }

    // ------------------------------------------------------------------
    // Serial number
    // ------------------------------------------------------------------

    pub fn load_serial_number_byte(&self, index: usize) -> StorageResult<u8> {
        if index >= SERIAL_NUMBER_LENGTH {
            return Err(StorageError::InvalidIndex(index));
        }
        self.store.read(layout::ADDR_SERIAL_NUMBER + index)
    }

    pub fn save_serial_number_byte(&mut self, index: usize, value: u8) -> StorageResult<()> {
        if index >= SERIAL_NUMBER_LENGTH {
            return Err(StorageError::InvalidIndex(index));
        }
        self.put(layout::ADDR_SERIAL_NUMBER + index, value)
    }

    /// All five serial-number bytes.
    pub fn load_serial_number(&self) -> StorageResult<[u8; SERIAL_NUMBER_LENGTH]> {
        let mut sn = [0u8; SERIAL_NUMBER_LENGTH];
        for (i, slot) in sn.iter_mut().enumerate() {
            *slot = self.store.read(layout::ADDR_SERIAL_NUMBER + i)?;
        }
        Ok(sn)
    }

    // ------------------------------------------------------------------
    // Relay timers
    // ------------------------------------------------------------------

    /// Load the configured seconds for a 1-based relay number.
    ///
    /// Out-of-range relay numbers and stored values of 0 or >= 100 all
    /// yield the 5-second default.
    pub fn load_relay_timer(&self, relay: usize) -> StorageResult<u8> {
        if relay < 1 || relay > RELAY_COUNT {
            return Ok(DEFAULT_RELAY_SECONDS);
        }
        let secs = self.store.read(layout::ADDR_RELAY_TIMER + relay - 1)?;
        Ok(if secs > 0 && secs < 100 {
            secs
        } else {
            DEFAULT_RELAY_SECONDS
        })
    }

    /// Persist the seconds for a 1-based relay number; silently ignores
    /// out-of-range relay numbers.
    pub fn save_relay_timer(&mut self, relay: usize, seconds: u8) -> StorageResult<()> {
        if relay < 1 || relay > RELAY_COUNT {
            return Ok(());
        }
        self.put(layout::ADDR_RELAY_TIMER + relay - 1, seconds)
    }

    // ------------------------------------------------------------------
    // Detector timings
    // ------------------------------------------------------------------

    /// Load a detector timing in seconds, defaulting values above 99 to 0.
    pub fn load_detector_time(&self, timing: DetectorTiming) -> StorageResult<u8> {
        let secs = self.store.read(timing.address())?;
        Ok(if secs < 100 { secs } else { 0 })
    }

    pub fn save_detector_time(&mut self, timing: DetectorTiming, seconds: u8) -> StorageResult<()> {
        self.put(timing.address(), seconds)
    }

    // ------------------------------------------------------------------
    // Ticket lines and counter
    // ------------------------------------------------------------------

    /// Load a 1-based ticket line, defaulting empty or erased slots.
    pub fn load_ticket_line(&self, line: usize) -> StorageResult<String> {
        if line < 1 || line > TICKET_LINE_COUNT {
            return Ok(String::new());
        }
        let base = layout::ticket_line_address(line);
        let mut bytes = Vec::with_capacity(TICKET_LINE_LENGTH);
        for i in 0..TICKET_LINE_LENGTH {
            let b = self.store.read(base + i)?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        if bytes.is_empty() || bytes[0] == ERASED {
            return Ok(format!("Ticket Linea {line}"));
        }
        Ok(String::from_utf8(bytes).unwrap_or_else(|_| format!("Ticket Linea {line}")))
    }

    /// Persist a ticket line, truncated to 16 bytes and NUL-padded;
    /// silently ignores out-of-range line numbers.
    pub fn save_ticket_line(&mut self, line: usize, text: &str) -> StorageResult<()> {
        if line < 1 || line > TICKET_LINE_COUNT {
            return Ok(());
        }
        let base = layout::ticket_line_address(line);
        let bytes = text.as_bytes();
        for i in 0..TICKET_LINE_LENGTH {
            let b = bytes.get(i).copied().unwrap_or(0);
            self.store.write(base + i, b)?;
        }
        self.store.commit()
    }

    /// Load the ticket counter: stored thousands times 1000 plus the
    /// three-digit decimal remainder. Non-numeric remainder digits (for
    /// instance erased cells) count as zero.
    pub fn load_ticket_counter(&self) -> StorageResult<u32> {
        let thousands = self.store.read(layout::ADDR_TICKET_THOUSANDS)? as u32;
        let mut digits = [0u8; 3];
        for (i, slot) in digits.iter_mut().enumerate() {
            *slot = self.store.read(layout::ADDR_TICKET_REMAINDER + i)?;
        }
        let remainder = std::str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        Ok(thousands * 1000 + remainder)
    }

    /// Persist the ticket counter as a thousands byte plus three ASCII
    /// decimal digits. The thousands component is narrowed to a byte, so
    /// counters above [`MAX_TICKET_COUNTER`] wrap like the reference
    /// firmware's `uint8_t` cast.
    ///
    /// [`MAX_TICKET_COUNTER`]: gatelink_core::constants::MAX_TICKET_COUNTER
    pub fn save_ticket_counter(&mut self, counter: u32) -> StorageResult<()> {
        let thousands = (counter / 1000) as u8;
        let remainder = counter % 1000;
        self.store.write(layout::ADDR_TICKET_THOUSANDS, thousands)?;
        let digits = format!("{remainder:03}");
        for (i, b) in digits.bytes().enumerate() {
            self.store.write(layout::ADDR_TICKET_REMAINDER + i, b)?;
        }
        self.store.commit()
    }

    // ------------------------------------------------------------------
    // Whole-config operations
    // ------------------------------------------------------------------

    /// Load the full device configuration, applying every defaulting rule.
    pub fn load_device_config(&self) -> StorageResult<DeviceConfig> {
        let mut config = DeviceConfig::new(self.load_device_id()?);
        config.company_name = self.load_company_name()?;
        for key in OperatingMode::ALL {
            config.set_mode(key, self.load_mode(key)?);
        }
        Ok(config)
    }

    /// Persist every field of the given configuration.
    pub fn save_device_config(&mut self, config: &DeviceConfig) -> StorageResult<()> {
        self.save_device_id(config.device_id())?;
        self.save_company_name(&config.company_name)?;
        for key in OperatingMode::ALL {
            self.save_mode(key, config.mode(key))?;
        }
        Ok(())
    }

    /// Restore and persist factory defaults, returning the fresh config.
    pub fn reset_to_defaults(&mut self) -> StorageResult<DeviceConfig> {
        let config = DeviceConfig::default();
        self.save_device_config(&config)?;
        Ok(config)
    }
}
