//! Persisted configuration for the gate controller.
//!
//! The device keeps its identity, operating modes, relay timings and ticket
//! data in a small byte-addressable non-volatile store (EEPROM-style flash
//! on the reference hardware). This crate owns the field layout of that
//! address space and the validation/defaulting rules applied when reading
//! it back: every load range-checks the stored value and substitutes a
//! documented default when the cell is out of range or erased, and every
//! save durably commits before returning.

pub mod config;
pub mod error;
pub mod layout;
pub mod nvram;

pub use config::{ConfigStore, DetectorTiming};
pub use error::{StorageError, StorageResult};
pub use nvram::{MemoryNvStore, NvStore};
