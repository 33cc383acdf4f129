//! Property tests for the persisted-field codecs.

use gatelink_storage::{ConfigStore, MemoryNvStore};
use proptest::prelude::*;

fn fresh() -> ConfigStore<MemoryNvStore> {
    ConfigStore::new(MemoryNvStore::sized_for_layout())
}

proptest! {
    /// Ticket counter round-trips across its whole representable range.
    #[test]
    fn ticket_counter_round_trip(counter in 0u32..=255_999) {
        let mut cfg = fresh();
        cfg.save_ticket_counter(counter).unwrap();
        prop_assert_eq!(cfg.load_ticket_counter().unwrap(), counter);
    }

    /// Stored ids above 99 always load as the default.
    #[test]
    fn device_id_defaulting(id in any::<u8>()) {
        let mut cfg = fresh();
        cfg.save_device_id(id).unwrap();
        let loaded = cfg.load_device_id().unwrap();
        if id <= 99 {
            prop_assert_eq!(loaded, id);
        } else {
            prop_assert_eq!(loaded, 0);
        }
    }

    /// Company names of printable ASCII round-trip up to the field width.
    #[test]
    fn company_name_round_trip(name in "[ -~]{1,16}") {
        // 0xFF can't appear in ASCII input, and an all-NUL name is excluded
        // by the non-empty regex, so no defaulting applies.
        let mut cfg = fresh();
        cfg.save_company_name(&name).unwrap();
        prop_assert_eq!(cfg.load_company_name().unwrap(), name);
    }

    /// Relay timers round-trip for every relay in the valid range.
    #[test]
    fn relay_timer_round_trip(relay in 1usize..=5, seconds in 1u8..100) {
        let mut cfg = fresh();
        cfg.save_relay_timer(relay, seconds).unwrap();
        prop_assert_eq!(cfg.load_relay_timer(relay).unwrap(), seconds);
    }
}
