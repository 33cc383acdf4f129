//! The command handler families.
//!
//! Every function family registers its subcode handlers into the shared
//! [`HandlerTable`]; the dispatcher never switches on letters itself.
//! Families group related state: identity and serial number (`A`), the
//! operating-mode selectors (`B`/`C`/`D`/`E`/`G`/`M`), relay control
//! (`H`/`J`/`K`/`R`/`S`), detector timing (`P`), tickets (`T`/`Z`) and
//! device-level operations (`O`/`V`/`X`).

mod detectors;
mod identity;
mod modes;
mod relays;
mod system;
mod tickets;

use crate::dispatch::HandlerTable;
use gatelink_hardware::DigitalOutput;
use gatelink_storage::NvStore;

/// Build the full registration table for a device.
pub(crate) fn build_table<S: NvStore, O: DigitalOutput>() -> HandlerTable<S, O> {
    let mut table = HandlerTable::new();
    identity::register(&mut table);
    modes::register(&mut table);
    relays::register(&mut table);
    detectors::register(&mut table);
    tickets::register(&mut table);
    system::register(&mut table);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Lookup;
    use gatelink_hardware::MockOutputs;
    use gatelink_storage::MemoryNvStore;

    type TestTable = HandlerTable<MemoryNvStore, MockOutputs>;

    #[test]
    fn all_eighteen_families_registered() {
        let table: TestTable = build_table();
        assert_eq!(table.family_count(), 18);
        for family in b"ABCDEGHJKMOPRSTVXZ" {
            assert!(
                !matches!(table.lookup(*family, 0), Lookup::UnknownFunction),
                "family {} missing",
                *family as char
            );
        }
    }

    #[test]
    fn unknown_function_misses_table() {
        let table: TestTable = build_table();
        assert!(matches!(table.lookup(b'Q', b'0'), Lookup::UnknownFunction));
        assert!(matches!(table.lookup(b'F', b'1'), Lookup::UnknownFunction));
    }

    #[test]
    fn unknown_subcode_names_family() {
        let table: TestTable = build_table();
        match table.lookup(b'A', b'9') {
            Lookup::UnknownSubcode { family } => assert_eq!(family, "identity"),
            _ => panic!("expected unknown subcode"),
        }
    }
}
