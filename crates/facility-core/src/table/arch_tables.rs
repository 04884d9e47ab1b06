//! Per-architecture partial facility tables.
//!
//! Each entry states whether one canonical facility is supported, enabled by
//! default, or required on one architecture. Bits absent from a table are
//! unsupported there.

use crate::table::{ArchFacilityTable, PartialFacility as P, CANONICAL_FACILITIES};
use crate::{Arch, ARCH_COUNT, FACILITY_BIT_COUNT};

/// S/370 view of the facility list.
pub const S370_FACILITIES: &[P] = &[
    P::supported(16),
    P::supported(21),
    P::supported(22),
    P::supported(24),
    P::supported(30),
    P::supported(34),
    P::supported(35),
    P::default_on(192),
    P::supported(193),
    P::default_on(194),
    P::supported(196),
    P::supported(198),
    P::supported(199),
    P::default_on(200),
    P::supported(201),
];

/// ESA/390 view of the facility list.
pub const ESA390_FACILITIES: &[P] = &[
    P::required(0),
    P::default_on(1),
    P::default_on(3),
    P::supported(7),
    P::default_on(16),
    P::default_on(17),
    P::default_on(20),
    P::supported(22),
    P::supported(23),
    P::supported(24),
    P::supported(30),
    P::default_on(192),
    P::supported(193),
    P::default_on(194),
    P::default_on(195),
    P::supported(196),
    P::supported(198),
    P::supported(199),
    P::default_on(200),
];

/// z/Architecture view of the facility list.
pub const ZARCH_FACILITIES: &[P] = &[
    P::required(0),
    P::required(1),
    P::required(2),
    P::default_on(3),
    P::default_on(4),
    P::default_on(5),
    P::default_on(6),
    P::default_on(7),
    P::default_on(8),
    P::default_on(9),
    P::default_on(10),
    P::default_on(11),
    P::default_on(13),
    P::default_on(14),
    P::default_on(16),
    P::default_on(17),
    P::default_on(18),
    P::default_on(19),
    P::default_on(20),
    P::default_on(21),
    P::default_on(22),
    P::default_on(23),
    P::default_on(24),
    P::default_on(25),
    P::default_on(26),
    P::default_on(27),
    P::default_on(28),
    P::default_on(30),
    P::default_on(31),
    P::default_on(32),
    P::default_on(33),
    P::default_on(34),
    P::default_on(35),
    P::default_on(36),
    P::default_on(37),
    P::default_on(40),
    P::default_on(41),
    P::default_on(42),
    P::supported(43),
    P::supported(44),
    P::default_on(45),
    P::default_on(47),
    P::supported(48),
    P::default_on(49),
    P::supported(50),
    P::default_on(51),
    P::default_on(57),
    P::supported(73),
    P::default_on(76),
    P::default_on(77),
    P::default_on(78),
    P::supported(80),
    P::default_on(129),
    P::default_on(135),
    P::supported(168),
    P::default_on(192),
    P::supported(193),
    P::default_on(194),
    P::default_on(195),
    P::supported(196),
    P::default_on(197),
    P::supported(198),
    P::supported(199),
    P::default_on(200),
];

/// Partial tables in architecture index order.
pub const ARCH_FACILITY_TABLES: [ArchFacilityTable; ARCH_COUNT] = [
    ArchFacilityTable {
        arch: Arch::S370,
        entries: S370_FACILITIES,
    },
    ArchFacilityTable {
        arch: Arch::Esa390,
        entries: ESA390_FACILITIES,
    },
    ArchFacilityTable {
        arch: Arch::ZArch,
        entries: ZARCH_FACILITIES,
    },
];

const _: () = assert_facility_tables();

const fn is_canonical(bit: u16) -> bool {
    let mut index = 0;
    while index < CANONICAL_FACILITIES.len() {
        if CANONICAL_FACILITIES[index].bit == bit {
            return true;
        }
        index += 1;
    }
    false
}

const fn all_canonical(bits: &[u16]) -> bool {
    let mut index = 0;
    while index < bits.len() {
        if !is_canonical(bits[index]) {
            return false;
        }
        index += 1;
    }
    true
}

const fn assert_facility_tables() {
    let mut index = 0;
    while index < CANONICAL_FACILITIES.len() {
        let def = CANONICAL_FACILITIES[index];
        assert!(def.bit < FACILITY_BIT_COUNT, "facility bit exceeds the list");
        if index > 0 {
            assert!(
                CANONICAL_FACILITIES[index - 1].bit < def.bit,
                "canonical facilities must be strictly ascending"
            );
        }
        if let Some(rule) = def.rule {
            assert!(all_canonical(rule.requires), "rule requires an unknown bit");
            assert!(
                all_canonical(rule.incompatible),
                "rule excludes an unknown bit"
            );
        }
        assert!(all_canonical(def.bundle), "bundle names an unknown bit");
        index += 1;
    }

    let mut table = 0;
    while table < ARCH_FACILITY_TABLES.len() {
        let partial = ARCH_FACILITY_TABLES[table];
        assert!(
            partial.arch.index() == table,
            "partial tables must be in architecture order"
        );
        let mut entry = 0;
        while entry < partial.entries.len() {
            let facility = partial.entries[entry];
            assert!(is_canonical(facility.bit), "partial table names an unknown bit");
            if entry > 0 {
                assert!(
                    partial.entries[entry - 1].bit < facility.bit,
                    "partial entries must be strictly ascending"
                );
            }
            entry += 1;
        }
        table += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{ESA390_FACILITIES, S370_FACILITIES, ZARCH_FACILITIES};

    #[test]
    fn s370_has_no_required_facilities() {
        assert!(S370_FACILITIES.iter().all(|entry| !entry.required));
    }

    #[test]
    fn zarch_requires_the_architecture_bits() {
        let required: Vec<_> = ZARCH_FACILITIES
            .iter()
            .filter(|entry| entry.required)
            .map(|entry| entry.bit)
            .collect();
        assert_eq!(required, [0, 1, 2]);
    }

    #[test]
    fn esa390_defaults_match_the_shipped_facility_list() {
        let defaults: Vec<_> = ESA390_FACILITIES
            .iter()
            .filter(|entry| entry.default)
            .map(|entry| entry.bit)
            .collect();
        assert_eq!(defaults, [0, 1, 3, 16, 17, 20, 192, 194, 195, 200]);
    }
}
