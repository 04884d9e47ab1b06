//! Property coverage: idempotence, dependency closure and patch round-trips.

#![allow(clippy::pedantic, clippy::nursery)]

use bitflags as _;
use facility_core::{
    Arch, DispatchTable, FacilityRegistry, FacilityTable, FacilityTarget, OverrideChains,
    RegistryConfig, CANONICAL_FACILITIES,
};
use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn registry() -> FacilityRegistry {
    FacilityRegistry::new(&RegistryConfig::default()).expect("built-in registry")
}

fn arch_strategy() -> impl Strategy<Value = Arch> {
    prop_oneof![Just(Arch::S370), Just(Arch::Esa390), Just(Arch::ZArch)]
}

fn request_strategy() -> impl Strategy<Value = (usize, bool, Arch)> {
    (0..CANONICAL_FACILITIES.len(), any::<bool>(), arch_strategy())
}

fn target(index: usize) -> FacilityTarget {
    FacilityTarget::Name(CANONICAL_FACILITIES[index].short_name.to_string())
}

/// Every enabled facility's "requires" targets are enabled too.
fn assert_requires_closure(registry: &FacilityRegistry) {
    for arch in Arch::ALL {
        for descriptor in registry.table().iter() {
            let Some(rule) = descriptor.rule() else { continue };
            if !registry.is_enabled(descriptor.bit(), arch) {
                continue;
            }
            for required in rule.requires {
                assert!(
                    registry.is_enabled(*required, arch),
                    "{arch}: {} enabled without bit {required}",
                    descriptor.short_name()
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeating_a_request_changes_nothing((index, enable, arch) in request_strategy()) {
        let mut registry = registry();
        let target = target(index);
        let first = registry.set_facility(&target, enable, Some(arch));
        let snapshot = registry.clone();

        let second = registry.set_facility(&target, enable, Some(arch));
        if first.is_ok() {
            prop_assert!(second.is_ok());
        }
        prop_assert_eq!(registry.state(arch), snapshot.state(arch));
        prop_assert_eq!(registry.opcodes(), snapshot.opcodes());
        prop_assert_eq!(registry.overrides(), snapshot.overrides());
    }

    #[test]
    fn requires_closure_survives_any_sequence(
        requests in proptest::collection::vec(request_strategy(), 1..40)
    ) {
        let mut registry = registry();
        for (index, enable, arch) in requests {
            let before = registry.clone();
            if registry.set_facility(&target(index), enable, Some(arch)).is_err() {
                prop_assert_eq!(registry.state(arch), before.state(arch));
                prop_assert_eq!(registry.opcodes(), before.opcodes());
            }
            assert_requires_closure(&registry);
        }
    }

    #[test]
    fn suppress_then_restore_leaves_the_table_identical(
        index in 0..CANONICAL_FACILITIES.len(),
        arch in arch_strategy(),
    ) {
        let facilities = FacilityTable::builtin().expect("built-in table merges");
        let mut opcodes = DispatchTable::for_facilities(&facilities);
        let before = opcodes.clone();
        let descriptor = facilities.get(index).expect("index in range");
        let mut chains = OverrideChains::new();

        chains.suppress(&mut opcodes, descriptor, arch);
        chains.restore(&mut opcodes, descriptor, arch);
        prop_assert_eq!(opcodes, before);
        prop_assert_eq!(chains.record_count(), 0);
    }
}
