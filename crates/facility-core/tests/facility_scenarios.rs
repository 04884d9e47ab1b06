//! End-to-end facility scenarios against the built-in tables.

#![allow(clippy::pedantic, clippy::nursery)]

use bitflags as _;
use facility_core::{
    Arch, DependencyKind, FacilityError, FacilityOverride, FacilityRegistry, FacilityTarget,
    Opcode, ProgramInterrupt, QueryMode, RegistryConfig,
};
use log as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn registry(arch: Arch) -> FacilityRegistry {
    FacilityRegistry::new(&RegistryConfig::for_arch(arch)).expect("built-in registry")
}

fn name(text: &str) -> FacilityTarget {
    FacilityTarget::parse(text)
}

const ADTR: Opcode = Opcode::extended(0xB3, 0xD2);
const CELFBR: Opcode = Opcode::extended(0xB3, 0x90);

#[test]
fn fp_extension_requires_dfp_in_zarch() {
    let mut registry = registry(Arch::ZArch);
    registry
        .set_facility(&name("037_FP_EXTENSION"), false, None)
        .expect("no dependents");
    registry.set_facility(&name("042_DFP"), false, None).expect("037 now disabled");
    assert_eq!(registry.execute(ADTR), Err(ProgramInterrupt::Operation));

    let err = registry
        .set_facility(&name("037_FP_EXTENSION"), true, None)
        .expect_err("042 disabled");
    match err {
        FacilityError::DependencyViolation { arch, violation } => {
            assert_eq!(arch, Arch::ZArch);
            assert_eq!(violation.conflicting, "042_DFP");
            assert_eq!(violation.kind, DependencyKind::Requires);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!registry.is_enabled(37, Arch::ZArch));

    registry.set_facility(&name("042_DFP"), true, None).expect("no requirements");
    registry
        .set_facility(&name("037_FP_EXTENSION"), true, None)
        .expect("042 enabled");
    assert_eq!(registry.execute(ADTR), Ok("ADTR"));
    assert_eq!(registry.execute(CELFBR), Ok("CELFBR"));
}

#[test]
fn dfp_cannot_be_disabled_under_fp_extension() {
    let mut registry = registry(Arch::ZArch);
    let before = registry.clone();

    let err = registry
        .set_facility(&name("042_DFP"), false, None)
        .expect_err("037 enabled by default");
    let FacilityError::DependencyViolation { violation, .. } = err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(violation.conflicting, "037_FP_EXTENSION");
    assert!(!violation.enabling);
    assert_eq!(registry.state(Arch::ZArch), before.state(Arch::ZArch));
    assert_eq!(registry.opcodes(), before.opcodes());

    registry
        .set_facility(&name("037_FP_EXTENSION"), false, None)
        .expect("no dependents");
    registry.set_facility(&name("042_DFP"), false, None).expect("037 disabled");
    assert!(!registry.is_enabled(42, Arch::ZArch));
    assert_eq!(registry.execute(CELFBR), Err(ProgramInterrupt::Operation));
}

#[rstest]
#[case(Arch::Esa390)]
#[case(Arch::ZArch)]
fn required_facilities_always_query_enabled(#[case] arch: Arch) {
    let mut registry = registry(arch);
    let required: Vec<_> = registry
        .report(Some(arch), QueryMode::default())
        .into_iter()
        .filter(|status| status.required)
        .collect();
    assert!(!required.is_empty());

    for status in required {
        assert!(status.enabled, "{}", status.short_name);
        assert!(matches!(
            registry.set_facility(&FacilityTarget::Bit(status.bit), false, Some(arch)),
            Err(FacilityError::RequiredFacility { .. })
        ));
        assert!(registry.is_enabled(status.bit, arch));
    }
}

#[test]
fn fresh_esa390_dump_matches_defaults() {
    let registry = registry(Arch::Esa390);
    let raw = registry.raw_facility_list(None);
    let expected: Vec<_> = registry
        .table()
        .iter()
        .filter(|d| d.is_default(Arch::Esa390) || d.is_required(Arch::Esa390))
        .map(|d| d.bit())
        .collect();
    assert_eq!(raw.bits.iter_set().collect::<Vec<_>>(), expected);
    assert_eq!(&raw.bits.as_bytes()[..4], &[0xD0, 0x00, 0xC8, 0x00]);
}

#[test]
fn two_startups_are_bit_identical() {
    let first = registry(Arch::ZArch);
    let second = registry(Arch::ZArch);
    for arch in Arch::ALL {
        assert_eq!(first.state(arch), second.state(arch));
    }
    assert_eq!(first.opcodes(), second.opcodes());
    assert_eq!(first.overrides(), second.overrides());
}

#[test]
fn facility_state_freezes_at_ipl() {
    let mut registry = registry(Arch::ZArch);
    registry.mark_ipled();
    assert_eq!(
        registry.set_facility(&name("042_DFP"), true, None),
        Err(FacilityError::Immutable)
    );
}

#[test]
fn running_processor_blocks_changes() {
    let config = RegistryConfig {
        processor_count: 4,
        ..RegistryConfig::default()
    };
    let mut registry = FacilityRegistry::new(&config).expect("built-in registry");
    registry.set_processor_running(3, true).expect("cpu 3");
    assert_eq!(
        registry.set_facility(&name("073_TRANSACTIONAL_EXEC"), true, None),
        Err(FacilityError::ProcessorsRunning)
    );

    registry.set_processor_running(3, false).expect("cpu 3");
    registry
        .set_facility(&name("073_TRANSACTIONAL_EXEC"), true, None)
        .expect("all stopped");
    assert!(registry
        .processors()
        .iter()
        .all(|processor| processor.facilities().is_set(73)));
}

#[test]
fn forced_bit_bypasses_support_but_not_rules() {
    let mut registry = registry(Arch::Esa390);
    let err = registry
        .set_facility(&FacilityTarget::Bit(37), true, None)
        .expect_err("042 not enabled on ESA/390");
    assert!(matches!(err, FacilityError::DependencyViolation { .. }));

    registry
        .set_facility(&name("BIT42"), true, None)
        .expect("forced");
    registry
        .set_facility(&name("BIT37"), true, None)
        .expect("forced with 042 enabled");
    let status = registry
        .query_facility(&name("FP_EXTENSION"), None)
        .expect("known");
    assert!(status.enabled && !status.supported && status.modified);
}

#[test]
fn configured_statements_apply_after_startup() {
    let config = RegistryConfig::for_arch(Arch::ZArch)
        .with_override(FacilityOverride::disable("037_FP_EXTENSION"))
        .with_override(FacilityOverride::disable("DFP"))
        .with_override(FacilityOverride::enable("017_MSA").for_arch(Arch::Esa390));
    let registry = FacilityRegistry::new(&config).expect("statements are valid");
    assert!(!registry.is_enabled(42, Arch::ZArch));
    assert!(registry.is_enabled(17, Arch::Esa390));
    assert_eq!(registry.execute(ADTR), Err(ProgramInterrupt::Operation));
}

#[test]
fn rejected_statement_fails_construction() {
    let config = RegistryConfig::default().with_override(FacilityOverride::disable("DFP"));
    assert!(matches!(
        FacilityRegistry::new(&config),
        Err(FacilityError::DependencyViolation { .. })
    ));
}

#[test]
fn s370_extension_round_trips_its_members() {
    let mut registry = registry(Arch::S370);
    let before = registry.clone();

    registry
        .set_facility(&name("201_HERC_370_EXTENSION"), true, None)
        .expect("members supported on S/370");
    assert_eq!(registry.execute(Opcode::extended(0xC6, 0x00)), Ok("EXRL"));
    assert_eq!(registry.execute(Opcode::primary(0xA8)), Ok("MVCLE"));

    registry
        .set_facility(&name("201_HERC_370_EXTENSION"), false, None)
        .expect("reverse order");
    assert_eq!(registry.state(Arch::S370), before.state(Arch::S370));
    assert_eq!(registry.opcodes(), before.opcodes());
    assert_eq!(registry.overrides(), before.overrides());
}

#[test]
fn s370_extension_is_rejected_outside_s370() {
    let mut registry = registry(Arch::ZArch);
    assert_eq!(
        registry.set_facility(&name("HERC_370_EXTENSION"), true, None),
        Err(FacilityError::Unsupported {
            facility: "201_HERC_370_EXTENSION",
            arch: Arch::ZArch,
        })
    );
}
