//! Enable/disable engine: the only path that changes facility state after
//! startup.

use crate::registry::{sync_processors, FacilityRegistry};
use crate::{Arch, FacilityBits, FacilityError, FacilityTarget, OpcodeTable, FACILITY_BIT_COUNT};

impl<T: OpcodeTable> FacilityRegistry<T> {
    /// Enables or disables a facility in `arch`, or in the current mode when
    /// `arch` is `None`.
    ///
    /// A [`FacilityTarget::Bit`] target is forced: it skips the supported
    /// check, and a bit with no descriptor is flipped without rule or patch.
    /// Bundles toggle their members first; the whole change is validated
    /// before any of it is committed.
    ///
    /// # Errors
    ///
    /// In precedence order: [`FacilityError::Immutable`],
    /// [`FacilityError::ProcessorsRunning`], [`FacilityError::NotFound`],
    /// [`FacilityError::Unsupported`], [`FacilityError::RequiredFacility`],
    /// [`FacilityError::DependencyViolation`]. State is unchanged on error.
    pub fn set_facility(
        &mut self,
        target: &FacilityTarget,
        enable: bool,
        arch: Option<Arch>,
    ) -> Result<(), FacilityError> {
        let arch = arch.unwrap_or(self.arch_mode);
        if self.ipled {
            return Err(FacilityError::Immutable);
        }
        if self.any_running() {
            return Err(FacilityError::ProcessorsRunning);
        }

        let forced = matches!(target, FacilityTarget::Bit(_));
        let Some(index) = self.table.index_of(target) else {
            return match *target {
                FacilityTarget::Bit(bit) if bit < FACILITY_BIT_COUNT => {
                    self.set_raw_bit(bit, enable, arch);
                    Ok(())
                }
                _ => Err(FacilityError::NotFound(target.to_string())),
            };
        };

        let mut scratch = self.states[arch.index()];
        let mut plan = Vec::new();
        self.plan_change(index, enable, arch, forced, &mut scratch, &mut plan)?;
        for index in plan {
            self.commit(index, enable, arch, forced);
        }
        Ok(())
    }

    /// Validates one change against `scratch`, recursing into bundle members,
    /// and appends every facility that actually flips to `plan`.
    fn plan_change(
        &self,
        index: usize,
        enable: bool,
        arch: Arch,
        forced: bool,
        scratch: &mut FacilityBits,
        plan: &mut Vec<usize>,
    ) -> Result<(), FacilityError> {
        let Some(descriptor) = self.table.get(index) else {
            return Ok(());
        };
        let current = scratch.is_set(descriptor.bit());

        if !forced && !descriptor.is_supported(arch) && current != enable {
            return Err(FacilityError::Unsupported {
                facility: descriptor.short_name(),
                arch,
            });
        }
        if !enable && descriptor.is_required(arch) {
            return Err(FacilityError::RequiredFacility {
                facility: descriptor.short_name(),
                arch,
            });
        }

        if descriptor.is_bundle() {
            let members = descriptor.bundle_members();
            if enable {
                for &member in members {
                    self.plan_change(member, enable, arch, forced, scratch, plan)?;
                }
            } else {
                for &member in members.iter().rev() {
                    self.plan_change(member, enable, arch, forced, scratch, plan)?;
                }
            }
        }

        if current == enable {
            return Ok(());
        }
        self.table
            .check_rule(index, enable, scratch)
            .map_err(|violation| FacilityError::DependencyViolation { arch, violation })?;
        scratch.set(descriptor.bit(), enable);
        plan.push(index);
        Ok(())
    }

    fn commit(&mut self, index: usize, enable: bool, arch: Arch, forced: bool) {
        let Some(descriptor) = self.table.get(index) else {
            return;
        };
        let state = &mut self.states[arch.index()];
        state.set(descriptor.bit(), enable);
        sync_processors(&mut self.processors, arch, state);
        if descriptor.is_supported(arch) {
            self.overrides.patch(&mut self.opcodes, descriptor, arch, enable);
        }

        let action = if enable { "enabled" } else { "disabled" };
        if forced && !descriptor.is_supported(arch) {
            log::warn!(
                "{arch}: facility {} {action} by bit number although not supported",
                descriptor.short_name()
            );
        } else if forced {
            log::warn!("{arch}: facility {} {action} by bit number", descriptor.short_name());
        } else {
            log::info!("{arch}: facility {} {action}", descriptor.short_name());
        }
    }

    fn set_raw_bit(&mut self, bit: u16, enable: bool, arch: Arch) {
        let state = &mut self.states[arch.index()];
        if state.is_set(bit) == enable {
            return;
        }
        state.set(bit, enable);
        sync_processors(&mut self.processors, arch, state);
        let action = if enable { "enabled" } else { "disabled" };
        log::warn!("{arch}: undefined facility bit {bit} {action} by bit number");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::dispatch::ProgramInterrupt;
    use crate::{
        Arch, ArchFacilityTable, DependencyKind, DependencyRule, DispatchTable, FacilityDef,
        FacilityError, FacilityRegistry, FacilityTable, FacilityTarget, Opcode, PartialFacility,
        RegistryConfig,
    };

    fn registry(arch: Arch) -> FacilityRegistry {
        FacilityRegistry::new(&RegistryConfig::for_arch(arch)).expect("built-in registry")
    }

    fn name(text: &str) -> FacilityTarget {
        FacilityTarget::Name(text.into())
    }

    #[test]
    fn disabling_a_facility_suppresses_its_instructions() {
        let mut registry = registry(Arch::ZArch);
        let exrl = Opcode::extended(0xC6, 0x00);
        assert_eq!(registry.execute(exrl), Ok("EXRL"));

        registry
            .set_facility(&name("035_EXECUTE_EXTN"), false, None)
            .expect("no dependents");
        assert!(!registry.is_enabled(35, Arch::ZArch));
        assert_eq!(registry.execute(exrl), Err(ProgramInterrupt::Operation));
        assert!(!registry.processor(0).expect("cpu 0").facilities().is_set(35));

        registry
            .set_facility(&name("EXECUTE_EXTN"), true, None)
            .expect("re-enable");
        assert_eq!(registry.execute(exrl), Ok("EXRL"));
        assert_eq!(registry.overrides().record_count(), 0);
    }

    #[test]
    fn repeated_requests_are_no_ops() {
        let mut registry = registry(Arch::ZArch);
        registry.set_facility(&name("FP_EXTENSION"), false, None).expect("no dependents");
        registry.set_facility(&name("DFP"), false, None).expect("now free");
        let snapshot = registry.clone();

        registry.set_facility(&name("DFP"), false, None).expect("no-op");
        assert_eq!(registry.state(Arch::ZArch), snapshot.state(Arch::ZArch));
        assert_eq!(registry.overrides(), snapshot.overrides());
        assert_eq!(registry.opcodes(), snapshot.opcodes());
    }

    #[rstest]
    #[case(Arch::ZArch, "000_N3")]
    #[case(Arch::ZArch, "002_ZARCH_ACTIVE")]
    #[case(Arch::Esa390, "N3")]
    fn required_facilities_cannot_be_disabled(#[case] arch: Arch, #[case] facility: &str) {
        let mut registry = registry(arch);
        let err = registry
            .set_facility(&name(facility), false, Some(arch))
            .expect_err("required");
        assert!(matches!(err, FacilityError::RequiredFacility { arch: a, .. } if a == arch));
    }

    #[test]
    fn unsupported_facility_is_rejected_unless_forced() {
        let mut registry = registry(Arch::S370);
        assert_eq!(
            registry.set_facility(&name("042_DFP"), true, None),
            Err(FacilityError::Unsupported {
                facility: "042_DFP",
                arch: Arch::S370
            })
        );
        registry.set_facility(&name("042_DFP"), false, None).expect("already disabled");

        registry
            .set_facility(&FacilityTarget::Bit(42), true, None)
            .expect("forced");
        assert!(registry.is_enabled(42, Arch::S370));
    }

    #[test]
    fn undefined_bits_can_only_be_forced() {
        let mut registry = registry(Arch::ZArch);
        assert_eq!(
            registry.set_facility(&name("BOGUS"), true, None),
            Err(FacilityError::NotFound("BOGUS".into()))
        );
        assert_eq!(
            registry.set_facility(&FacilityTarget::Bit(224), true, None),
            Err(FacilityError::NotFound("BIT224".into()))
        );

        registry
            .set_facility(&FacilityTarget::Bit(12), true, None)
            .expect("forced raw bit");
        assert!(registry.is_enabled(12, Arch::ZArch));
        assert!(registry.processor(0).expect("cpu 0").facilities().is_set(12));
    }

    #[test]
    fn preconditions_are_checked_in_order() {
        let mut registry = registry(Arch::ZArch);
        registry.set_processor_running(0, true).expect("cpu 0");
        assert_eq!(
            registry.set_facility(&name("BOGUS"), true, None),
            Err(FacilityError::ProcessorsRunning)
        );

        registry.mark_ipled();
        assert_eq!(
            registry.set_facility(&name("BOGUS"), true, None),
            Err(FacilityError::Immutable)
        );
    }

    #[test]
    fn incompatible_facility_is_rejected() {
        let mut registry = registry(Arch::ZArch);
        registry
            .set_facility(&name("073_TRANSACTIONAL_EXEC"), true, None)
            .expect("supported");

        let err = registry
            .set_facility(&name("168_ESA390_COMPAT_MODE"), true, None)
            .expect_err("073 enabled");
        let FacilityError::DependencyViolation { violation, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(violation.kind, DependencyKind::Incompatible);
        assert_eq!(violation.conflicting, "073_TRANSACTIONAL_EXEC");
        assert!(!registry.is_enabled(168, Arch::ZArch));
    }

    #[test]
    fn omitted_architecture_uses_the_current_mode() {
        let mut registry = registry(Arch::Esa390);
        registry.set_facility(&name("007_STFL_EXTENDED"), true, None).expect("supported");
        assert!(registry.is_enabled(7, Arch::Esa390));

        registry
            .set_facility(&name("007_STFL_EXTENDED"), false, Some(Arch::ZArch))
            .expect("supported");
        assert!(registry.is_enabled(7, Arch::Esa390));
        assert!(!registry.is_enabled(7, Arch::ZArch));
    }

    #[test]
    fn processors_in_other_modes_keep_their_snapshot() {
        let mut registry = registry(Arch::ZArch);
        let before = *registry.processor(0).expect("cpu 0").facilities();
        registry
            .set_facility(&name("017_MSA"), false, Some(Arch::Esa390))
            .expect("no dependents on ESA/390");
        assert_eq!(registry.processor(0).expect("cpu 0").facilities(), &before);
    }

    #[test]
    fn s370_bundle_enables_members_in_order() {
        let mut registry = registry(Arch::S370);
        registry
            .set_facility(&name("HERC_370_EXTENSION"), true, None)
            .expect("all members supported");
        for bit in [201, 16, 24, 22, 30, 21, 34, 35] {
            assert!(registry.is_enabled(bit, Arch::S370), "bit {bit}");
        }
        assert_eq!(registry.execute(Opcode::extended(0xC6, 0x00)), Ok("EXRL"));

        registry
            .set_facility(&name("HERC_370_EXTENSION"), false, None)
            .expect("reverse order satisfies dependents");
        for bit in [201, 16, 24, 22, 30, 21, 34, 35] {
            assert!(!registry.is_enabled(bit, Arch::S370), "bit {bit}");
        }
        assert_eq!(
            registry.execute(Opcode::extended(0xC6, 0x00)),
            Err(ProgramInterrupt::Operation)
        );
    }

    const BUNDLE_PARTS: &[FacilityDef] = &[
        FacilityDef::new(1, "001_FIRST", "First member"),
        FacilityDef::new(2, "002_SECOND", "Second member")
            .with_rule(DependencyRule::incompatible(&[5])),
        FacilityDef::new(5, "005_BLOCKER", "Conflicts with the second member"),
        FacilityDef::new(10, "010_BUNDLE", "Both members").with_bundle(&[1, 2]),
    ];

    const BUNDLE_ENTRIES: &[PartialFacility] = &[
        PartialFacility::supported(1),
        PartialFacility::supported(2),
        PartialFacility::default_on(5),
        PartialFacility::supported(10),
    ];

    #[test]
    fn rejected_bundle_member_leaves_state_untouched() {
        let partial = ArchFacilityTable {
            arch: Arch::Esa390,
            entries: BUNDLE_ENTRIES,
        };
        let table = FacilityTable::from_parts(BUNDLE_PARTS, &[partial]).expect("valid parts");
        let opcodes = DispatchTable::for_facilities(&table);
        let mut registry =
            FacilityRegistry::from_parts(table, opcodes, &RegistryConfig::for_arch(Arch::Esa390));
        registry.initialize_facilities().expect("consistent defaults");
        let before = *registry.state(Arch::Esa390);

        let err = registry
            .set_facility(&name("BUNDLE"), true, None)
            .expect_err("second member conflicts");
        assert!(matches!(err, FacilityError::DependencyViolation { .. }));
        assert_eq!(registry.state(Arch::Esa390), &before);
        assert!(!registry.is_enabled(1, Arch::Esa390));

        registry.set_facility(&name("BLOCKER"), false, None).expect("no dependents");
        registry.set_facility(&name("BUNDLE"), true, None).expect("conflict gone");
        assert!([1, 2, 10].iter().all(|bit| registry.is_enabled(*bit, Arch::Esa390)));
    }
}
