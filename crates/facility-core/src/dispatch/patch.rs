//! Facility-not-available overrides for disabled facilities.
//!
//! Each (facility, architecture) pair owns at most one chain of override
//! records. The chain exists exactly while the facility is suppressed there;
//! restoring reinstalls every captured handler and drops the chain.

use std::collections::BTreeMap;

use crate::dispatch::{Handler, Opcode, OpcodeTable};
use crate::{Arch, FacilityDescriptor};

/// One opcode currently redirected to the facility-not-available stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionOverrideRecord {
    /// Redirected opcode.
    pub opcode: Opcode,
    /// Architecture whose table was patched.
    pub arch: Arch,
    /// Handler to reinstall on restore.
    pub original_handler: Handler,
    /// Mnemonic for diagnostics.
    pub display_name: &'static str,
}

/// Owner of every live override chain, keyed by (facility bit, architecture).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideChains {
    chains: BTreeMap<(u16, Arch), Vec<InstructionOverrideRecord>>,
}

impl OverrideChains {
    /// Creates an empty set of chains.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while `bit` is suppressed in `arch`.
    #[must_use]
    pub fn is_suppressed(&self, bit: u16, arch: Arch) -> bool {
        self.chains.contains_key(&(bit, arch))
    }

    /// Records of the chain for `bit` in `arch`; empty when not suppressed.
    #[must_use]
    pub fn chain(&self, bit: u16, arch: Arch) -> &[InstructionOverrideRecord] {
        self.chains.get(&(bit, arch)).map_or(&[], Vec::as_slice)
    }

    /// Total number of live override records across all chains.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }

    /// Redirects every opcode of `facility` in `arch` to the stub.
    ///
    /// No-op when a chain already exists. Opcodes that already hold the stub
    /// are skipped so the stub is never captured as an original. Returns the
    /// number of records created.
    pub fn suppress<T>(&mut self, opcodes: &mut T, facility: &FacilityDescriptor, arch: Arch) -> usize
    where
        T: OpcodeTable + ?Sized,
    {
        let key = (facility.bit(), arch);
        if self.chains.contains_key(&key) {
            return 0;
        }

        let mut records = Vec::with_capacity(facility.opcodes().len());
        for entry in facility.opcodes() {
            if opcodes.handler(arch, entry.opcode).is_stub() {
                log::debug!(
                    "{arch}: {} ({}) already suppressed, not captured for {}",
                    entry.name,
                    entry.opcode,
                    facility.short_name()
                );
                continue;
            }
            let original_handler =
                opcodes.apply_override(arch, entry.opcode, Handler::FacilityNotAvailable);
            records.push(InstructionOverrideRecord {
                opcode: entry.opcode,
                arch,
                original_handler,
                display_name: entry.name,
            });
        }

        let created = records.len();
        log::debug!(
            "{arch}: suppressed {created} instruction(s) of {}",
            facility.short_name()
        );
        self.chains.insert(key, records);
        created
    }

    /// Reinstalls every handler captured for `facility` in `arch`.
    ///
    /// No-op when no chain exists. Returns the number of records released.
    pub fn restore<T>(&mut self, opcodes: &mut T, facility: &FacilityDescriptor, arch: Arch) -> usize
    where
        T: OpcodeTable + ?Sized,
    {
        let Some(records) = self.chains.remove(&(facility.bit(), arch)) else {
            return 0;
        };

        for record in &records {
            opcodes.apply_override(arch, record.opcode, record.original_handler);
        }
        log::debug!(
            "{arch}: restored {} instruction(s) of {}",
            records.len(),
            facility.short_name()
        );
        records.len()
    }

    /// Brings `facility`'s opcodes in line with its enabled state in `arch`.
    pub fn patch<T>(&mut self, opcodes: &mut T, facility: &FacilityDescriptor, arch: Arch, enabled: bool)
    where
        T: OpcodeTable + ?Sized,
    {
        if !facility.has_patcher() {
            return;
        }
        if enabled {
            self.restore(opcodes, facility, arch);
        } else {
            self.suppress(opcodes, facility, arch);
        }
    }
}
