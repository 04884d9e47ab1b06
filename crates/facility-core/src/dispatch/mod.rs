//! Opcode dispatch table and the handler identities it maps to.
//!
//! Instruction semantics live elsewhere; this table only answers which
//! handler an opcode reaches in a given architecture, and whether that
//! handler is the facility-not-available stub.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::{Arch, ArchMask, FacilityTable, ARCH_COUNT};

/// Facility-gated override chains.
pub mod patch;

pub use patch::{InstructionOverrideRecord, OverrideChains};

/// Opcode key: one-byte opcodes as `0x00XX`, extended opcodes as `0xXXYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(u16);

impl Opcode {
    /// One-byte opcode such as `1A` (`AR`).
    #[must_use]
    pub const fn primary(op: u8) -> Self {
        Self(op as u16)
    }

    /// Two-level opcode such as `B2 05` (`STCK`) or `C0 08` (`XIHF`).
    #[must_use]
    pub const fn extended(op: u8, ext: u8) -> Self {
        Self(((op as u16) << 8) | ext as u16)
    }

    /// Raw 16-bit key.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns `true` for two-level opcodes.
    #[must_use]
    pub const fn is_extended(self) -> bool {
        self.0 > 0xFF
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extended() {
            write!(f, "{:04X}", self.0)
        } else {
            write!(f, "{:02X}", self.0)
        }
    }
}

/// Declarative (opcode, mnemonic) pair owned by a facility or the base set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpcodeEntry {
    /// Opcode key.
    pub opcode: Opcode,
    /// Instruction mnemonic used as handler identity and in diagnostics.
    pub name: &'static str,
}

impl OpcodeEntry {
    /// Entry for a one-byte opcode.
    #[must_use]
    pub const fn primary(op: u8, name: &'static str) -> Self {
        Self {
            opcode: Opcode::primary(op),
            name,
        }
    }

    /// Entry for a two-level opcode.
    #[must_use]
    pub const fn extended(op: u8, ext: u8, name: &'static str) -> Self {
        Self {
            opcode: Opcode::extended(op, ext),
            name,
        }
    }
}

/// Identity of the routine an opcode dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Real instruction routine, identified by mnemonic.
    Instruction(&'static str),
    /// Shared stub installed while the owning facility is disabled.
    FacilityNotAvailable,
    /// Opcode has no routine in this architecture.
    Unassigned,
}

impl Handler {
    /// Returns `true` for the facility-not-available stub.
    #[must_use]
    pub const fn is_stub(self) -> bool {
        matches!(self, Self::FacilityNotAvailable)
    }
}

/// Program interruptions raised by dispatch itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u16)]
pub enum ProgramInterrupt {
    /// Unassigned or unavailable opcode.
    #[error("operation exception")]
    Operation = 0x0001,
}

impl ProgramInterrupt {
    /// Program-interruption code stored in the PSA.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Installer primitive for the live opcode table.
///
/// The same call installs an override and reverts it: the previous handler
/// it returns is what the caller passes back later.
pub trait OpcodeTable {
    /// Installs `handler` for `opcode` in `arch` and returns the previous handler.
    fn apply_override(&mut self, arch: Arch, opcode: Opcode, handler: Handler) -> Handler;

    /// Returns the handler currently installed for `opcode` in `arch`.
    fn handler(&self, arch: Arch, opcode: Opcode) -> Handler;

    /// Dispatches `opcode`, returning the routine's mnemonic.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramInterrupt::Operation`] for unassigned opcodes and for
    /// opcodes whose facility is disabled.
    fn execute(&self, arch: Arch, opcode: Opcode) -> Result<&'static str, ProgramInterrupt> {
        match self.handler(arch, opcode) {
            Handler::Instruction(name) => Ok(name),
            Handler::FacilityNotAvailable | Handler::Unassigned => {
                Err(ProgramInterrupt::Operation)
            }
        }
    }
}

/// Instructions present regardless of facility settings.
pub const BASE_INSTRUCTIONS: &[(ArchMask, OpcodeEntry)] = &[
    (ArchMask::all(), OpcodeEntry::primary(0x07, "BCR")),
    (ArchMask::all(), OpcodeEntry::primary(0x1A, "AR")),
    (ArchMask::all(), OpcodeEntry::primary(0x44, "EX")),
    (ArchMask::all(), OpcodeEntry::primary(0x47, "BC")),
    (ArchMask::all(), OpcodeEntry::primary(0x50, "ST")),
    (ArchMask::all(), OpcodeEntry::primary(0x58, "L")),
    (ArchMask::all(), OpcodeEntry::primary(0x5A, "A")),
    (ArchMask::all(), OpcodeEntry::primary(0x83, "DIAG")),
    (ArchMask::all(), OpcodeEntry::extended(0xB2, 0x05, "STCK")),
    (
        ArchMask::ESA390.union(ArchMask::ZARCH),
        OpcodeEntry::extended(0xB2, 0xB1, "STFL"),
    ),
    (ArchMask::ZARCH, OpcodeEntry::extended(0xE3, 0x04, "LG")),
    (ArchMask::ZARCH, OpcodeEntry::extended(0xEB, 0x04, "LMG")),
];

/// Built-in per-architecture dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchTable {
    tables: [BTreeMap<Opcode, Handler>; ARCH_COUNT],
}

impl DispatchTable {
    /// Creates an empty table in which every opcode is unassigned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates each architecture with the base set plus the opcodes of every
    /// facility supported there.
    #[must_use]
    pub fn for_facilities(facilities: &FacilityTable) -> Self {
        let mut table = Self::new();
        for arch in Arch::ALL {
            for (mask, entry) in BASE_INSTRUCTIONS {
                if mask.includes(arch) {
                    table.install(arch, *entry);
                }
            }
            for descriptor in facilities.iter().filter(|d| d.is_supported(arch)) {
                for entry in descriptor.opcodes() {
                    table.install(arch, *entry);
                }
            }
        }
        table
    }

    /// Installs the real routine for `entry`.
    pub fn install(&mut self, arch: Arch, entry: OpcodeEntry) {
        self.tables[arch.index()].insert(entry.opcode, Handler::Instruction(entry.name));
    }

    /// Number of opcodes with an installed handler in `arch`.
    #[must_use]
    pub fn len(&self, arch: Arch) -> usize {
        self.tables[arch.index()].len()
    }

    /// Returns `true` when `arch` has no installed handlers.
    #[must_use]
    pub fn is_empty(&self, arch: Arch) -> bool {
        self.tables[arch.index()].is_empty()
    }
}

impl OpcodeTable for DispatchTable {
    fn apply_override(&mut self, arch: Arch, opcode: Opcode, handler: Handler) -> Handler {
        let table = &mut self.tables[arch.index()];
        let previous = if handler == Handler::Unassigned {
            table.remove(&opcode)
        } else {
            table.insert(opcode, handler)
        };
        previous.unwrap_or(Handler::Unassigned)
    }

    fn handler(&self, arch: Arch, opcode: Opcode) -> Handler {
        self.tables[arch.index()]
            .get(&opcode)
            .copied()
            .unwrap_or(Handler::Unassigned)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        DispatchTable, Handler, Opcode, OpcodeEntry, OpcodeTable, ProgramInterrupt,
        BASE_INSTRUCTIONS,
    };
    use crate::{Arch, FacilityTable};

    #[test]
    fn opcode_keys_keep_one_and_two_level_forms_apart() {
        assert_eq!(Opcode::primary(0x1A).raw(), 0x001A);
        assert_eq!(Opcode::extended(0xB2, 0x05).raw(), 0xB205);
        assert!(!Opcode::primary(0xE8).is_extended());
        assert!(Opcode::extended(0x01, 0x0A).is_extended());
        assert_eq!(Opcode::primary(0x07).to_string(), "07");
        assert_eq!(Opcode::extended(0xC0, 0x08).to_string(), "C008");
    }

    #[test]
    fn base_instruction_set_has_unique_opcodes() {
        let opcodes: HashSet<_> = BASE_INSTRUCTIONS.iter().map(|(_, e)| e.opcode).collect();
        assert_eq!(opcodes.len(), BASE_INSTRUCTIONS.len());
    }

    #[test]
    fn apply_override_returns_previous_handler() {
        let mut table = DispatchTable::new();
        let stck = OpcodeEntry::extended(0xB2, 0x05, "STCK");
        table.install(Arch::ZArch, stck);

        let previous =
            table.apply_override(Arch::ZArch, stck.opcode, Handler::FacilityNotAvailable);
        assert_eq!(previous, Handler::Instruction("STCK"));
        assert_eq!(
            table.handler(Arch::ZArch, stck.opcode),
            Handler::FacilityNotAvailable
        );

        let stub = table.apply_override(Arch::ZArch, stck.opcode, previous);
        assert!(stub.is_stub());
        assert_eq!(table.execute(Arch::ZArch, stck.opcode), Ok("STCK"));
    }

    #[test]
    fn overrides_are_scoped_to_one_architecture() {
        let mut table = DispatchTable::new();
        let ar = OpcodeEntry::primary(0x1A, "AR");
        table.install(Arch::Esa390, ar);
        table.install(Arch::ZArch, ar);

        table.apply_override(Arch::Esa390, ar.opcode, Handler::FacilityNotAvailable);

        assert_eq!(
            table.execute(Arch::Esa390, ar.opcode),
            Err(ProgramInterrupt::Operation)
        );
        assert_eq!(table.execute(Arch::ZArch, ar.opcode), Ok("AR"));
    }

    #[test]
    fn stub_and_unassigned_raise_the_same_interruption() {
        let mut table = DispatchTable::new();
        let ar = OpcodeEntry::primary(0x1A, "AR");
        table.install(Arch::S370, ar);
        table.apply_override(Arch::S370, ar.opcode, Handler::FacilityNotAvailable);

        let stubbed = table.execute(Arch::S370, ar.opcode);
        let unassigned = table.execute(Arch::S370, Opcode::primary(0x00));
        assert_eq!(stubbed, unassigned);
        assert_eq!(ProgramInterrupt::Operation.code(), 0x0001);
    }

    #[test]
    fn reverting_to_unassigned_removes_the_entry() {
        let mut table = DispatchTable::new();
        let ar = OpcodeEntry::primary(0x1A, "AR");
        table.install(Arch::S370, ar);
        assert_eq!(table.len(Arch::S370), 1);

        table.apply_override(Arch::S370, ar.opcode, Handler::Unassigned);
        assert!(table.is_empty(Arch::S370));
    }

    #[test]
    fn built_in_table_only_carries_supported_facility_opcodes() {
        let facilities = FacilityTable::builtin().expect("built-in table merges");
        let table = DispatchTable::for_facilities(&facilities);

        let stfl = Opcode::extended(0xB2, 0xB1);
        assert_eq!(table.execute(Arch::S370, stfl), Err(ProgramInterrupt::Operation));
        assert_eq!(table.execute(Arch::Esa390, stfl), Ok("STFL"));

        let adtr = Opcode::extended(0xB3, 0xD2);
        assert_eq!(table.execute(Arch::ZArch, adtr), Ok("ADTR"));
        assert_eq!(table.execute(Arch::Esa390, adtr), Err(ProgramInterrupt::Operation));
    }
}
