//! Facility descriptor table: compiled-in definitions merged with the
//! per-architecture partial tables into one canonical, bit-sorted table.

use std::fmt;

use crate::dispatch::OpcodeEntry;
use crate::{Arch, ArchMask, DependencyKind, DependencyViolation, FacilityBits, TableError};
use crate::{ARCH_COUNT, FACILITY_BIT_COUNT};

/// Per-architecture partial tables.
pub mod arch_tables;
/// Architecture-agnostic canonical definitions.
pub mod canonical;

pub use arch_tables::{ARCH_FACILITY_TABLES, ESA390_FACILITIES, S370_FACILITIES, ZARCH_FACILITIES};
pub use canonical::CANONICAL_FACILITIES;

/// Declarative cross-facility dependency edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyRule {
    /// Bits that must be enabled before this facility can be enabled.
    pub requires: &'static [u16],
    /// Bits that cannot be enabled together with this facility.
    pub incompatible: &'static [u16],
}

impl DependencyRule {
    /// Rule with only "requires" edges.
    #[must_use]
    pub const fn requires(bits: &'static [u16]) -> Self {
        Self {
            requires: bits,
            incompatible: &[],
        }
    }

    /// Rule with only "incompatible" edges.
    #[must_use]
    pub const fn incompatible(bits: &'static [u16]) -> Self {
        Self {
            requires: &[],
            incompatible: bits,
        }
    }
}

/// Architecture-agnostic facility definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityDef {
    /// Facility bit number.
    pub bit: u16,
    /// Short name, e.g. `042_DFP`.
    pub short_name: &'static str,
    /// Descriptive name.
    pub long_name: &'static str,
    /// Optional dependency edges.
    pub rule: Option<DependencyRule>,
    /// Opcodes gated by this facility.
    pub opcodes: &'static [OpcodeEntry],
    /// Facilities toggled together with this one, in enable order.
    pub bundle: &'static [u16],
}

impl FacilityDef {
    /// Definition with no rule, no opcodes and no bundle.
    #[must_use]
    pub const fn new(bit: u16, short_name: &'static str, long_name: &'static str) -> Self {
        Self {
            bit,
            short_name,
            long_name,
            rule: None,
            opcodes: &[],
            bundle: &[],
        }
    }

    /// Attaches a dependency rule.
    #[must_use]
    pub const fn with_rule(mut self, rule: DependencyRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Attaches the gated opcode list.
    #[must_use]
    pub const fn with_opcodes(mut self, opcodes: &'static [OpcodeEntry]) -> Self {
        self.opcodes = opcodes;
        self
    }

    /// Makes the definition a bundle of `members`.
    #[must_use]
    pub const fn with_bundle(mut self, members: &'static [u16]) -> Self {
        self.bundle = members;
        self
    }
}

/// One architecture's view of one facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialFacility {
    /// Facility bit number.
    pub bit: u16,
    /// Implementable on the architecture.
    pub supported: bool,
    /// Enabled by default.
    pub default: bool,
    /// Mandatory and immutable.
    pub required: bool,
}

impl PartialFacility {
    /// Entry with explicit flags.
    #[must_use]
    pub const fn new(bit: u16, supported: bool, default: bool, required: bool) -> Self {
        Self {
            bit,
            supported,
            default,
            required,
        }
    }

    /// Supported, disabled by default.
    #[must_use]
    pub const fn supported(bit: u16) -> Self {
        Self::new(bit, true, false, false)
    }

    /// Supported and enabled by default.
    #[must_use]
    pub const fn default_on(bit: u16) -> Self {
        Self::new(bit, true, true, false)
    }

    /// Supported, enabled and mandatory.
    #[must_use]
    pub const fn required(bit: u16) -> Self {
        Self::new(bit, true, true, true)
    }
}

/// Partial table contributed by one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchFacilityTable {
    /// Contributing architecture.
    pub arch: Arch,
    /// Entries for that architecture.
    pub entries: &'static [PartialFacility],
}

/// How a caller names a facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FacilityTarget {
    /// Short name, with or without its numeric prefix.
    Name(String),
    /// Explicit bit number; bypasses the supported check.
    Bit(u16),
}

impl FacilityTarget {
    /// Parses `BITnnn` or a bare decimal number as a bit, anything else as a name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let digits = trimmed
            .get(..3)
            .filter(|prefix| prefix.eq_ignore_ascii_case("bit"))
            .map_or(trimmed, |_| &trimmed[3..]);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(bit) = digits.parse() {
                return Self::Bit(bit);
            }
        }
        Self::Name(trimmed.to_string())
    }
}

impl From<u16> for FacilityTarget {
    fn from(bit: u16) -> Self {
        Self::Bit(bit)
    }
}

impl From<&str> for FacilityTarget {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for FacilityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Bit(bit) => write!(f, "BIT{bit}"),
        }
    }
}

/// Merged descriptor with combined architecture masks and resolved edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityDescriptor {
    def: FacilityDef,
    supported: ArchMask,
    default: ArchMask,
    required: ArchMask,
    requires: Vec<usize>,
    dependents: Vec<usize>,
    incompatible: Vec<usize>,
    bundle: Vec<usize>,
}

impl FacilityDescriptor {
    /// Facility bit number.
    #[must_use]
    pub const fn bit(&self) -> u16 {
        self.def.bit
    }

    /// Short name.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        self.def.short_name
    }

    /// Descriptive name.
    #[must_use]
    pub const fn long_name(&self) -> &'static str {
        self.def.long_name
    }

    /// Architectures the facility can be enabled on.
    #[must_use]
    pub const fn supported_mask(&self) -> ArchMask {
        self.supported
    }

    /// Architectures the facility is enabled on by default.
    #[must_use]
    pub const fn default_mask(&self) -> ArchMask {
        self.default
    }

    /// Architectures on which the facility cannot be disabled.
    #[must_use]
    pub const fn required_mask(&self) -> ArchMask {
        self.required
    }

    /// Supported on `arch`.
    #[must_use]
    pub const fn is_supported(&self, arch: Arch) -> bool {
        self.supported.includes(arch)
    }

    /// Enabled by default on `arch`.
    #[must_use]
    pub const fn is_default(&self, arch: Arch) -> bool {
        self.default.includes(arch)
    }

    /// Required on `arch`.
    #[must_use]
    pub const fn is_required(&self, arch: Arch) -> bool {
        self.required.includes(arch)
    }

    /// Declared dependency rule, if any.
    #[must_use]
    pub const fn rule(&self) -> Option<DependencyRule> {
        self.def.rule
    }

    /// `true` when any edge, own or derived, touches this facility.
    #[must_use]
    pub fn has_rule(&self) -> bool {
        !(self.requires.is_empty() && self.dependents.is_empty() && self.incompatible.is_empty())
    }

    /// Opcodes gated by the facility.
    #[must_use]
    pub const fn opcodes(&self) -> &'static [OpcodeEntry] {
        self.def.opcodes
    }

    /// `true` when the facility owns opcodes to patch.
    #[must_use]
    pub const fn has_patcher(&self) -> bool {
        !self.def.opcodes.is_empty()
    }

    /// `true` for pseudo-facilities that toggle other facilities.
    #[must_use]
    pub fn is_bundle(&self) -> bool {
        !self.bundle.is_empty()
    }

    /// Table indices of the bundle members, in enable order.
    #[must_use]
    pub fn bundle_members(&self) -> &[usize] {
        &self.bundle
    }
}

/// Canonical merged facility table, sorted by bit number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityTable {
    descriptors: Vec<FacilityDescriptor>,
    names: Vec<(String, usize)>,
}

impl FacilityTable {
    /// Merges the compiled-in canonical and per-architecture tables.
    ///
    /// # Errors
    ///
    /// Same checks as [`FacilityTable::from_parts`]; ordering and bit
    /// references of the compiled-in tables are also asserted at compile time.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_parts(CANONICAL_FACILITIES, &ARCH_FACILITY_TABLES)
    }

    /// Merges caller-supplied tables.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] for unsorted or out-of-range canonical bits,
    /// unknown bits in a partial table, rules or bundles naming unknown bits,
    /// and ambiguous lookup names.
    pub fn from_parts(
        canonical: &[FacilityDef],
        partials: &[ArchFacilityTable],
    ) -> Result<Self, TableError> {
        let mut descriptors: Vec<FacilityDescriptor> = Vec::with_capacity(canonical.len());
        for def in canonical {
            if def.bit >= FACILITY_BIT_COUNT {
                return Err(TableError::BitOutOfRange { bit: def.bit });
            }
            if descriptors.last().is_some_and(|prev| prev.bit() >= def.bit) {
                return Err(TableError::Unsorted { bit: def.bit });
            }
            descriptors.push(FacilityDescriptor {
                def: *def,
                supported: ArchMask::empty(),
                default: ArchMask::empty(),
                required: ArchMask::empty(),
                requires: Vec::new(),
                dependents: Vec::new(),
                incompatible: Vec::new(),
                bundle: Vec::new(),
            });
        }

        let find = |descriptors: &[FacilityDescriptor], bit: u16| {
            descriptors.binary_search_by_key(&bit, FacilityDescriptor::bit).ok()
        };

        for partial in partials {
            let tag = partial.arch.tag();
            for entry in partial.entries {
                let index = find(&descriptors, entry.bit).ok_or(TableError::UnknownBit {
                    arch: partial.arch,
                    bit: entry.bit,
                })?;
                let descriptor = &mut descriptors[index];
                if entry.supported {
                    descriptor.supported |= tag;
                }
                if entry.default {
                    descriptor.default |= tag;
                }
                if entry.required {
                    descriptor.required |= tag;
                }
            }
        }

        for index in 0..descriptors.len() {
            let def = descriptors[index].def;
            let resolve = |bit: u16| {
                find(&descriptors, bit).ok_or(TableError::UnknownReference {
                    facility: def.short_name,
                    bit,
                })
            };
            let bundle = def.bundle.iter().map(|bit| resolve(*bit)).collect::<Result<Vec<_>, _>>()?;
            let (requires, incompatible) = match def.rule {
                Some(rule) => (
                    rule.requires.iter().map(|bit| resolve(*bit)).collect::<Result<Vec<_>, _>>()?,
                    rule.incompatible.iter().map(|bit| resolve(*bit)).collect::<Result<Vec<_>, _>>()?,
                ),
                None => (Vec::new(), Vec::new()),
            };

            for &target in &requires {
                push_unique(&mut descriptors[target].dependents, index);
            }
            for &other in &incompatible {
                push_unique(&mut descriptors[other].incompatible, index);
                push_unique(&mut descriptors[index].incompatible, other);
            }
            for &required in &requires {
                push_unique(&mut descriptors[index].requires, required);
            }
            descriptors[index].bundle = bundle;
        }
        for descriptor in &mut descriptors {
            descriptor.dependents.sort_unstable();
            descriptor.incompatible.sort_unstable();
        }

        let mut names = Vec::with_capacity(descriptors.len() * 2);
        for (index, descriptor) in descriptors.iter().enumerate() {
            let full = descriptor.short_name().to_ascii_lowercase();
            if let Some(alias) = strip_bit_prefix(&full) {
                names.push((alias.to_string(), index));
            }
            names.push((full, index));
        }
        names.sort();
        if let Some(pair) = names.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(TableError::DuplicateName {
                name: pair[0].0.clone(),
            });
        }

        Ok(Self { descriptors, names })
    }

    /// Number of descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// `true` when the table has no descriptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in bit order.
    pub fn iter(&self) -> impl Iterator<Item = &FacilityDescriptor> + '_ {
        self.descriptors.iter()
    }

    /// Descriptor at table index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FacilityDescriptor> {
        self.descriptors.get(index)
    }

    /// Table index of `bit`.
    #[must_use]
    pub fn index_of_bit(&self, bit: u16) -> Option<usize> {
        self.descriptors
            .binary_search_by_key(&bit, FacilityDescriptor::bit)
            .ok()
    }

    /// Table index of a case-insensitive short name or prefix-less alias.
    #[must_use]
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        let key = name.to_ascii_lowercase();
        self.names
            .binary_search_by(|(entry, _)| entry.as_str().cmp(key.as_str()))
            .ok()
            .map(|position| self.names[position].1)
    }

    /// Descriptor for `bit`.
    #[must_use]
    pub fn by_bit(&self, bit: u16) -> Option<&FacilityDescriptor> {
        self.index_of_bit(bit).map(|index| &self.descriptors[index])
    }

    /// Descriptor for a short name or alias.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&FacilityDescriptor> {
        self.index_of_name(name).map(|index| &self.descriptors[index])
    }

    /// Table index for any target form.
    #[must_use]
    pub fn index_of(&self, target: &FacilityTarget) -> Option<usize> {
        match target {
            FacilityTarget::Name(name) => self.index_of_name(name),
            FacilityTarget::Bit(bit) => self.index_of_bit(*bit),
        }
    }

    /// Evaluates the effective rule of the facility at `index` for a proposed
    /// value against `state`.
    ///
    /// Enabling checks the facility's own "requires" edges and both
    /// directions of "incompatible"; disabling checks every enabled facility
    /// that requires this one.
    ///
    /// # Errors
    ///
    /// Returns the first violated edge, in bit order.
    pub fn check_rule(
        &self,
        index: usize,
        enable: bool,
        state: &FacilityBits,
    ) -> Result<(), DependencyViolation> {
        let Some(descriptor) = self.descriptors.get(index) else {
            return Ok(());
        };
        let violation = |other: usize, kind| DependencyViolation {
            facility: descriptor.short_name(),
            conflicting: self.descriptors[other].short_name(),
            kind,
            enabling: enable,
        };
        let enabled = |other: usize| state.is_set(self.descriptors[other].bit());

        if enable {
            if let Some(&missing) = descriptor.requires.iter().find(|&&other| !enabled(other)) {
                return Err(violation(missing, DependencyKind::Requires));
            }
            if let Some(&conflict) = descriptor.incompatible.iter().find(|&&other| enabled(other)) {
                return Err(violation(conflict, DependencyKind::Incompatible));
            }
        } else if let Some(&dependent) = descriptor.dependents.iter().find(|&&other| enabled(other)) {
            return Err(violation(dependent, DependencyKind::Requires));
        }
        Ok(())
    }

    /// Per-architecture default bitmaps derived from the merged masks.
    #[must_use]
    pub fn default_states(&self) -> [FacilityBits; ARCH_COUNT] {
        let mut states = [FacilityBits::new(); ARCH_COUNT];
        for arch in Arch::ALL {
            for descriptor in &self.descriptors {
                if descriptor.is_supported(arch)
                    && (descriptor.is_required(arch) || descriptor.is_default(arch))
                {
                    states[arch.index()].set(descriptor.bit(), true);
                }
            }
        }
        states
    }
}

fn push_unique(list: &mut Vec<usize>, index: usize) {
    if !list.contains(&index) {
        list.push(index);
    }
}

/// `042_dfp` -> `dfp`; names without a numeric prefix have no alias.
fn strip_bit_prefix(name: &str) -> Option<&str> {
    let (prefix, rest) = name.split_once('_')?;
    (!prefix.is_empty() && !rest.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()))
        .then_some(rest)
}
