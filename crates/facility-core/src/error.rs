//! Error taxonomy for table construction, startup audit and facility changes.

use thiserror::Error;

use crate::Arch;

/// Edge kind of a violated dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DependencyKind {
    /// One facility needs another one enabled.
    Requires,
    /// Two facilities cannot be enabled together.
    Incompatible,
}

/// Rejection produced by a facility's dependency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("facility {facility} {} {conflicting}", self.relation())]
pub struct DependencyViolation {
    /// Facility whose change was evaluated.
    pub facility: &'static str,
    /// Facility that is missing or conflicting.
    pub conflicting: &'static str,
    /// Which edge was violated.
    pub kind: DependencyKind,
    /// `true` when the evaluated change was an enable.
    pub enabling: bool,
}

impl DependencyViolation {
    const fn relation(&self) -> &'static str {
        match (self.kind, self.enabling) {
            (DependencyKind::Requires, true) => "requires facility",
            (DependencyKind::Requires, false) => "is required by enabled facility",
            (DependencyKind::Incompatible, _) => "is incompatible with enabled facility",
        }
    }
}

/// Recoverable failure of a facility operation. State is unchanged when returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacilityError {
    /// Facility name or bit number is unknown.
    #[error("facility {0} not found")]
    NotFound(String),
    /// Guest has been IPLed; facility state is frozen for the run.
    #[error("facility settings cannot be changed after IPL")]
    Immutable,
    /// At least one processor is running.
    #[error("all processors must be stopped to change facility settings")]
    ProcessorsRunning,
    /// Facility is not available for the architecture.
    #[error("facility {facility} is not supported for {arch}")]
    Unsupported {
        /// Facility short name.
        facility: &'static str,
        /// Target architecture.
        arch: Arch,
    },
    /// Facility is mandatory for the architecture.
    #[error("facility {facility} is required for {arch} and cannot be disabled")]
    RequiredFacility {
        /// Facility short name.
        facility: &'static str,
        /// Target architecture.
        arch: Arch,
    },
    /// The dependency rule rejected the change.
    #[error("{arch}: {violation}")]
    DependencyViolation {
        /// Target architecture.
        arch: Arch,
        /// Rejection details.
        violation: DependencyViolation,
    },
    /// Startup audit failed; the emulator must not boot a guest.
    #[error("facility startup audit failed with {} problem(s)", .0.len())]
    StartupInconsistency(Vec<FatalError>),
    /// Processor id is not configured.
    #[error("processor {0} is not configured")]
    UnknownProcessor(u16),
    /// Architecture name did not parse.
    #[error("unknown architecture {0}")]
    UnknownArchitecture(String),
    /// Descriptor table construction failed.
    #[error(transparent)]
    Table(#[from] TableError),
}

impl FacilityError {
    /// Startup audit and table construction failures abort the process; the
    /// rest are reported and the run continues.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::StartupInconsistency(_) | Self::Table(_))
    }
}

/// One problem that stops startup initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// Guest has been IPLed; facility state is frozen for the run.
    #[error("facility state cannot be reinitialized after IPL")]
    Immutable,
    /// At least one processor is running.
    #[error("all processors must be stopped to initialize facility state")]
    ProcessorsRunning,
    /// `required` includes an architecture that `supported` does not.
    #[error("{arch}: facility {facility} is required but not supported")]
    RequiredNotSupported {
        /// Architecture being audited.
        arch: Arch,
        /// Facility short name.
        facility: &'static str,
    },
    /// `default` includes an architecture that `supported` does not.
    #[error("{arch}: facility {facility} is enabled by default but not supported")]
    DefaultNotSupported {
        /// Architecture being audited.
        arch: Arch,
        /// Facility short name.
        facility: &'static str,
    },
    /// A dependency rule rejects the default state.
    #[error("{arch}: default facility state is inconsistent: {violation}")]
    DependencyViolation {
        /// Architecture being audited.
        arch: Arch,
        /// Rejection details.
        violation: DependencyViolation,
    },
}

/// Descriptor table construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Canonical entries must be strictly ascending by bit number.
    #[error("canonical facility table is not strictly ascending at bit {bit}")]
    Unsorted {
        /// First offending bit.
        bit: u16,
    },
    /// Bit number does not fit the facility list.
    #[error("facility bit {bit} exceeds the facility list")]
    BitOutOfRange {
        /// Offending bit.
        bit: u16,
    },
    /// A partial table names a bit with no canonical descriptor.
    #[error("{arch} facility table names unknown bit {bit}")]
    UnknownBit {
        /// Architecture of the partial table.
        arch: Arch,
        /// Offending bit.
        bit: u16,
    },
    /// A dependency or bundle names a bit with no canonical descriptor.
    #[error("facility {facility} references unknown bit {bit}")]
    UnknownReference {
        /// Referencing facility.
        facility: &'static str,
        /// Offending bit.
        bit: u16,
    },
    /// Two facilities resolve to the same lookup name.
    #[error("facility name {name} is ambiguous")]
    DuplicateName {
        /// Lower-cased lookup key.
        name: String,
    },
}
