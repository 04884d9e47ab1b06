//! Facility model and instruction gating for an S/370, ESA/390 and
//! z/Architecture emulator core.

/// Architecture modes and architecture tag sets.
pub mod arch;
pub use arch::{Arch, ArchMask, ARCH_COUNT};

/// Facility list bitmap in store-facility-list layout.
pub mod bits;
pub use bits::{bit_position, FacilityBits, FACILITY_BIT_COUNT, FACILITY_LIST_BYTES, STFL_BYTES};

/// Error taxonomy for table construction, startup audit and facility changes.
pub mod error;
pub use error::{DependencyKind, DependencyViolation, FacilityError, FatalError, TableError};

/// Facility descriptor definitions and the merged descriptor table.
pub mod table;
pub use table::{
    ArchFacilityTable, DependencyRule, FacilityDef, FacilityDescriptor, FacilityTable,
    FacilityTarget, PartialFacility, ARCH_FACILITY_TABLES, CANONICAL_FACILITIES,
};

/// Opcode dispatch table and facility-gated overrides.
pub mod dispatch;
pub use dispatch::{
    DispatchTable, Handler, InstructionOverrideRecord, Opcode, OpcodeEntry, OpcodeTable,
    OverrideChains, ProgramInterrupt, BASE_INSTRUCTIONS,
};

/// Emulated processors and their facility snapshots.
pub mod processor;
pub use processor::{Processor, ProcessorState};

/// Registry construction options.
pub mod config;
pub use config::{FacilityOverride, RegistryConfig, DEFAULT_PROCESSOR_COUNT};

/// Facility registry: startup, enable/disable engine and processor control.
pub mod registry;
pub use registry::FacilityRegistry;

/// Facility status reports and raw facility-list dumps.
pub mod report;
pub use report::{FacilityStatus, QueryMode, RawFacilityList, ReportOrder, StatusFilter};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
