//! Emulated processor view of the facility state.

use crate::{Arch, FacilityBits};

/// Run state of one emulated processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ProcessorState {
    /// Not executing; facility settings may change.
    #[default]
    Stopped,
    /// Executing instructions.
    Running,
}

impl ProcessorState {
    /// Returns `true` while the processor executes.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// One configured processor and its private facility snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Processor {
    id: u16,
    arch: Arch,
    state: ProcessorState,
    facilities: FacilityBits,
}

impl Processor {
    /// Stopped processor with an empty facility list.
    #[must_use]
    pub const fn new(id: u16, arch: Arch) -> Self {
        Self {
            id,
            arch,
            state: ProcessorState::Stopped,
            facilities: FacilityBits::new(),
        }
    }

    /// Processor address.
    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// Architecture mode the processor runs in.
    #[must_use]
    pub const fn arch(&self) -> Arch {
        self.arch
    }

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> ProcessorState {
        self.state
    }

    /// Returns `true` while the processor executes.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Facility list the processor reports to the guest.
    #[must_use]
    pub const fn facilities(&self) -> &FacilityBits {
        &self.facilities
    }

    pub(crate) fn set_state(&mut self, state: ProcessorState) {
        self.state = state;
    }

    /// Switches to `arch` and takes a fresh copy of `facilities`.
    pub(crate) fn reset(&mut self, arch: Arch, facilities: &FacilityBits) {
        self.arch = arch;
        self.facilities = *facilities;
    }
}
