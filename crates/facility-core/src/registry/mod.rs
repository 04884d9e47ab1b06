//! Process-wide facility registry: per-architecture state, configured
//! processors, and the live opcode table the state gates.
//!
//! Every mutation takes `&mut self`. Facility changes are additionally
//! refused while any processor runs or once the guest has been IPLed.

use crate::dispatch::{OpcodeTable, OverrideChains, ProgramInterrupt};
use crate::{Arch, DispatchTable, FacilityBits, FacilityError, FacilityTable, Opcode};
use crate::{FacilityOverride, Processor, ProcessorState, RegistryConfig, ARCH_COUNT};

mod engine;
mod init;

/// Facility state, processors and opcode table for one emulator instance.
#[derive(Debug, Clone)]
pub struct FacilityRegistry<T: OpcodeTable = DispatchTable> {
    table: FacilityTable,
    states: [FacilityBits; ARCH_COUNT],
    processors: Vec<Processor>,
    opcodes: T,
    overrides: OverrideChains,
    arch_mode: Arch,
    ipled: bool,
}

impl FacilityRegistry {
    /// Builds the built-in tables, initializes facility state and applies the
    /// configured facility statements.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::StartupInconsistency`] when the startup audit
    /// fails, or the first error raised by a configured facility statement.
    pub fn new(config: &RegistryConfig) -> Result<Self, FacilityError> {
        let table = FacilityTable::builtin()?;
        let opcodes = DispatchTable::for_facilities(&table);
        let mut registry = Self::from_parts(table, opcodes, config);
        registry
            .initialize_facilities()
            .map_err(FacilityError::StartupInconsistency)?;
        registry.apply_overrides(&config.facility_overrides)?;
        Ok(registry)
    }
}

impl<T: OpcodeTable> FacilityRegistry<T> {
    /// Assembles an uninitialized registry around caller-supplied tables.
    ///
    /// Every facility bit starts clear; call
    /// [`FacilityRegistry::initialize_facilities`] before use.
    #[must_use]
    pub fn from_parts(table: FacilityTable, opcodes: T, config: &RegistryConfig) -> Self {
        let processors = (0..config.processor_count)
            .map(|id| Processor::new(id, config.arch_mode))
            .collect();
        Self {
            table,
            states: [FacilityBits::new(); ARCH_COUNT],
            processors,
            opcodes,
            overrides: OverrideChains::new(),
            arch_mode: config.arch_mode,
            ipled: false,
        }
    }

    /// Applies facility statements in order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first rejected statement; statements before
    /// it stay applied.
    pub fn apply_overrides(&mut self, statements: &[FacilityOverride]) -> Result<(), FacilityError> {
        for statement in statements {
            self.set_facility(&statement.target, statement.enable, statement.arch)
                .inspect_err(|err| {
                    log::error!("facility statement {} rejected: {err}", statement.target);
                })?;
        }
        Ok(())
    }

    /// Merged descriptor table.
    #[must_use]
    pub const fn table(&self) -> &FacilityTable {
        &self.table
    }

    /// Live opcode table.
    #[must_use]
    pub const fn opcodes(&self) -> &T {
        &self.opcodes
    }

    /// Live override chains.
    #[must_use]
    pub const fn overrides(&self) -> &OverrideChains {
        &self.overrides
    }

    /// Process-wide facility list for `arch`.
    #[must_use]
    pub const fn state(&self, arch: Arch) -> &FacilityBits {
        &self.states[arch.index()]
    }

    /// Returns `true` when `bit` is enabled in `arch`.
    #[must_use]
    pub const fn is_enabled(&self, bit: u16, arch: Arch) -> bool {
        self.states[arch.index()].is_set(bit)
    }

    /// Current architecture mode.
    #[must_use]
    pub const fn arch_mode(&self) -> Arch {
        self.arch_mode
    }

    /// Returns `true` once the guest has been IPLed.
    #[must_use]
    pub const fn is_ipled(&self) -> bool {
        self.ipled
    }

    /// Freezes facility state for the rest of the run.
    pub fn mark_ipled(&mut self) {
        if !self.ipled {
            log::info!("{}: guest IPLed, facility settings are now fixed", self.arch_mode);
        }
        self.ipled = true;
    }

    /// Configured processors, ordered by id.
    #[must_use]
    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    /// Processor with address `id`.
    #[must_use]
    pub fn processor(&self, id: u16) -> Option<&Processor> {
        self.processors.get(usize::from(id))
    }

    /// Configures one more stopped processor in the current mode.
    ///
    /// Returns its id, or `None` when every processor address is in use.
    pub fn add_processor(&mut self) -> Option<u16> {
        let id = u16::try_from(self.processors.len()).ok()?;
        let mut processor = Processor::new(id, self.arch_mode);
        processor.reset(self.arch_mode, &self.states[self.arch_mode.index()]);
        self.processors.push(processor);
        log::debug!("processor {id} added in {} mode", self.arch_mode);
        Some(id)
    }

    /// Starts or stops processor `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::UnknownProcessor`] for an unconfigured id.
    pub fn set_processor_running(&mut self, id: u16, running: bool) -> Result<(), FacilityError> {
        let processor = self
            .processors
            .get_mut(usize::from(id))
            .ok_or(FacilityError::UnknownProcessor(id))?;
        processor.set_state(if running {
            ProcessorState::Running
        } else {
            ProcessorState::Stopped
        });
        Ok(())
    }

    /// Returns `true` while any processor runs.
    #[must_use]
    pub fn any_running(&self) -> bool {
        self.processors.iter().any(Processor::is_running)
    }

    /// Resets processor `id` into `arch` with a fresh copy of that
    /// architecture's facility list.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::UnknownProcessor`] for an unconfigured id.
    pub fn refresh_processor_facilities(&mut self, id: u16, arch: Arch) -> Result<(), FacilityError> {
        let processor = self
            .processors
            .get_mut(usize::from(id))
            .ok_or(FacilityError::UnknownProcessor(id))?;
        processor.reset(arch, &self.states[arch.index()]);
        log::debug!("processor {id}: facility list refreshed for {arch}");
        Ok(())
    }

    /// Switches the architecture mode and resets every processor into it.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::ProcessorsRunning`] while any processor runs.
    pub fn set_arch_mode(&mut self, arch: Arch) -> Result<(), FacilityError> {
        if self.any_running() {
            return Err(FacilityError::ProcessorsRunning);
        }
        let state = &self.states[arch.index()];
        for processor in &mut self.processors {
            processor.reset(arch, state);
        }
        if self.arch_mode != arch {
            log::info!("architecture mode changed from {} to {arch}", self.arch_mode);
        }
        self.arch_mode = arch;
        Ok(())
    }

    /// Dispatches `opcode` in the current architecture mode.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramInterrupt::Operation`] for unassigned opcodes and for
    /// opcodes of disabled facilities.
    pub fn execute(&self, opcode: Opcode) -> Result<&'static str, ProgramInterrupt> {
        self.opcodes.execute(self.arch_mode, opcode)
    }
}

/// Copies `state` into every processor running in `arch`.
fn sync_processors(processors: &mut [Processor], arch: Arch, state: &FacilityBits) {
    for processor in processors.iter_mut().filter(|p| p.arch() == arch) {
        processor.reset(arch, state);
    }
}
