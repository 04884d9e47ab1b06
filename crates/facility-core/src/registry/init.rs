//! Startup initialization and audit of the facility state.

use crate::registry::FacilityRegistry;
use crate::{Arch, FatalError, OpcodeTable};

impl<T: OpcodeTable> FacilityRegistry<T> {
    /// Derives every architecture's default facility list, audits it, and
    /// brings the opcode table in line with it.
    ///
    /// Each architecture's list is rebuilt from scratch from the supported,
    /// default and required masks, so two calls yield identical state. The
    /// opcode table is only patched once the audit passes; every configured
    /// processor is then refreshed from its architecture's list.
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::Immutable`] once the guest has been IPLed and
    /// [`FatalError::ProcessorsRunning`] while any processor runs. Otherwise
    /// returns every problem found across all architectures, when a
    /// descriptor is required or default without being supported, or when a
    /// dependency rule rejects the derived state. Nothing changes on error.
    pub fn initialize_facilities(&mut self) -> Result<(), Vec<FatalError>> {
        if self.ipled {
            return Err(vec![FatalError::Immutable]);
        }
        if self.any_running() {
            return Err(vec![FatalError::ProcessorsRunning]);
        }

        let mut problems = Vec::new();

        for descriptor in self.table.iter() {
            for arch in Arch::ALL {
                if descriptor.is_required(arch) && !descriptor.is_supported(arch) {
                    problems.push(FatalError::RequiredNotSupported {
                        arch,
                        facility: descriptor.short_name(),
                    });
                }
                if descriptor.is_default(arch) && !descriptor.is_supported(arch) {
                    problems.push(FatalError::DefaultNotSupported {
                        arch,
                        facility: descriptor.short_name(),
                    });
                }
            }
        }

        let states = self.table.default_states();
        for arch in Arch::ALL {
            let state = &states[arch.index()];
            for (index, descriptor) in self.table.iter().enumerate() {
                if !state.is_set(descriptor.bit()) {
                    continue;
                }
                if let Err(violation) = self.table.check_rule(index, true, state) {
                    problems.push(FatalError::DependencyViolation { arch, violation });
                }
            }
        }

        if !problems.is_empty() {
            for problem in &problems {
                log::error!("{problem}");
            }
            return Err(problems);
        }
        self.states = states;

        for arch in Arch::ALL {
            let enabled = &self.states[arch.index()];
            for descriptor in self.table.iter().filter(|d| d.is_supported(arch)) {
                self.overrides.patch(
                    &mut self.opcodes,
                    descriptor,
                    arch,
                    enabled.is_set(descriptor.bit()),
                );
            }
            log::info!(
                "{arch}: {} facilities enabled, {} instruction(s) suppressed",
                enabled.count(),
                self.table
                    .iter()
                    .map(|d| self.overrides.chain(d.bit(), arch).len())
                    .sum::<usize>()
            );
        }

        for processor in &mut self.processors {
            let arch = processor.arch();
            processor.reset(arch, &self.states[arch.index()]);
        }
        Ok(())
    }
}
