//! Startup configuration for [`crate::FacilityRegistry`].

use crate::{Arch, FacilityTarget};

/// Default number of configured processors.
pub const DEFAULT_PROCESSOR_COUNT: u16 = 1;

/// One startup facility statement, applied after initialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FacilityOverride {
    /// Facility to change.
    pub target: FacilityTarget,
    /// `true` to enable, `false` to disable.
    pub enable: bool,
    /// Architecture to change; the configured mode when `None`.
    pub arch: Option<Arch>,
}

impl FacilityOverride {
    /// Enable statement for the configured architecture mode.
    #[must_use]
    pub fn enable(target: impl Into<FacilityTarget>) -> Self {
        Self {
            target: target.into(),
            enable: true,
            arch: None,
        }
    }

    /// Disable statement for the configured architecture mode.
    #[must_use]
    pub fn disable(target: impl Into<FacilityTarget>) -> Self {
        Self {
            target: target.into(),
            enable: false,
            arch: None,
        }
    }

    /// Restricts the statement to `arch`.
    #[must_use]
    pub fn for_arch(mut self, arch: Arch) -> Self {
        self.arch = Some(arch);
        self
    }
}

/// Registry construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegistryConfig {
    /// Initial architecture mode.
    pub arch_mode: Arch,
    /// Number of processors to configure, addressed `0..processor_count`.
    pub processor_count: u16,
    /// Facility statements applied in order after initialization.
    pub facility_overrides: Vec<FacilityOverride>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            arch_mode: Arch::ZArch,
            processor_count: DEFAULT_PROCESSOR_COUNT,
            facility_overrides: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Default configuration in `arch` mode.
    #[must_use]
    pub fn for_arch(arch: Arch) -> Self {
        Self {
            arch_mode: arch,
            ..Self::default()
        }
    }

    /// Appends a facility statement.
    #[must_use]
    pub fn with_override(mut self, statement: FacilityOverride) -> Self {
        self.facility_overrides.push(statement);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{FacilityOverride, RegistryConfig, DEFAULT_PROCESSOR_COUNT};
    use crate::{Arch, FacilityTarget};

    #[test]
    fn default_config_is_one_zarch_processor() {
        let config = RegistryConfig::default();
        assert_eq!(config.arch_mode, Arch::ZArch);
        assert_eq!(config.processor_count, DEFAULT_PROCESSOR_COUNT);
        assert!(config.facility_overrides.is_empty());
    }

    #[test]
    fn statements_parse_their_targets() {
        let config = RegistryConfig::for_arch(Arch::Esa390)
            .with_override(FacilityOverride::disable("BIT17"))
            .with_override(FacilityOverride::enable("dfp").for_arch(Arch::ZArch));

        assert_eq!(config.facility_overrides[0].target, FacilityTarget::Bit(17));
        assert!(!config.facility_overrides[0].enable);
        assert_eq!(config.facility_overrides[1].arch, Some(Arch::ZArch));
    }
}
