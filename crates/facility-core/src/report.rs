//! Read-only projections of facility state.

use std::fmt;

use crate::{
    Arch, FacilityBits, FacilityDescriptor, FacilityError, FacilityRegistry, FacilityTarget,
    OpcodeTable, STFL_BYTES,
};

/// Which facilities a report includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StatusFilter {
    /// Every visible facility.
    #[default]
    All,
    /// Only enabled facilities.
    Enabled,
    /// Only disabled facilities.
    Disabled,
}

/// Report ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ReportOrder {
    /// Ascending bit number.
    #[default]
    ByBit,
    /// Case-insensitive long name.
    ByLongName,
}

/// Report query options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct QueryMode {
    /// Inclusion filter.
    pub filter: StatusFilter,
    /// Row order.
    pub order: ReportOrder,
}

impl QueryMode {
    /// Mode with `filter`, ordered by bit.
    #[must_use]
    pub const fn filtered(filter: StatusFilter) -> Self {
        Self {
            filter,
            order: ReportOrder::ByBit,
        }
    }

    /// Returns this mode ordered by `order`.
    #[must_use]
    pub const fn ordered(mut self, order: ReportOrder) -> Self {
        self.order = order;
        self
    }
}

/// One facility's status in one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FacilityStatus {
    /// Architecture the status describes.
    pub arch: Arch,
    /// Facility bit number.
    pub bit: u16,
    /// Short name.
    pub short_name: &'static str,
    /// Descriptive name.
    pub long_name: &'static str,
    /// Supported on `arch`.
    pub supported: bool,
    /// Enabled by default on `arch`.
    pub default: bool,
    /// Mandatory on `arch`.
    pub required: bool,
    /// Currently enabled on `arch`.
    pub enabled: bool,
    /// Enabled state differs from the default.
    pub modified: bool,
}

impl FacilityStatus {
    const fn new(descriptor: &FacilityDescriptor, arch: Arch, state: &FacilityBits) -> Self {
        let enabled = state.is_set(descriptor.bit());
        let default = descriptor.is_default(arch) || descriptor.is_required(arch);
        Self {
            arch,
            bit: descriptor.bit(),
            short_name: descriptor.short_name(),
            long_name: descriptor.long_name(),
            supported: descriptor.is_supported(arch),
            default,
            required: descriptor.is_required(arch),
            enabled,
            modified: enabled != default,
        }
    }

    /// Supported, or enabled by force.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.supported || self.enabled
    }
}

/// `bit` then `S`/`D`/`R`/`E` flags, `*` when modified, then the names.
impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, letter: char| if set { letter } else { '.' };
        write!(
            f,
            "{:>3} {}{}{}{}{} {:<32} {}",
            self.bit,
            flag(self.supported, 'S'),
            flag(self.default, 'D'),
            flag(self.required, 'R'),
            flag(self.enabled, 'E'),
            if self.modified { '*' } else { ' ' },
            self.short_name,
            self.long_name
        )
    }
}

/// Facility list exactly as the store-facility-list instructions store it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawFacilityList {
    /// Architecture the list belongs to.
    pub arch: Arch,
    /// Facility list bytes.
    pub bits: FacilityBits,
}

impl RawFacilityList {
    /// Bytes stored at `0xC8` by `STFL`.
    #[must_use]
    pub const fn stfl_word(&self) -> [u8; STFL_BYTES] {
        self.bits.stfl_word()
    }

    /// Doublewords `STFLE` needs to store every set bit.
    #[must_use]
    pub fn doublewords(&self) -> usize {
        self.bits.stfle_doublewords()
    }
}

impl fmt::Display for RawFacilityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.arch, self.bits)
    }
}

impl<T: OpcodeTable> FacilityRegistry<T> {
    /// Status of one facility in `arch`, or in the current mode when `arch`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::NotFound`] when the target names no
    /// descriptor.
    pub fn query_facility(
        &self,
        target: &FacilityTarget,
        arch: Option<Arch>,
    ) -> Result<FacilityStatus, FacilityError> {
        let arch = arch.unwrap_or_else(|| self.arch_mode());
        self.table()
            .index_of(target)
            .and_then(|index| self.table().get(index))
            .map(|descriptor| FacilityStatus::new(descriptor, arch, self.state(arch)))
            .ok_or_else(|| FacilityError::NotFound(target.to_string()))
    }

    /// Status of every visible facility in `arch` matching `mode`.
    #[must_use]
    pub fn report(&self, arch: Option<Arch>, mode: QueryMode) -> Vec<FacilityStatus> {
        let arch = arch.unwrap_or_else(|| self.arch_mode());
        let state = self.state(arch);
        let mut rows: Vec<_> = self
            .table()
            .iter()
            .map(|descriptor| FacilityStatus::new(descriptor, arch, state))
            .filter(FacilityStatus::is_visible)
            .filter(|status| match mode.filter {
                StatusFilter::All => true,
                StatusFilter::Enabled => status.enabled,
                StatusFilter::Disabled => !status.enabled,
            })
            .collect();
        if mode.order == ReportOrder::ByLongName {
            rows.sort_by_cached_key(|status| status.long_name.to_ascii_lowercase());
        }
        rows
    }

    /// Raw facility list of `arch`, or of the current mode when `None`.
    #[must_use]
    pub fn raw_facility_list(&self, arch: Option<Arch>) -> RawFacilityList {
        let arch = arch.unwrap_or_else(|| self.arch_mode());
        RawFacilityList {
            arch,
            bits: *self.state(arch),
        }
    }
}
