//! Fixed registry of emulated architecture modes and their one-hot tags.

use std::fmt;
use std::str::FromStr;

use crate::FacilityError;

/// Number of architecture modes the core models.
pub const ARCH_COUNT: usize = 3;

bitflags::bitflags! {
    /// Set of architecture tags used by the supported/default/required masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ArchMask: u8 {
        /// System/370.
        const S370 = 1 << 0;
        /// ESA/390.
        const ESA390 = 1 << 1;
        /// z/Architecture.
        const ZARCH = 1 << 2;
    }
}

/// Emulated architecture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Arch {
    /// System/370.
    S370,
    /// Enterprise Systems Architecture/390.
    Esa390,
    /// z/Architecture.
    ZArch,
}

impl Arch {
    /// All architecture modes in index order.
    pub const ALL: [Self; ARCH_COUNT] = [Self::S370, Self::Esa390, Self::ZArch];

    /// Returns the dense index (`0..ARCH_COUNT`) used for per-architecture arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the one-hot tag for mask tests.
    #[must_use]
    pub const fn tag(self) -> ArchMask {
        match self {
            Self::S370 => ArchMask::S370,
            Self::Esa390 => ArchMask::ESA390,
            Self::ZArch => ArchMask::ZARCH,
        }
    }

    /// Returns the display name of the architecture.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::S370 => "S/370",
            Self::Esa390 => "ESA/390",
            Self::ZArch => "z/Arch",
        }
    }

    /// Converts a dense index back into an architecture mode.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::S370),
            1 => Some(Self::Esa390),
            2 => Some(Self::ZArch),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arch {
    type Err = FacilityError;

    /// Accepts the display names plus the usual `ARCHLVL` aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "S/370" | "S370" | "370" => Ok(Self::S370),
            "ESA/390" | "ESA390" | "390" => Ok(Self::Esa390),
            "Z/ARCH" | "ZARCH" | "Z/ARCHITECTURE" | "ESAME" | "Z900" => Ok(Self::ZArch),
            _ => Err(FacilityError::UnknownArchitecture(s.to_string())),
        }
    }
}

impl ArchMask {
    /// Returns `true` when `arch`'s tag is part of this mask.
    #[must_use]
    pub const fn includes(self, arch: Arch) -> bool {
        self.contains(arch.tag())
    }
}
