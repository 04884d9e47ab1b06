//! Facility bit vector in the guest-visible store-facility-list layout.
//!
//! Bit `n` lives in byte `n / 8` under mask `0x80 >> (n % 8)`, so the byte
//! image can be stored into guest memory unchanged by `STFL`/`STFLE`.

use std::fmt;

/// Number of bytes in one facility list (bits `0..=223`).
pub const FACILITY_LIST_BYTES: usize = 28;

/// Number of addressable facility bits.
#[allow(clippy::cast_possible_truncation)]
pub const FACILITY_BIT_COUNT: u16 = 8 * FACILITY_LIST_BYTES as u16;

/// Bytes of the facility list stored by the basic `STFL` instruction.
pub const STFL_BYTES: usize = 4;

/// Returns `(byte_index, mask)` for a facility bit, or `None` when out of range.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn bit_position(bit: u16) -> Option<(usize, u8)> {
    if bit >= FACILITY_BIT_COUNT {
        return None;
    }
    Some(((bit / 8) as usize, (0x80u16 >> (bit % 8)) as u8))
}

/// Fixed-width facility bitmap for one architecture or one processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FacilityBits {
    bytes: [u8; FACILITY_LIST_BYTES],
}

impl FacilityBits {
    /// Creates an all-zero facility list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; FACILITY_LIST_BYTES],
        }
    }

    /// Wraps a raw store-facility-list byte image.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FACILITY_LIST_BYTES]) -> Self {
        Self { bytes }
    }

    /// Returns `true` when `bit` is set. Out-of-range bits read as clear.
    #[must_use]
    pub const fn is_set(&self, bit: u16) -> bool {
        match bit_position(bit) {
            Some((byte, mask)) => self.bytes[byte] & mask != 0,
            None => false,
        }
    }

    /// Sets or clears `bit`. Returns `false` (and changes nothing) when out of range.
    pub fn set(&mut self, bit: u16, value: bool) -> bool {
        let Some((byte, mask)) = bit_position(bit) else {
            return false;
        };
        if value {
            self.bytes[byte] |= mask;
        } else {
            self.bytes[byte] &= !mask;
        }
        true
    }

    /// Returns the raw byte image in hardware order.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FACILITY_LIST_BYTES] {
        &self.bytes
    }

    /// Returns the first word exactly as `STFL` stores it.
    #[must_use]
    pub const fn stfl_word(&self) -> [u8; STFL_BYTES] {
        [self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]
    }

    /// Number of doublewords `STFLE` needs to hold every set bit (at least one).
    #[must_use]
    pub fn stfle_doublewords(&self) -> usize {
        self.iter_set()
            .last()
            .map_or(1, |bit| usize::from(bit) / 64 + 1)
    }

    /// Iterates set bit numbers in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = u16> + '_ {
        (0..FACILITY_BIT_COUNT).filter(move |bit| self.is_set(*bit))
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.bytes.iter().map(|byte| byte.count_ones()).sum()
    }
}

/// Upper-case hex, one space-separated group per doubleword.
impl fmt::Display for FacilityBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, chunk) in self.bytes.chunks(8).enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            for byte in chunk {
                write!(f, "{byte:02X}")?;
            }
        }
        Ok(())
    }
}
