//! Block representation helpers.

use crate::error::InvalidLength;

/// Largest Rijndael block in bytes (`Nb = 8`).
pub const MAX_BLOCK_BYTES: usize = 32;

/// Rijndael block length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockSize {
    /// 128-bit block (`Nb = 4`), identical to AES.
    Bits128,
    /// 192-bit block (`Nb = 6`).
    Bits192,
    /// 256-bit block (`Nb = 8`).
    Bits256,
}

impl BlockSize {
    /// Maps a length in bits to a block size.
    pub fn from_bits(bits: usize) -> Result<Self, InvalidLength> {
        match bits {
            128 => Ok(Self::Bits128),
            192 => Ok(Self::Bits192),
            256 => Ok(Self::Bits256),
            other => Err(InvalidLength::Block(other)),
        }
    }

    /// Block length in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        self.columns() * 4
    }

    /// Number of 32-bit state columns (`Nb`).
    #[inline]
    pub const fn columns(self) -> usize {
        match self {
            Self::Bits128 => 4,
            Self::Bits192 => 6,
            Self::Bits256 => 8,
        }
    }

    /// ShiftRows offsets for rows 0..4.
    #[inline]
    pub(crate) const fn shift_offsets(self) -> [usize; 4] {
        match self {
            Self::Bits128 | Self::Bits192 => [0, 1, 2, 3],
            Self::Bits256 => [0, 1, 3, 4],
        }
    }
}

/// XORs `rhs` into `dst` over their common length.
#[inline]
pub fn xor_in_place(dst: &mut [u8], rhs: &[u8]) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}
