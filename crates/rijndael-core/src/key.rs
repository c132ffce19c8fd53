//! Key types for Rijndael.

use crate::block::BlockSize;
use crate::error::InvalidLength;

/// Rijndael key of 16, 24 or 32 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RijndaelKey {
    bytes: [u8; 32],
    len: usize,
}

impl RijndaelKey {
    /// Copies a key from a slice of 16, 24 or 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, InvalidLength> {
        match key.len() {
            16 | 24 | 32 => {
                let mut bytes = [0u8; 32];
                bytes[..key.len()].copy_from_slice(key);
                Ok(Self {
                    bytes,
                    len: key.len(),
                })
            }
            other => Err(InvalidLength::Key(other)),
        }
    }

    /// Key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of 32-bit key words (`Nk`).
    #[inline]
    pub fn words(&self) -> usize {
        self.len / 4
    }
}

impl From<[u8; 16]> for RijndaelKey {
    fn from(value: [u8; 16]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&value);
        Self { bytes, len: 16 }
    }
}

impl TryFrom<&[u8]> for RijndaelKey {
    type Error = InvalidLength;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(value)
    }
}

/// Expanded round keys for one (key, block) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundKeys {
    pub(crate) bytes: Vec<u8>,
    pub(crate) block: BlockSize,
    pub(crate) rounds: usize,
}

impl RoundKeys {
    /// Returns the round key at the requested index (`0..=rounds`).
    #[inline]
    pub fn get(&self, round: usize) -> &[u8] {
        let len = self.block.bytes();
        &self.bytes[round * len..(round + 1) * len]
    }

    /// Number of rounds (`Nr = max(Nk, Nb) + 6`).
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Block length these round keys were expanded for.
    #[inline]
    pub fn block_size(&self) -> BlockSize {
        self.block
    }
}
