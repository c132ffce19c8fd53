//! Length validation errors.

use core::fmt;

/// A key or block length outside the 128/192/256-bit set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidLength {
    /// Key length in bytes.
    Key(usize),
    /// Block length in bits.
    Block(usize),
}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(len) => write!(f, "invalid Rijndael key length: {len} bytes"),
            Self::Block(bits) => write!(f, "invalid Rijndael block size: {bits} bits"),
        }
    }
}

impl std::error::Error for InvalidLength {}
