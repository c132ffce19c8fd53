//! Fixed plaintext families the vectors are computed against.

use core::fmt;
use core::str::FromStr;

use modecheck_transform::{CipherConfiguration, ConfigError};

/// One of the fixed plaintexts. The harness never encrypts anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Plaintext {
    /// Zero bytes, two cipher blocks long.
    Exact,
    /// Zero bytes, two and a half cipher blocks long.
    Partial,
    /// Bytes `0xFF, 0xFE, ..`, one transform block long.
    Descending,
}

/// Which `keys.txt` family keys a plaintext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// Per-combination literal keys, shared by `Exact` and `Partial`.
    Zero,
    /// All-zero key and IV.
    Descending,
}

impl Plaintext {
    /// Every family, in a fixed order.
    pub const ALL: [Plaintext; 3] = [Self::Exact, Self::Partial, Self::Descending];

    /// The two zero-filled families.
    pub const CANONICAL: [Plaintext; 2] = [Self::Exact, Self::Partial];

    /// Fixture name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Descending => "descending",
        }
    }

    /// Family whose key material encrypts this plaintext.
    pub const fn key_family(self) -> KeyFamily {
        match self {
            Self::Exact | Self::Partial => KeyFamily::Zero,
            Self::Descending => KeyFamily::Descending,
        }
    }

    /// Length in bytes for `config` with a `transform_block`-byte unit.
    pub fn len(self, config: &CipherConfiguration, transform_block: usize) -> usize {
        let block = config.block_bytes();
        match self {
            Self::Exact => 2 * block,
            Self::Partial => 2 * block + block / 2,
            Self::Descending => transform_block,
        }
    }

    /// The plaintext bytes.
    pub fn bytes(self, config: &CipherConfiguration, transform_block: usize) -> Vec<u8> {
        let len = self.len(config, transform_block);
        match self {
            Self::Exact | Self::Partial => vec![0u8; len],
            Self::Descending => (0..len).map(|i| 0xff - (i as u8)).collect(),
        }
    }

    /// Whether every byte is zero, which ECB invariants rely on.
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Exact | Self::Partial)
    }
}

impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Plaintext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "plaintext",
                value: s.to_string(),
            })
    }
}

impl FromStr for KeyFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Self::Zero),
            "descending" => Ok(Self::Descending),
            other => Err(ConfigError::UnknownName {
                kind: "key family",
                value: other.to_string(),
            }),
        }
    }
}
