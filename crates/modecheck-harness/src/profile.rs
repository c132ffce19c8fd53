//! What the harness expects each algorithm to accept.
//!
//! A profile is the per-algorithm data the matrix enumerates over. It states
//! the expected behavior independently of the transform under test, so a
//! transform that accepts or rejects something else is caught.

use modecheck_transform::{Algorithm, CipherConfiguration, CipherMode, KeySizes, PaddingMode};

use crate::plaintext::Plaintext;

const LEGAL_MODES: [CipherMode; 3] = [CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb];
const REJECTED_MODES: [CipherMode; 2] = [CipherMode::Ofb, CipherMode::Cts];

/// Per-algorithm parameter sets.
pub trait AlgorithmProfile: Send + Sync {
    /// Algorithm described.
    fn algorithm(&self) -> Algorithm;

    /// Legal key sizes in bits.
    fn key_sizes(&self) -> KeySizes;

    /// Legal block sizes in bits.
    fn block_sizes(&self) -> KeySizes;

    /// Modes a transform can be created in.
    fn cipher_modes(&self) -> &'static [CipherMode] {
        &LEGAL_MODES
    }

    /// Modes that must be rejected with `UnsupportedMode`.
    fn rejected_modes(&self) -> &'static [CipherMode] {
        &REJECTED_MODES
    }

    /// Padding modes exercised for every legal mode.
    fn supported_padding_modes(&self) -> &'static [PaddingMode] {
        &PaddingMode::ALL
    }

    /// CFB feedback sizes accepted for a `block_bits` block.
    fn feedback_size_range(&self, block_bits: usize) -> KeySizes;

    /// Transform block in bytes when it is not the cipher block.
    fn transform_block_size_override(&self, _config: &CipherConfiguration) -> Option<usize> {
        None
    }

    /// Plaintext families run against `config`.
    fn plaintexts(&self, _config: &CipherConfiguration) -> &'static [Plaintext] {
        &Plaintext::CANONICAL
    }
}

/// DES, TripleDES and RC2: 64-bit blocks and CFB with 8-bit feedback only.
#[derive(Clone, Copy, Debug)]
pub struct CspProfile {
    algorithm: Algorithm,
    key_sizes: KeySizes,
}

impl CspProfile {
    /// Single DES, 64-bit key.
    pub const fn des() -> Self {
        Self {
            algorithm: Algorithm::Des,
            key_sizes: KeySizes::new(64, 64, 0),
        }
    }

    /// Two- and three-key TripleDES.
    pub const fn triple_des() -> Self {
        Self {
            algorithm: Algorithm::TripleDes,
            key_sizes: KeySizes::new(128, 192, 64),
        }
    }

    /// RC2 with 40 to 128-bit keys.
    pub const fn rc2() -> Self {
        Self {
            algorithm: Algorithm::Rc2,
            key_sizes: KeySizes::new(40, 128, 8),
        }
    }
}

impl AlgorithmProfile for CspProfile {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn key_sizes(&self) -> KeySizes {
        self.key_sizes
    }

    fn block_sizes(&self) -> KeySizes {
        KeySizes::new(64, 64, 0)
    }

    fn feedback_size_range(&self, _block_bits: usize) -> KeySizes {
        KeySizes::new(8, 8, 0)
    }
}

/// Rijndael: independent 128/192/256-bit keys and blocks, CFB-n for every
/// whole-byte feedback up to the block, processed one feedback unit at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct RijndaelProfile;

const RIJNDAEL_CFB_PLAINTEXTS: [Plaintext; 3] = Plaintext::ALL;

impl AlgorithmProfile for RijndaelProfile {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rijndael
    }

    fn key_sizes(&self) -> KeySizes {
        KeySizes::new(128, 256, 64)
    }

    fn block_sizes(&self) -> KeySizes {
        KeySizes::new(128, 256, 64)
    }

    fn feedback_size_range(&self, block_bits: usize) -> KeySizes {
        KeySizes::new(8, block_bits, 8)
    }

    fn transform_block_size_override(&self, config: &CipherConfiguration) -> Option<usize> {
        match config.mode() {
            CipherMode::Cfb => config.feedback_size().map(|bits| bits / 8),
            _ => None,
        }
    }

    fn plaintexts(&self, config: &CipherConfiguration) -> &'static [Plaintext] {
        match config.mode() {
            CipherMode::Cfb => &RIJNDAEL_CFB_PLAINTEXTS,
            _ => &Plaintext::CANONICAL,
        }
    }
}

/// Bytes per transform block for `config` under `profile`.
pub fn transform_block_size(profile: &dyn AlgorithmProfile, config: &CipherConfiguration) -> usize {
    profile
        .transform_block_size_override(config)
        .unwrap_or_else(|| config.block_bytes())
}
