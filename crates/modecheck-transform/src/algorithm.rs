//! Per-algorithm legal parameter sets and transform construction.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::config::{Algorithm, CipherConfiguration, CipherMode};
use crate::error::TransformError;
use crate::mode::ModeEngine;
use crate::primitive::new_primitive;
use crate::transform::{Direction, SymmetricTransform};

/// Inclusive range of legal sizes in bits, stepping by `skip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySizes {
    /// Smallest legal size.
    pub min: usize,
    /// Largest legal size.
    pub max: usize,
    /// Step between legal sizes; zero when `min == max`.
    pub skip: usize,
}

impl KeySizes {
    /// A range `min..=max` stepping by `skip`.
    pub const fn new(min: usize, max: usize, skip: usize) -> Self {
        Self { min, max, skip }
    }

    /// Whether `bits` is one of the legal sizes.
    pub fn contains(&self, bits: usize) -> bool {
        if bits < self.min || bits > self.max {
            return false;
        }
        if self.skip == 0 {
            return bits == self.min;
        }
        (bits - self.min) % self.skip == 0
    }

    /// Every legal size, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        let step = self.skip.max(1);
        let end = if self.skip == 0 { self.min } else { self.max };
        (self.min..=end).step_by(step)
    }
}

impl Algorithm {
    /// Key sizes accepted by [`SymmetricAlgorithm::new`].
    pub const fn legal_key_sizes(self) -> KeySizes {
        match self {
            Self::Des => KeySizes::new(64, 64, 0),
            Self::TripleDes => KeySizes::new(128, 192, 64),
            Self::Rc2 => KeySizes::new(40, 128, 8),
            Self::Rijndael => KeySizes::new(128, 256, 64),
        }
    }

    /// Block sizes accepted by [`SymmetricAlgorithm::new`].
    pub const fn legal_block_sizes(self) -> KeySizes {
        match self {
            Self::Des | Self::TripleDes | Self::Rc2 => KeySizes::new(64, 64, 0),
            Self::Rijndael => KeySizes::new(128, 256, 64),
        }
    }

    /// Whether a transform can be created in `mode`. OFB and CTS never can.
    pub const fn supports_mode(self, mode: CipherMode) -> bool {
        matches!(mode, CipherMode::Ecb | CipherMode::Cbc | CipherMode::Cfb)
    }

    /// CFB feedback sizes accepted for a `block_bits` block.
    pub const fn feedback_sizes(self, block_bits: usize) -> KeySizes {
        match self {
            Self::Des | Self::TripleDes | Self::Rc2 => KeySizes::new(8, 8, 0),
            Self::Rijndael => KeySizes::new(8, block_bits, 8),
        }
    }
}

impl CipherConfiguration {
    /// Bytes consumed per transform block.
    ///
    /// The cipher block, except for Rijndael in CFB where the feedback size
    /// is the unit.
    pub fn transform_block_bytes(&self) -> usize {
        match (self.algorithm(), self.mode(), self.feedback_size()) {
            (Algorithm::Rijndael, CipherMode::Cfb, Some(feedback)) => feedback / 8,
            _ => self.block_bytes(),
        }
    }
}

/// A validated configuration that can mint encryptors and decryptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymmetricAlgorithm {
    config: CipherConfiguration,
}

impl SymmetricAlgorithm {
    /// Checks `config` against the algorithm's legal sizes and modes.
    pub fn new(config: CipherConfiguration) -> Result<Self, TransformError> {
        let algorithm = config.algorithm();
        if !algorithm.legal_key_sizes().contains(config.key_size()) {
            return Err(TransformError::InvalidKeySize {
                algorithm,
                bits: config.key_size(),
            });
        }
        if !algorithm.legal_block_sizes().contains(config.block_size()) {
            return Err(TransformError::InvalidBlockSize {
                algorithm,
                bits: config.block_size(),
            });
        }
        if !algorithm.supports_mode(config.mode()) {
            return Err(TransformError::UnsupportedMode {
                algorithm,
                mode: config.mode(),
            });
        }
        if let Some(feedback) = config.feedback_size() {
            if !algorithm.feedback_sizes(config.block_size()).contains(feedback) {
                return Err(TransformError::UnsupportedFeedbackSize {
                    algorithm,
                    bits: feedback,
                });
            }
        }
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &CipherConfiguration {
        &self.config
    }

    /// Encryptor with an entropy-seeded filler RNG.
    pub fn create_encryptor(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform, TransformError> {
        self.create(Direction::Encrypt, key, iv, default_rng())
    }

    /// Decryptor for `key` and `iv`.
    pub fn create_decryptor(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform, TransformError> {
        self.create(Direction::Decrypt, key, iv, default_rng())
    }

    /// Encryptor drawing ISO10126 filler from `rng`.
    pub fn create_encryptor_with_rng<R>(
        &self,
        key: &[u8],
        iv: &[u8],
        rng: R,
    ) -> Result<SymmetricTransform, TransformError>
    where
        R: RngCore + Send + 'static,
    {
        self.create(Direction::Encrypt, key, iv, Box::new(rng))
    }

    /// Decryptor; the RNG is unused but accepted for symmetry.
    pub fn create_decryptor_with_rng<R>(
        &self,
        key: &[u8],
        iv: &[u8],
        rng: R,
    ) -> Result<SymmetricTransform, TransformError>
    where
        R: RngCore + Send + 'static,
    {
        self.create(Direction::Decrypt, key, iv, Box::new(rng))
    }

    fn create(
        &self,
        direction: Direction,
        key: &[u8],
        iv: &[u8],
        rng: Box<dyn RngCore + Send>,
    ) -> Result<SymmetricTransform, TransformError> {
        let config = &self.config;
        if key.len() != config.key_bytes() {
            return Err(TransformError::InvalidKeyLength {
                expected: config.key_bytes(),
                actual: key.len(),
            });
        }
        // Checked for ECB as well, where the IV is otherwise unused.
        if iv.len() != config.block_bytes() {
            return Err(TransformError::InvalidIvLength {
                expected: config.block_bytes(),
                actual: iv.len(),
            });
        }

        let primitive = new_primitive(config, key)?;
        let engine = match config.mode() {
            CipherMode::Ecb => ModeEngine::ecb(primitive),
            CipherMode::Cbc => ModeEngine::cbc(primitive, iv),
            CipherMode::Cfb => {
                let feedback = config.feedback_size().unwrap_or(8);
                ModeEngine::cfb(primitive, iv, feedback / 8)
            }
            mode => {
                return Err(TransformError::UnsupportedMode {
                    algorithm: config.algorithm(),
                    mode,
                })
            }
        };

        tracing::debug!(%config, ?direction, "created transform");
        Ok(SymmetricTransform::new(
            engine,
            direction,
            config.padding(),
            config.transform_block_bytes(),
            rng,
        ))
    }
}

fn default_rng() -> Box<dyn RngCore + Send> {
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    Box::new(ChaCha20Rng::from_seed(seed))
}
