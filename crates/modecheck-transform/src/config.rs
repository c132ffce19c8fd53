//! Cipher configuration tuples and their enumerations.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Symmetric block algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// Single DES.
    Des,
    /// Triple DES in EDE form (two or three keys).
    TripleDes,
    /// RC2 with effective key bits equal to the key size.
    Rc2,
    /// Rijndael with 128/192/256-bit blocks.
    Rijndael,
}

impl Algorithm {
    /// Every algorithm, in a fixed order.
    pub const ALL: [Algorithm; 4] = [Self::Des, Self::TripleDes, Self::Rc2, Self::Rijndael];

    /// Canonical name, as used in fixtures and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Des => "DES",
            Self::TripleDes => "TripleDES",
            Self::Rc2 => "RC2",
            Self::Rijndael => "Rijndael",
        }
    }

    /// Key size used when none is configured.
    pub const fn default_key_size(self) -> usize {
        match self {
            Self::Des => 64,
            Self::TripleDes => 192,
            Self::Rc2 => 128,
            Self::Rijndael => 256,
        }
    }

    /// Block size used when none is configured.
    pub const fn default_block_size(self) -> usize {
        match self {
            Self::Des | Self::TripleDes | Self::Rc2 => 64,
            Self::Rijndael => 128,
        }
    }
}

/// Block cipher mode of operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CipherMode {
    /// Electronic codebook.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Cipher feedback with a configurable feedback size.
    Cfb,
    /// Output feedback. Never accepted by any algorithm here.
    Ofb,
    /// Ciphertext stealing. Never accepted by any algorithm here.
    Cts,
}

impl CipherMode {
    /// Every mode, in a fixed order.
    pub const ALL: [CipherMode; 5] = [Self::Ecb, Self::Cbc, Self::Cfb, Self::Ofb, Self::Cts];

    /// Canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ecb => "ECB",
            Self::Cbc => "CBC",
            Self::Cfb => "CFB",
            Self::Ofb => "OFB",
            Self::Cts => "CTS",
        }
    }

    /// Whether the feedback size participates in this mode.
    pub const fn uses_feedback(self) -> bool {
        matches!(self, Self::Cfb | Self::Ofb)
    }
}

/// Scheme used to extend the final block before encryption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaddingMode {
    /// No padding; input must be block aligned.
    None,
    /// Zero bytes up to the block boundary; not removed on decrypt.
    Zeros,
    /// Every pad byte holds the pad length.
    Pkcs7,
    /// Zero bytes followed by the pad length.
    AnsiX923,
    /// Random bytes followed by the pad length.
    Iso10126,
}

impl PaddingMode {
    /// Every padding mode, in a fixed order.
    pub const ALL: [PaddingMode; 5] = [
        Self::None,
        Self::Zeros,
        Self::Pkcs7,
        Self::AnsiX923,
        Self::Iso10126,
    ];

    /// Canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Zeros => "Zeros",
            Self::Pkcs7 => "PKCS7",
            Self::AnsiX923 => "ANSIX923",
            Self::Iso10126 => "ISO10126",
        }
    }

    /// Whether decryption strips the padding again.
    pub const fn is_removable(self) -> bool {
        matches!(self, Self::Pkcs7 | Self::AnsiX923 | Self::Iso10126)
    }
}

macro_rules! named_enum {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|candidate| candidate.name().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| ConfigError::UnknownName {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

named_enum!(Algorithm, "algorithm");
named_enum!(CipherMode, "cipher mode");
named_enum!(PaddingMode, "padding mode");

/// Structurally invalid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Key size is zero or not a whole number of bytes.
    #[error("key size {bits} bits is not a positive multiple of 8")]
    KeySize {
        /// Requested key size.
        bits: usize,
    },
    /// Block size is zero or not a whole number of bytes.
    #[error("block size {bits} bits is not a positive multiple of 8")]
    BlockSize {
        /// Requested block size.
        bits: usize,
    },
    /// Feedback size outside `8..=block` or not a whole number of bytes.
    #[error("feedback size {feedback} bits is invalid for a {block}-bit block")]
    FeedbackSize {
        /// Requested feedback size.
        feedback: usize,
        /// Block size it was checked against.
        block: usize,
    },
    /// A name that does not match any known value.
    #[error("unknown {kind}: {value:?}")]
    UnknownName {
        /// What was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Immutable (algorithm, key size, block size, mode, padding, feedback) tuple.
///
/// Identity is the whole tuple. The feedback size is only retained for modes
/// that use it, so an ECB configuration never differs from another ECB
/// configuration by an inert feedback value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CipherConfiguration {
    algorithm: Algorithm,
    key_bits: usize,
    block_bits: usize,
    mode: CipherMode,
    padding: PaddingMode,
    feedback_bits: Option<usize>,
}

impl CipherConfiguration {
    /// Starts a builder with the algorithm's default sizes, CBC and PKCS7.
    pub fn builder(algorithm: Algorithm) -> CipherConfigurationBuilder {
        CipherConfigurationBuilder {
            algorithm,
            key_bits: None,
            block_bits: None,
            mode: CipherMode::Cbc,
            padding: PaddingMode::Pkcs7,
            feedback_bits: None,
        }
    }

    /// Algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key size in bits.
    pub fn key_size(&self) -> usize {
        self.key_bits
    }

    /// Block size in bits.
    pub fn block_size(&self) -> usize {
        self.block_bits
    }

    /// Mode of operation.
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Padding mode.
    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// Feedback size in bits, present only for feedback modes.
    pub fn feedback_size(&self) -> Option<usize> {
        self.feedback_bits
    }

    /// Key length in bytes.
    pub fn key_bytes(&self) -> usize {
        self.key_bits / 8
    }

    /// Block (and IV) length in bytes.
    pub fn block_bytes(&self) -> usize {
        self.block_bits / 8
    }

    /// Copy of this configuration with a different padding.
    pub fn with_padding(&self, padding: PaddingMode) -> Self {
        Self { padding, ..*self }
    }
}

impl fmt::Display for CipherConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} key={} block={} {} {}",
            self.algorithm, self.key_bits, self.block_bits, self.mode, self.padding
        )?;
        if let Some(feedback) = self.feedback_bits {
            write!(f, " feedback={feedback}")?;
        }
        Ok(())
    }
}

/// Builder for [`CipherConfiguration`].
#[derive(Clone, Debug)]
pub struct CipherConfigurationBuilder {
    algorithm: Algorithm,
    key_bits: Option<usize>,
    block_bits: Option<usize>,
    mode: CipherMode,
    padding: PaddingMode,
    feedback_bits: Option<usize>,
}

impl CipherConfigurationBuilder {
    /// Key size in bits.
    pub fn key_size(mut self, bits: usize) -> Self {
        self.key_bits = Some(bits);
        self
    }

    /// Block size in bits.
    pub fn block_size(mut self, bits: usize) -> Self {
        self.block_bits = Some(bits);
        self
    }

    /// Mode of operation.
    pub fn mode(mut self, mode: CipherMode) -> Self {
        self.mode = mode;
        self
    }

    /// Padding mode.
    pub fn padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Feedback size in bits (defaults to 8 for feedback modes).
    pub fn feedback_size(mut self, bits: usize) -> Self {
        self.feedback_bits = Some(bits);
        self
    }

    /// Validates the tuple. Invalid sizes are rejected, never clamped.
    pub fn build(self) -> Result<CipherConfiguration, ConfigError> {
        let key_bits = self.key_bits.unwrap_or(self.algorithm.default_key_size());
        let block_bits = self
            .block_bits
            .unwrap_or(self.algorithm.default_block_size());
        if key_bits == 0 || key_bits % 8 != 0 {
            return Err(ConfigError::KeySize { bits: key_bits });
        }
        if block_bits == 0 || block_bits % 8 != 0 {
            return Err(ConfigError::BlockSize { bits: block_bits });
        }
        if let Some(feedback) = self.feedback_bits {
            if feedback < 8 || feedback % 8 != 0 || feedback > block_bits {
                return Err(ConfigError::FeedbackSize {
                    feedback,
                    block: block_bits,
                });
            }
        }
        let feedback_bits = self
            .mode
            .uses_feedback()
            .then(|| self.feedback_bits.unwrap_or(8));

        Ok(CipherConfiguration {
            algorithm: self.algorithm,
            key_bits,
            block_bits,
            mode: self.mode,
            padding: self.padding,
            feedback_bits,
        })
    }
}
