//! Errors raised while constructing or running a transform.

use core::fmt;

use thiserror::Error;

use crate::config::{Algorithm, CipherMode, PaddingMode};

/// Errors raised by [`SymmetricAlgorithm`](crate::SymmetricAlgorithm) and
/// [`SymmetricTransform`](crate::SymmetricTransform).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Key size not in the algorithm's legal set.
    #[error("{algorithm} does not support a {bits}-bit key")]
    InvalidKeySize {
        /// Algorithm asked for.
        algorithm: Algorithm,
        /// Rejected key size.
        bits: usize,
    },

    /// Block size not in the algorithm's legal set.
    #[error("{algorithm} does not support a {bits}-bit block")]
    InvalidBlockSize {
        /// Algorithm asked for.
        algorithm: Algorithm,
        /// Rejected block size.
        bits: usize,
    },

    /// Mode of operation the algorithm does not implement.
    #[error("cipher mode {mode} is not valid for {algorithm}")]
    UnsupportedMode {
        /// Algorithm asked for.
        algorithm: Algorithm,
        /// Rejected mode.
        mode: CipherMode,
    },

    /// CFB feedback size the algorithm does not implement.
    #[error("{algorithm} does not support CFB with a {bits}-bit feedback")]
    UnsupportedFeedbackSize {
        /// Algorithm asked for.
        algorithm: Algorithm,
        /// Rejected feedback size.
        bits: usize,
    },

    /// Key bytes do not match the configured key size.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes.
        expected: usize,
        /// Actual key length provided.
        actual: usize,
    },

    /// IV bytes do not match the configured block size.
    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength {
        /// Expected IV length in bytes.
        expected: usize,
        /// Actual IV length provided.
        actual: usize,
    },

    /// Final input is not a whole number of blocks and cannot be padded.
    #[error("insufficient data for the final block: {length} bytes is not a multiple of {block_size}")]
    InsufficientFinalBlock {
        /// Bytes available at finalization.
        length: usize,
        /// Transform block size in bytes.
        block_size: usize,
    },

    /// Decrypted padding does not match its scheme.
    #[error("{padding} padding is invalid and cannot be removed")]
    InvalidPadding {
        /// Padding scheme that failed to validate.
        padding: PaddingMode,
    },

    /// Caller-supplied output slice cannot hold the processed blocks.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall {
        /// Bytes that would be written.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// The transform was used after its final block.
    #[error("transform already finalized")]
    Finalized,
}

/// Closed projection of [`TransformError`] used for classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TransformError::InvalidKeySize`].
    InvalidKeySize,
    /// See [`TransformError::InvalidBlockSize`].
    InvalidBlockSize,
    /// See [`TransformError::UnsupportedMode`].
    UnsupportedMode,
    /// See [`TransformError::UnsupportedFeedbackSize`].
    UnsupportedFeedbackSize,
    /// See [`TransformError::InvalidKeyLength`].
    InvalidKeyLength,
    /// See [`TransformError::InvalidIvLength`].
    InvalidIvLength,
    /// See [`TransformError::InsufficientFinalBlock`].
    InsufficientFinalBlock,
    /// See [`TransformError::InvalidPadding`].
    InvalidPadding,
    /// See [`TransformError::OutputTooSmall`].
    OutputTooSmall,
    /// See [`TransformError::Finalized`].
    Finalized,
}

impl TransformError {
    /// The error's kind, without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKeySize { .. } => ErrorKind::InvalidKeySize,
            Self::InvalidBlockSize { .. } => ErrorKind::InvalidBlockSize,
            Self::UnsupportedMode { .. } => ErrorKind::UnsupportedMode,
            Self::UnsupportedFeedbackSize { .. } => ErrorKind::UnsupportedFeedbackSize,
            Self::InvalidKeyLength { .. } => ErrorKind::InvalidKeyLength,
            Self::InvalidIvLength { .. } => ErrorKind::InvalidIvLength,
            Self::InsufficientFinalBlock { .. } => ErrorKind::InsufficientFinalBlock,
            Self::InvalidPadding { .. } => ErrorKind::InvalidPadding,
            Self::OutputTooSmall { .. } => ErrorKind::OutputTooSmall,
            Self::Finalized => ErrorKind::Finalized,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
