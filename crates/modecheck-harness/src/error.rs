//! Case failures and fixture errors.

use core::fmt;

use modecheck_transform::{CipherConfiguration, ConfigError, TransformError};
use thiserror::Error;

use crate::driver::DriveError;
use crate::invariant::Violation;
use crate::matrix::RejectionReason;
use crate::plaintext::Plaintext;

/// Identity of one test case: the full configuration tuple and plaintext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId {
    /// Configuration under test.
    pub config: CipherConfiguration,
    /// Plaintext family driven through it.
    pub plaintext: Plaintext,
}

impl CaseId {
    /// Case for `config` and `plaintext`.
    pub fn new(config: CipherConfiguration, plaintext: Plaintext) -> Self {
        Self { config, plaintext }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} plaintext={}]", self.config, self.plaintext)
    }
}

/// Terminal outcome of a failing case. Every variant names its case.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Failure {
    /// Ciphertext differs from the expected vector.
    #[error("{case} vector mismatch: {violation}")]
    VectorMismatch {
        /// Failing case.
        case: CaseId,
        /// Differing bytes.
        violation: Violation,
    },

    /// A structural property of the output does not hold.
    #[error("{case} invariant violated: {violation}")]
    InvariantViolation {
        /// Failing case.
        case: CaseId,
        /// Differing bytes.
        violation: Violation,
    },

    /// An attempt that had to fail succeeded.
    #[error("{case} expected {expected} but the attempt succeeded")]
    UnexpectedSuccess {
        /// Failing case.
        case: CaseId,
        /// Rejection that should have happened.
        expected: RejectionReason,
    },

    /// An attempt failed, but not with the anticipated reason.
    #[error("{case} expected {expected} but failed with: {actual}")]
    WrongErrorKind {
        /// Failing case.
        case: CaseId,
        /// Rejection that should have happened.
        expected: RejectionReason,
        /// What happened instead.
        actual: DriveError,
    },

    /// Decrypting the ciphertext did not recover the plaintext.
    #[error("{case} round trip mismatch: {violation}")]
    RoundTripMismatch {
        /// Failing case.
        case: CaseId,
        /// Differing bytes.
        violation: Violation,
    },

    /// A legal configuration was refused or failed mid-transform.
    #[error("{case} legal configuration failed: {source}")]
    Transform {
        /// Failing case.
        case: CaseId,
        /// Error raised by the transform.
        source: TransformError,
    },

    /// The driver could not drive the transform as configured.
    #[error("{case} {source}")]
    Drive {
        /// Failing case.
        case: CaseId,
        /// Driver error.
        source: DriveError,
    },

    /// The repository covers this group of cases but lacks this one.
    #[error("{case} has no expected vector")]
    MissingVector {
        /// Failing case.
        case: CaseId,
    },

    /// No key material is recorded for the case.
    #[error("{case} has no key material")]
    MissingKeyMaterial {
        /// Failing case.
        case: CaseId,
    },
}

impl Failure {
    /// The failing case.
    pub fn case(&self) -> &CaseId {
        match self {
            Self::VectorMismatch { case, .. }
            | Self::InvariantViolation { case, .. }
            | Self::UnexpectedSuccess { case, .. }
            | Self::WrongErrorKind { case, .. }
            | Self::RoundTripMismatch { case, .. }
            | Self::Transform { case, .. }
            | Self::Drive { case, .. }
            | Self::MissingVector { case }
            | Self::MissingKeyMaterial { case } => case,
        }
    }

    /// Failure from a drive of a legal case.
    pub(crate) fn from_drive(case: CaseId, err: DriveError) -> Self {
        match err {
            DriveError::Transform(source) => Self::Transform { case, source },
            other => Self::Drive {
                case,
                source: other,
            },
        }
    }
}

/// Malformed fixture content.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FixtureError {
    /// Wrong number of whitespace-separated fields.
    #[error("{file}:{line}: expected {expected} fields, found {found}")]
    Fields {
        /// Fixture file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// Fields per record.
        expected: usize,
        /// Fields on the line.
        found: usize,
    },

    /// A field that is not a decimal size.
    #[error("{file}:{line}: {value:?} is not a size in bits")]
    Number {
        /// Fixture file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// Offending field.
        value: String,
    },

    /// A field that is not valid hex.
    #[error("{file}:{line}: bad hex")]
    Hex {
        /// Fixture file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// Decoder error.
        #[source]
        source: hex::FromHexError,
    },

    /// A name or configuration that does not parse or validate.
    #[error("{file}:{line}: {source}")]
    Config {
        /// Fixture file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
        /// Parse or validation error.
        #[source]
        source: ConfigError,
    },

    /// A record repeating an earlier key.
    #[error("{file}:{line}: duplicate entry")]
    Duplicate {
        /// Fixture file name.
        file: &'static str,
        /// One-based line number.
        line: usize,
    },
}
