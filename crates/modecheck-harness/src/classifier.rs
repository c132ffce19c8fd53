//! Classification of attempts that are expected to fail.

use modecheck_transform::{CipherConfiguration, PaddingMode};

use crate::driver::DriveError;
use crate::error::{CaseId, Failure};
use crate::matrix::RejectionReason;

/// Progress of one classified attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifierState {
    /// Nothing attempted yet.
    Ready,
    /// The attempt is running.
    Attempting,
    /// The attempt completed without error.
    Succeeded,
    /// The attempt failed with the anticipated reason.
    FailedExpected,
    /// The attempt failed with some other error.
    FailedUnexpected(DriveError),
}

impl ClassifierState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ready | Self::Attempting)
    }
}

/// Outcome of [`classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Failed as anticipated. The only passing verdict.
    FailedExpected,
    /// Succeeded where it had to fail: the implementation is too permissive.
    UnexpectedSuccess,
    /// Failed for another reason: the implementation is wrong or too strict.
    WrongErrorKind(DriveError),
}

impl Verdict {
    /// Whether the attempt behaved as anticipated.
    pub fn passed(&self) -> bool {
        matches!(self, Self::FailedExpected)
    }

    /// Converts a failing verdict into the case's [`Failure`].
    pub fn into_result(self, case: CaseId, expected: RejectionReason) -> Result<(), Failure> {
        match self {
            Self::FailedExpected => Ok(()),
            Self::UnexpectedSuccess => Err(Failure::UnexpectedSuccess { case, expected }),
            Self::WrongErrorKind(actual) => Err(Failure::WrongErrorKind {
                case,
                expected,
                actual,
            }),
        }
    }
}

/// Runs one attempt through `Ready -> Attempting -> terminal`.
#[derive(Debug)]
pub struct ExceptionClassifier {
    state: ClassifierState,
}

impl Default for ExceptionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionClassifier {
    /// A classifier in the `Ready` state.
    pub fn new() -> Self {
        Self {
            state: ClassifierState::Ready,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Runs `attempt` and records how it ended relative to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if this classifier already ran an attempt.
    pub fn classify<T, F>(&mut self, attempt: F, expected: RejectionReason) -> Verdict
    where
        F: FnOnce() -> Result<T, DriveError>,
    {
        assert_eq!(
            self.state,
            ClassifierState::Ready,
            "classifier already used"
        );
        self.state = ClassifierState::Attempting;
        let (state, verdict) = match attempt() {
            Ok(_) => (ClassifierState::Succeeded, Verdict::UnexpectedSuccess),
            Err(err) if err.kind().is_some_and(|kind| expected.matches(kind)) => {
                (ClassifierState::FailedExpected, Verdict::FailedExpected)
            }
            Err(err) => (
                ClassifierState::FailedUnexpected(err.clone()),
                Verdict::WrongErrorKind(err),
            ),
        };
        self.state = state;
        verdict
    }
}

/// Classifies one attempt with a fresh [`ExceptionClassifier`].
pub fn classify<T, F>(attempt: F, expected: RejectionReason) -> Verdict
where
    F: FnOnce() -> Result<T, DriveError>,
{
    ExceptionClassifier::new().classify(attempt, expected)
}

/// Transform-time rejection a legal configuration must raise for a
/// `plaintext_len`-byte input, if any.
///
/// Unpadded input has to be a whole number of transform blocks. The unit is
/// the feedback size for Rijndael CFB, so an input that every other
/// configuration rejects can be accepted there.
pub fn anticipated_failure(
    config: &CipherConfiguration,
    transform_block: usize,
    plaintext_len: usize,
) -> Option<RejectionReason> {
    (config.padding() == PaddingMode::None && plaintext_len % transform_block != 0)
        .then_some(RejectionReason::InsufficientFinalBlock)
}
