//! Aggregated results of a run.

use core::fmt;

use crate::error::Failure;
use crate::matrix::RejectionReason;

/// How a non-failing case ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseOutcome {
    /// All checks passed. `vector_checked` is false where no vector exists.
    Passed {
        /// Whether a known-answer vector was compared.
        vector_checked: bool,
    },
    /// The case failed with its anticipated rejection.
    Rejected(RejectionReason),
}

/// Counts and failures over a set of cases.
#[derive(Clone, Debug, Default)]
pub struct SuiteReport {
    cases: usize,
    passed: usize,
    rejected: usize,
    vectors_checked: usize,
    failures: Vec<Failure>,
}

impl SuiteReport {
    /// Adds one case result.
    pub fn record(&mut self, result: &Result<CaseOutcome, Failure>) {
        self.cases += 1;
        match result {
            Ok(CaseOutcome::Passed { vector_checked }) => {
                self.passed += 1;
                self.vectors_checked += usize::from(*vector_checked);
            }
            Ok(CaseOutcome::Rejected(_)) => self.rejected += 1,
            Err(failure) => self.failures.push(failure.clone()),
        }
    }

    /// Folds `other` into this report.
    pub fn merge(&mut self, other: SuiteReport) {
        self.cases += other.cases;
        self.passed += other.passed;
        self.rejected += other.rejected;
        self.vectors_checked += other.vectors_checked;
        self.failures.extend(other.failures);
    }

    /// Whether no case failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Cases run.
    pub fn cases(&self) -> usize {
        self.cases
    }

    /// Legal cases that passed every check.
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Cases that failed with their anticipated rejection.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Passed cases that were compared against a known-answer vector.
    pub fn vectors_checked(&self) -> usize {
        self.vectors_checked
    }

    /// Failures in the order they occurred.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cases: {} passed ({} against vectors), {} rejected as expected, {} failed",
            self.cases,
            self.passed,
            self.vectors_checked,
            self.rejected,
            self.failures.len()
        )
    }
}
