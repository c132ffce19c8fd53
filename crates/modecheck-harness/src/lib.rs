//! Conformance checks for streaming symmetric block-cipher transforms.
//!
//! The [`ConfigurationMatrix`] enumerates every legal configuration per
//! algorithm together with the configurations that must be refused. For each
//! legal case the [`ConformanceRunner`] encrypts a fixed plaintext twice, once
//! in whole blocks and once a byte at a time, compares both outputs to each
//! other and to the [`VectorRepository`], checks the structural
//! [`Invariant`]s, and decrypts back. Cases that must fail go through the
//! [`ExceptionClassifier`], which separates an anticipated rejection from a
//! wrong one and from an unexpected success.
//!
//! Transforms come from a [`TransformProvider`]; [`SymmetricProvider`]
//! serves the implementations in `modecheck-transform`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod classifier;
mod driver;
mod error;
mod invariant;
mod matrix;
mod plaintext;
pub mod profile;
mod report;
mod runner;
mod vectors;

pub use crate::classifier::{
    anticipated_failure, classify, ClassifierState, ExceptionClassifier, Verdict,
};
pub use crate::driver::{DriveError, DriveStrategy, TransformDriver};
pub use crate::error::{CaseId, Failure, FixtureError};
pub use crate::invariant::{
    check, check_equivalent, check_known_answer, check_round_trip, Check, ComparisonMask,
    Invariant, Violation,
};
pub use crate::matrix::{ConfigurationMatrix, RejectionReason};
pub use crate::plaintext::{KeyFamily, Plaintext};
pub use crate::profile::AlgorithmProfile;
pub use crate::report::{CaseOutcome, SuiteReport};
pub use crate::runner::{ConformanceRunner, RunOptions, SymmetricProvider, TransformProvider};
pub use crate::vectors::{Fixture, KeyMaterial, VectorRepository};
