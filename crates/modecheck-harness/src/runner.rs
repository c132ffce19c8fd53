//! Runs cases end to end: encrypt, compare, check, decrypt, compare.

use std::thread;

use modecheck_transform::{
    Algorithm, CipherConfiguration, CipherMode, CryptoTransform, Direction, SymmetricAlgorithm,
    TransformError,
};

use crate::classifier::{anticipated_failure, classify};
use crate::driver::{DriveError, DriveStrategy, TransformDriver};
use crate::error::{CaseId, Failure};
use crate::invariant::{
    check, check_equivalent, check_known_answer, check_round_trip, ComparisonMask, Invariant,
};
use crate::matrix::{ConfigurationMatrix, RejectionReason};
use crate::plaintext::Plaintext;
use crate::report::{CaseOutcome, SuiteReport};
use crate::vectors::{KeyMaterial, VectorRepository};

/// Materializes the transforms under test.
pub trait TransformProvider: Sync {
    /// A fresh encryptor or decryptor for `config`.
    fn create(
        &self,
        config: &CipherConfiguration,
        material: &KeyMaterial,
        direction: Direction,
    ) -> Result<Box<dyn CryptoTransform>, TransformError>;
}

/// Provider over the built-in [`SymmetricAlgorithm`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SymmetricProvider;

impl TransformProvider for SymmetricProvider {
    fn create(
        &self,
        config: &CipherConfiguration,
        material: &KeyMaterial,
        direction: Direction,
    ) -> Result<Box<dyn CryptoTransform>, TransformError> {
        let algorithm = SymmetricAlgorithm::new(*config)?;
        let transform = match direction {
            Direction::Encrypt => algorithm.create_encryptor(material.key(), material.iv())?,
            Direction::Decrypt => algorithm.create_decryptor(material.key(), material.iv())?,
        };
        Ok(Box::new(transform))
    }
}

/// Knobs for a run.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Worker threads for [`ConformanceRunner::run_matrix`]; algorithms are
    /// split between them.
    pub jobs: usize,
    /// Stop at the first failure.
    pub fail_fast: bool,
    /// Only run configurations in this mode.
    pub mode: Option<CipherMode>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            fail_fast: false,
            mode: None,
        }
    }
}

/// Drives every case of a [`ConfigurationMatrix`] against a provider.
pub struct ConformanceRunner<'a, P> {
    matrix: &'a ConfigurationMatrix,
    vectors: &'a VectorRepository,
    provider: P,
    options: RunOptions,
}

impl<'a, P: TransformProvider> ConformanceRunner<'a, P> {
    /// Runner with default options.
    pub fn new(matrix: &'a ConfigurationMatrix, vectors: &'a VectorRepository, provider: P) -> Self {
        Self {
            matrix,
            vectors,
            provider,
            options: RunOptions::default(),
        }
    }

    /// Replaces the run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs one legal configuration against one plaintext.
    ///
    /// Inputs the configuration must refuse (unpadded and unaligned) are
    /// classified instead of compared.
    pub fn run_case(
        &self,
        config: &CipherConfiguration,
        plaintext: Plaintext,
    ) -> Result<CaseOutcome, Failure> {
        let case = CaseId::new(*config, plaintext);
        let block = self.matrix.transform_block_size(config);
        let input = plaintext.bytes(config, block);
        let material = self.vectors.key_material(config, plaintext)?;

        if let Some(reason) = anticipated_failure(config, block, input.len()) {
            for strategy in [DriveStrategy::WholeBlock, DriveStrategy::ByteAtATime] {
                let encrypt = || self.drive(config, material, Direction::Encrypt, &input, strategy);
                classify(encrypt, reason).into_result(case, reason)?;
            }
            return Ok(CaseOutcome::Rejected(reason));
        }

        let encrypt = |strategy| {
            self.drive(config, material, Direction::Encrypt, &input, strategy)
                .map_err(|err| Failure::from_drive(case, err))
        };
        let whole = encrypt(DriveStrategy::WholeBlock)?;
        let bytewise = encrypt(DriveStrategy::ByteAtATime)?;
        let mask = ComparisonMask::for_ciphertext(config, block, input.len());
        check_equivalent(&whole, &bytewise, &mask)
            .map_err(|violation| Failure::InvariantViolation { case, violation })?;

        let vector_checked = self.vectors.covers(config, plaintext);
        if vector_checked {
            let expected = self.vectors.expected_ciphertext(config, plaintext)?;
            check_known_answer(expected, &whole, &mask)
                .map_err(|violation| Failure::VectorMismatch { case, violation })?;
        }

        for invariant in Invariant::applicable(config, plaintext) {
            check(invariant, &whole, block)
                .map_err(|violation| Failure::InvariantViolation { case, violation })?;
        }

        for strategy in [DriveStrategy::WholeBlock, DriveStrategy::ByteAtATime] {
            let recovered = self
                .drive(config, material, Direction::Decrypt, &whole, strategy)
                .map_err(|err| Failure::from_drive(case, err))?;
            check_round_trip(&input, &recovered, config.padding())
                .map_err(|violation| Failure::RoundTripMismatch { case, violation })?;
        }
        Ok(CaseOutcome::Passed { vector_checked })
    }

    /// Runs a configuration that must be refused at construction.
    pub fn run_illegal(
        &self,
        config: &CipherConfiguration,
        reason: RejectionReason,
    ) -> Result<CaseOutcome, Failure> {
        let case = CaseId::new(*config, Plaintext::Exact);
        let block = self.matrix.transform_block_size(config);
        let input = Plaintext::Exact.bytes(config, block);
        let material = self.vectors.key_material(config, Plaintext::Exact)?;
        let encrypt = || self.transform(config, material, Direction::Encrypt, &input);
        classify(encrypt, reason).into_result(case, reason)?;
        Ok(CaseOutcome::Rejected(reason))
    }

    /// Decrypts a ciphertext whose padding block was damaged; it must be
    /// refused with [`RejectionReason::InvalidPadding`] under both call
    /// patterns.
    pub fn run_tampered(&self, config: &CipherConfiguration) -> Result<CaseOutcome, Failure> {
        let reason = RejectionReason::InvalidPadding;
        let case = CaseId::new(*config, Plaintext::Exact);
        let block = self.matrix.transform_block_size(config);
        let input = Plaintext::Exact.bytes(config, block);
        let material = self.vectors.key_material(config, Plaintext::Exact)?;
        let mut ciphertext = self
            .transform(config, material, Direction::Encrypt, &input)
            .map_err(|err| Failure::from_drive(case, err))?;
        // Lands on the padding block's second-to-last byte: filler, never the count.
        if let Some(at) = ciphertext.len().checked_sub(block + 2) {
            ciphertext[at] ^= 0x01;
        }
        for strategy in [DriveStrategy::WholeBlock, DriveStrategy::ByteAtATime] {
            let decrypt = || self.drive(config, material, Direction::Decrypt, &ciphertext, strategy);
            classify(decrypt, reason).into_result(case, reason)?;
        }
        Ok(CaseOutcome::Rejected(reason))
    }

    /// Runs every legal, illegal and tampered case of one algorithm.
    pub fn run_algorithm(&self, algorithm: Algorithm) -> SuiteReport {
        let span = tracing::info_span!("suite", %algorithm);
        let _enter = span.enter();
        let mut report = SuiteReport::default();
        let Some(profile) = self.matrix.profile(algorithm) else {
            tracing::warn!("algorithm not covered by the matrix");
            return report;
        };
        let selected = |config: &CipherConfiguration| {
            self.options.mode.map_or(true, |mode| config.mode() == mode)
        };

        for config in self.matrix.legal_configurations(algorithm) {
            if !selected(&config) {
                continue;
            }
            for &plaintext in profile.plaintexts(&config) {
                let result = self.run_case(&config, plaintext);
                if self.record(&mut report, CaseId::new(config, plaintext), result) {
                    return report;
                }
            }
        }
        for (config, reason) in self.matrix.illegal_configurations(algorithm) {
            if !selected(&config) {
                continue;
            }
            let result = self.run_illegal(&config, reason);
            if self.record(&mut report, CaseId::new(config, Plaintext::Exact), result) {
                return report;
            }
        }
        for config in self.matrix.tampered_configurations(algorithm) {
            if !selected(&config) {
                continue;
            }
            let result = self.run_tampered(&config);
            if self.record(&mut report, CaseId::new(config, Plaintext::Exact), result) {
                return report;
            }
        }
        tracing::info!(%report, "suite finished");
        report
    }

    /// Runs every algorithm of the matrix, in matrix order.
    pub fn run_matrix(&self) -> SuiteReport {
        let algorithms: Vec<Algorithm> = self.matrix.algorithms().collect();
        let jobs = self.options.jobs.clamp(1, algorithms.len().max(1));
        let mut report = SuiteReport::default();
        if jobs == 1 {
            for algorithm in algorithms {
                report.merge(self.run_algorithm(algorithm));
                if self.options.fail_fast && !report.is_success() {
                    break;
                }
            }
            return report;
        }

        let per_worker = algorithms.len().div_ceil(jobs);
        let reports: Vec<SuiteReport> = thread::scope(|scope| {
            let workers: Vec<_> = algorithms
                .chunks(per_worker)
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut report = SuiteReport::default();
                        for &algorithm in chunk {
                            report.merge(self.run_algorithm(algorithm));
                        }
                        report
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });
        for part in reports {
            report.merge(part);
        }
        report
    }

    /// Records `result`; true when the run should stop.
    fn record(
        &self,
        report: &mut SuiteReport,
        case: CaseId,
        result: Result<CaseOutcome, Failure>,
    ) -> bool {
        match &result {
            Ok(outcome) => tracing::debug!(%case, ?outcome, "case passed"),
            Err(failure) => tracing::warn!(%failure, "case failed"),
        }
        report.record(&result);
        self.options.fail_fast && result.is_err()
    }

    fn drive(
        &self,
        config: &CipherConfiguration,
        material: &KeyMaterial,
        direction: Direction,
        input: &[u8],
        strategy: DriveStrategy,
    ) -> Result<Vec<u8>, DriveError> {
        let mut transform = self.provider.create(config, material, direction)?;
        let block = self.matrix.transform_block_size(config);
        TransformDriver::new(block, strategy).drive(transform.as_mut(), input)
    }

    fn transform(
        &self,
        config: &CipherConfiguration,
        material: &KeyMaterial,
        direction: Direction,
        input: &[u8],
    ) -> Result<Vec<u8>, DriveError> {
        self.drive(config, material, direction, input, DriveStrategy::WholeBlock)
    }
}
