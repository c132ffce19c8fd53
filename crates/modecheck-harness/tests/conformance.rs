use modecheck_harness::{
    classify, CaseOutcome, ConfigurationMatrix, ConformanceRunner, DriveError, DriveStrategy,
    Failure, KeyMaterial, Plaintext, RejectionReason, RunOptions, SymmetricProvider,
    TransformDriver, TransformProvider, VectorRepository, Verdict,
};
use modecheck_transform::{
    Algorithm, CipherConfiguration, CipherMode, CryptoTransform, Direction, PaddingMode,
    TransformError,
};

fn repository() -> &'static VectorRepository {
    VectorRepository::standard().expect("embedded fixtures parse")
}

fn runner<P: TransformProvider>(provider: P) -> ConformanceRunner<'static, P> {
    ConformanceRunner::new(ConfigurationMatrix::standard(), repository(), provider)
}

fn des(mode: CipherMode, padding: PaddingMode) -> CipherConfiguration {
    CipherConfiguration::builder(Algorithm::Des)
        .mode(mode)
        .padding(padding)
        .build()
        .expect("valid")
}

fn expected_cases(matrix: &ConfigurationMatrix) -> usize {
    matrix
        .algorithms()
        .map(|algorithm| {
            let profile = matrix.profile(algorithm).expect("profile");
            let legal: usize = matrix
                .legal_configurations(algorithm)
                .iter()
                .map(|config| profile.plaintexts(config).len())
                .sum();
            legal
                + matrix.illegal_configurations(algorithm).len()
                + matrix.tampered_configurations(algorithm).len()
        })
        .sum()
}

/// Echoes its input. Never rejects anything.
struct Identity {
    block: usize,
}

impl CryptoTransform for Identity {
    fn input_block_size(&self) -> usize {
        self.block
    }

    fn output_block_size(&self) -> usize {
        self.block
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, TransformError> {
        output[..input.len()].copy_from_slice(input);
        Ok(input.len())
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }
}

/// Echoes its input and appends how many `transform_block` calls it saw.
struct Tally {
    block: usize,
    calls: u8,
}

impl CryptoTransform for Tally {
    fn input_block_size(&self) -> usize {
        self.block
    }

    fn output_block_size(&self) -> usize {
        self.block
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, TransformError> {
        self.calls += 1;
        output[..input.len()].copy_from_slice(input);
        Ok(input.len())
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut out = input.to_vec();
        out.push(self.calls);
        Ok(out)
    }
}

/// Echoes its input, refuses an unaligned final block longer than one byte
/// and zero-pads a single trailing byte.
struct LenientTail {
    block: usize,
    seen: usize,
}

impl CryptoTransform for LenientTail {
    fn input_block_size(&self) -> usize {
        self.block
    }

    fn output_block_size(&self) -> usize {
        self.block
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, TransformError> {
        self.seen += input.len();
        output[..input.len()].copy_from_slice(input);
        Ok(input.len())
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        let total = self.seen + input.len();
        let short = (self.block - total % self.block) % self.block;
        if short != 0 && input.len() > 1 {
            return Err(TransformError::InsufficientFinalBlock {
                length: total,
                block_size: self.block,
            });
        }
        let mut out = input.to_vec();
        out.resize(input.len() + short, 0);
        Ok(out)
    }
}

enum Fault {
    EchoBoth,
    LenientTail,
    EchoDecrypt,
    Tally,
    RefuseMode,
    WrongBlockSize,
}

struct Faulty(Fault);

impl TransformProvider for Faulty {
    fn create(
        &self,
        config: &CipherConfiguration,
        material: &KeyMaterial,
        direction: Direction,
    ) -> Result<Box<dyn CryptoTransform>, TransformError> {
        let block = ConfigurationMatrix::standard().transform_block_size(config);
        match self.0 {
            Fault::EchoBoth => Ok(Box::new(Identity { block })),
            Fault::EchoDecrypt if direction == Direction::Decrypt => {
                Ok(Box::new(Identity { block }))
            }
            Fault::EchoDecrypt => SymmetricProvider.create(config, material, direction),
            Fault::LenientTail => Ok(Box::new(LenientTail { block, seen: 0 })),
            Fault::Tally => Ok(Box::new(Tally { block, calls: 0 })),
            Fault::RefuseMode => Err(TransformError::UnsupportedMode {
                algorithm: config.algorithm(),
                mode: config.mode(),
            }),
            Fault::WrongBlockSize => Ok(Box::new(Identity { block: block * 2 })),
        }
    }
}

#[test]
fn full_matrix_conforms() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let matrix = ConfigurationMatrix::standard();
    let report = runner(SymmetricProvider).run_matrix();
    for failure in report.failures() {
        eprintln!("{failure}");
    }
    assert!(report.is_success(), "{report}");
    assert_eq!(report.cases(), expected_cases(matrix));
    assert_eq!(report.cases(), report.passed() + report.rejected());
    assert_eq!(report.vectors_checked(), repository().len());
}

#[test]
fn parallel_run_matches_sequential() {
    let options = RunOptions {
        jobs: 3,
        mode: Some(CipherMode::Cbc),
        ..RunOptions::default()
    };
    let parallel = runner(SymmetricProvider).with_options(options).run_matrix();
    let sequential = runner(SymmetricProvider)
        .with_options(RunOptions {
            jobs: 1,
            ..options
        })
        .run_matrix();
    assert!(parallel.is_success(), "{parallel}");
    assert_eq!(parallel.to_string(), sequential.to_string());
    assert!(parallel.vectors_checked() > 0);
}

#[test]
fn rc2_unpadded_odd_length_is_rejected_and_zeros_accepts_it() {
    let material = KeyMaterial::new(vec![0x11; 5], vec![0; 8]);
    let base = CipherConfiguration::builder(Algorithm::Rc2)
        .key_size(40)
        .mode(CipherMode::Ecb)
        .padding(PaddingMode::None)
        .build()
        .expect("valid");
    let input = [0u8; 17];
    let encrypt = |config: CipherConfiguration| -> Result<Vec<u8>, DriveError> {
        let mut transform = SymmetricProvider.create(&config, &material, Direction::Encrypt)?;
        TransformDriver::new(8, DriveStrategy::WholeBlock).drive(transform.as_mut(), &input)
    };

    let verdict = classify(|| encrypt(base), RejectionReason::InsufficientFinalBlock);
    assert_eq!(verdict, Verdict::FailedExpected);

    let padded = encrypt(base.with_padding(PaddingMode::Zeros)).expect("zeros pads");
    assert_eq!(padded.len(), 24);
}

#[test]
fn des_unpadded_partial_plaintext_is_an_expected_rejection() {
    let config = des(CipherMode::Cbc, PaddingMode::None);
    let outcome = runner(SymmetricProvider)
        .run_case(&config, Plaintext::Partial)
        .expect("rejection anticipated");
    assert_eq!(
        outcome,
        CaseOutcome::Rejected(RejectionReason::InsufficientFinalBlock)
    );
}

#[test]
fn unaligned_input_must_fail_under_every_call_pattern() {
    let config = des(CipherMode::Ecb, PaddingMode::None);
    let failure = runner(Faulty(Fault::LenientTail))
        .run_case(&config, Plaintext::Partial)
        .unwrap_err();
    assert!(
        matches!(
            failure,
            Failure::UnexpectedSuccess {
                expected: RejectionReason::InsufficientFinalBlock,
                ..
            }
        ),
        "{failure}"
    );
}

#[test]
fn tampered_padding_is_refused() {
    let runner = runner(SymmetricProvider);
    let rijndael = CipherConfiguration::builder(Algorithm::Rijndael)
        .key_size(256)
        .block_size(192)
        .mode(CipherMode::Cbc)
        .padding(PaddingMode::AnsiX923)
        .build()
        .expect("valid");
    for config in [des(CipherMode::Cbc, PaddingMode::Pkcs7), rijndael] {
        assert_eq!(
            runner.run_tampered(&config),
            Ok(CaseOutcome::Rejected(RejectionReason::InvalidPadding)),
            "{config}"
        );
    }
}

#[test]
fn padding_blind_decryptor_is_an_unexpected_success() {
    let config = des(CipherMode::Cbc, PaddingMode::Pkcs7);
    let failure = runner(Faulty(Fault::EchoDecrypt))
        .run_tampered(&config)
        .unwrap_err();
    assert!(matches!(
        failure,
        Failure::UnexpectedSuccess {
            expected: RejectionReason::InvalidPadding,
            ..
        }
    ));
}

#[test]
fn ofb_and_cts_are_refused() {
    let runner = runner(SymmetricProvider);
    for mode in [CipherMode::Ofb, CipherMode::Cts] {
        let config = des(mode, PaddingMode::Pkcs7);
        assert_eq!(
            runner.run_illegal(&config, RejectionReason::UnsupportedMode),
            Ok(CaseOutcome::Rejected(RejectionReason::UnsupportedMode))
        );
    }
}

#[test]
fn echo_transform_fails_known_answer() {
    let config = des(CipherMode::Ecb, PaddingMode::None);
    let failure = runner(Faulty(Fault::EchoBoth))
        .run_case(&config, Plaintext::Exact)
        .unwrap_err();
    match failure {
        Failure::VectorMismatch { case, violation } => {
            assert_eq!(case.config, config);
            assert_eq!(violation.first_offset(), Some(0));
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn permissive_transform_is_an_unexpected_success() {
    let config = des(CipherMode::Ofb, PaddingMode::Pkcs7);
    let failure = runner(Faulty(Fault::EchoBoth))
        .run_illegal(&config, RejectionReason::UnsupportedMode)
        .unwrap_err();
    assert!(matches!(
        failure,
        Failure::UnexpectedSuccess {
            expected: RejectionReason::UnsupportedMode,
            ..
        }
    ));
}

#[test]
fn call_pattern_sensitive_transform_breaks_equivalence() {
    let config = des(CipherMode::Ecb, PaddingMode::None);
    let failure = runner(Faulty(Fault::Tally))
        .run_case(&config, Plaintext::Exact)
        .unwrap_err();
    match failure {
        Failure::InvariantViolation { violation, .. } => {
            assert_eq!(violation.first_offset(), Some(16));
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn broken_decryptor_fails_round_trip() {
    let config = des(CipherMode::Cbc, PaddingMode::None);
    let failure = runner(Faulty(Fault::EchoDecrypt))
        .run_case(&config, Plaintext::Exact)
        .unwrap_err();
    assert!(matches!(failure, Failure::RoundTripMismatch { .. }), "{failure}");
}

#[test]
fn refused_legal_configuration_and_wrong_rejection() {
    let runner = runner(Faulty(Fault::RefuseMode));
    let legal = des(CipherMode::Cbc, PaddingMode::Pkcs7);
    let failure = runner.run_case(&legal, Plaintext::Exact).unwrap_err();
    assert!(matches!(failure, Failure::Transform { .. }), "{failure}");

    let feedback = CipherConfiguration::builder(Algorithm::Des)
        .mode(CipherMode::Cfb)
        .feedback_size(16)
        .build()
        .expect("valid");
    let failure = runner
        .run_illegal(&feedback, RejectionReason::UnsupportedFeedbackMode)
        .unwrap_err();
    match failure {
        Failure::WrongErrorKind {
            expected, actual, ..
        } => {
            assert_eq!(expected, RejectionReason::UnsupportedFeedbackMode);
            assert!(matches!(actual, DriveError::Transform(TransformError::UnsupportedMode { .. })));
        }
        other => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn misreported_block_size_is_a_drive_failure() {
    let config = des(CipherMode::Ecb, PaddingMode::Pkcs7);
    let failure = runner(Faulty(Fault::WrongBlockSize))
        .run_case(&config, Plaintext::Exact)
        .unwrap_err();
    assert!(matches!(
        failure,
        Failure::Drive {
            source: DriveError::BlockSizeMismatch {
                expected: 8,
                actual: 16
            },
            ..
        }
    ));
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let options = RunOptions {
        fail_fast: true,
        ..RunOptions::default()
    };
    let report = runner(Faulty(Fault::EchoBoth))
        .with_options(options)
        .run_matrix();
    assert_eq!(report.failures().len(), 1);
    assert!(report.cases() < expected_cases(ConfigurationMatrix::standard()));
}
