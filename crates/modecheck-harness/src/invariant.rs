//! Structural checks on transform output.

use core::fmt;
use core::ops::Range;

use modecheck_transform::{CipherConfiguration, CipherMode, PaddingMode};

use crate::plaintext::Plaintext;

/// A property the ciphertext must have regardless of the vector bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// The first `blocks` ciphertext blocks of an all-zero ECB plaintext are
    /// identical.
    EcbBlockIndependence {
        /// Number of leading blocks compared.
        blocks: usize,
    },
    /// Under ECB with Zeros padding the zero-extended final block encrypts
    /// to the same bytes as the first block.
    ZeroPaddingDeterminism,
}

impl Invariant {
    /// Invariants that hold for `config` encrypting `plaintext`.
    pub fn applicable(config: &CipherConfiguration, plaintext: Plaintext) -> Vec<Invariant> {
        if config.mode() != CipherMode::Ecb || !plaintext.is_zero() {
            return Vec::new();
        }
        let mut out = vec![Self::EcbBlockIndependence { blocks: 2 }];
        if plaintext == Plaintext::Partial && config.padding() == PaddingMode::Zeros {
            out.push(Self::ZeroPaddingDeterminism);
        }
        out
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EcbBlockIndependence { blocks } => {
                write!(f, "ECB block independence over {blocks} blocks")
            }
            Self::ZeroPaddingDeterminism => f.write_str("zero-padding determinism"),
        }
    }
}

/// Which comparison produced a [`Violation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Check {
    /// A structural [`Invariant`].
    Invariant(Invariant),
    /// Ciphertext against the expected vector.
    KnownAnswer,
    /// Whole-block output against byte-at-a-time output.
    StrategyEquivalence,
    /// Decrypted output against the original plaintext.
    RoundTrip,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invariant(invariant) => invariant.fmt(f),
            Self::KnownAnswer => f.write_str("known answer"),
            Self::StrategyEquivalence => f.write_str("strategy equivalence"),
            Self::RoundTrip => f.write_str("round trip"),
        }
    }
}

/// A failed comparison with the byte ranges that differed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Comparison that failed.
    pub check: Check,
    /// Differing byte ranges of the actual output, ascending and disjoint.
    pub ranges: Vec<Range<usize>>,
    /// Length of the reference bytes.
    pub expected_len: usize,
    /// Length of the bytes under test.
    pub actual_len: usize,
}

impl Violation {
    /// Offset of the first differing byte.
    pub fn first_offset(&self) -> Option<usize> {
        self.ranges.first().map(|range| range.start)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.check)?;
        match self.ranges.first() {
            Some(first) => {
                let spans: Vec<String> = self
                    .ranges
                    .iter()
                    .map(|r| format!("{}..{}", r.start, r.end))
                    .collect();
                write!(
                    f,
                    "first mismatch at byte {}, differing ranges [{}]",
                    first.start,
                    spans.join(", ")
                )?;
            }
            None => f.write_str("no differing bytes")?,
        }
        if self.expected_len != self.actual_len {
            write!(f, ", length {} != {}", self.actual_len, self.expected_len)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violation {}

/// Bytes excluded from a comparison.
///
/// ISO10126 filler is random, so it and every byte it feeds into through
/// chaining differ between otherwise equal encryptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComparisonMask {
    masked: Option<Range<usize>>,
}

impl ComparisonMask {
    /// Compares every byte.
    pub fn none() -> Self {
        Self::default()
    }

    /// Excludes `range`.
    pub fn excluding(range: Range<usize>) -> Self {
        Self {
            masked: Some(range),
        }
    }

    /// Mask for the ciphertext of a `plaintext_len`-byte input.
    pub fn for_ciphertext(
        config: &CipherConfiguration,
        transform_block: usize,
        plaintext_len: usize,
    ) -> Self {
        if config.padding() != PaddingMode::Iso10126 {
            return Self::none();
        }
        let count = transform_block - plaintext_len % transform_block;
        let padded = plaintext_len + count;
        if count == 1 {
            return Self::none();
        }
        match config.mode() {
            CipherMode::Cfb => {
                let segment = config.feedback_size().map_or(1, |bits| bits / 8);
                if segment >= transform_block {
                    Self::excluding(plaintext_len..padded - 1)
                } else {
                    Self::excluding(plaintext_len..padded)
                }
            }
            _ => Self::excluding(padded - transform_block..padded),
        }
    }

    /// Whether byte `offset` is excluded.
    pub fn is_masked(&self, offset: usize) -> bool {
        self.masked
            .as_ref()
            .is_some_and(|range| range.contains(&offset))
    }

    /// Byte ranges where `expected` and `actual` differ outside the mask.
    /// Bytes present in only one side count as differing.
    pub fn diff(&self, expected: &[u8], actual: &[u8]) -> Vec<Range<usize>> {
        let len = expected.len().max(actual.len());
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for offset in 0..len {
            if self.is_masked(offset) || expected.get(offset) == actual.get(offset) {
                continue;
            }
            match ranges.last_mut() {
                Some(last) if last.end == offset => last.end += 1,
                _ => ranges.push(offset..offset + 1),
            }
        }
        ranges
    }

    fn compare(&self, check: Check, expected: &[u8], actual: &[u8]) -> Result<(), Violation> {
        let ranges = self.diff(expected, actual);
        if ranges.is_empty() {
            return Ok(());
        }
        Err(Violation {
            check,
            ranges,
            expected_len: expected.len(),
            actual_len: actual.len(),
        })
    }
}

/// Checks one structural invariant of `output`.
pub fn check(invariant: Invariant, output: &[u8], block_size: usize) -> Result<(), Violation> {
    let check = Check::Invariant(invariant);
    let first = output.get(..block_size).unwrap_or(output);
    match invariant {
        Invariant::EcbBlockIndependence { blocks } => {
            let needed = blocks * block_size;
            let mut reference = Vec::with_capacity(needed);
            for _ in 0..blocks {
                reference.extend_from_slice(first);
            }
            let actual = output.get(..needed).unwrap_or(output);
            ComparisonMask::none().compare(check, &reference, actual)
        }
        Invariant::ZeroPaddingDeterminism => {
            let start = output.len().saturating_sub(block_size);
            let mut reference = output[..start].to_vec();
            reference.extend_from_slice(first);
            ComparisonMask::none().compare(check, &reference, output)
        }
    }
}

/// Checks that decryption recovered the plaintext.
///
/// Zeros padding is not stripped on decrypt, so there the recovered bytes
/// must be the original followed only by zeros.
pub fn check_round_trip(
    original: &[u8],
    recovered: &[u8],
    padding: PaddingMode,
) -> Result<(), Violation> {
    let mut expected = original.to_vec();
    if padding == PaddingMode::Zeros && recovered.len() > original.len() {
        expected.resize(recovered.len(), 0);
    }
    ComparisonMask::none().compare(Check::RoundTrip, &expected, recovered)
}

/// Checks that two call patterns produced the same bytes outside `mask`.
pub fn check_equivalent(
    whole: &[u8],
    bytewise: &[u8],
    mask: &ComparisonMask,
) -> Result<(), Violation> {
    mask.compare(Check::StrategyEquivalence, whole, bytewise)
}

/// Checks ciphertext against its expected vector outside `mask`.
pub fn check_known_answer(
    expected: &[u8],
    actual: &[u8],
    mask: &ComparisonMask,
) -> Result<(), Violation> {
    mask.compare(Check::KnownAnswer, expected, actual)
}
