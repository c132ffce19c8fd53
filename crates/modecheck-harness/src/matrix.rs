//! Legal and illegal configuration enumeration.

use core::fmt;
use std::sync::OnceLock;

use modecheck_transform::{Algorithm, CipherConfiguration, CipherMode, ErrorKind, PaddingMode};

use crate::profile::{transform_block_size, AlgorithmProfile, CspProfile, RijndaelProfile};

/// Why an attempt is expected to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The algorithm does not implement the mode.
    UnsupportedMode,
    /// The algorithm does not implement CFB with that feedback size.
    UnsupportedFeedbackMode,
    /// Unpadded input is not a whole number of transform blocks.
    InsufficientFinalBlock,
    /// Padding found on decryption does not validate.
    InvalidPadding,
}

impl RejectionReason {
    /// Whether an observed error kind is this rejection.
    pub fn matches(self, kind: ErrorKind) -> bool {
        matches!(
            (self, kind),
            (Self::UnsupportedMode, ErrorKind::UnsupportedMode)
                | (Self::UnsupportedFeedbackMode, ErrorKind::UnsupportedFeedbackSize)
                | (Self::InsufficientFinalBlock, ErrorKind::InsufficientFinalBlock)
                | (Self::InvalidPadding, ErrorKind::InvalidPadding)
        )
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Data-driven enumerator over a set of [`AlgorithmProfile`]s.
pub struct ConfigurationMatrix {
    profiles: Vec<Box<dyn AlgorithmProfile>>,
}

impl ConfigurationMatrix {
    /// Matrix over the given profiles, enumerated in the order given.
    pub fn new(profiles: Vec<Box<dyn AlgorithmProfile>>) -> Self {
        Self { profiles }
    }

    /// Process-wide matrix over DES, TripleDES, RC2 and Rijndael.
    pub fn standard() -> &'static ConfigurationMatrix {
        static MATRIX: OnceLock<ConfigurationMatrix> = OnceLock::new();
        MATRIX.get_or_init(|| {
            Self::new(vec![
                Box::new(CspProfile::des()),
                Box::new(CspProfile::triple_des()),
                Box::new(CspProfile::rc2()),
                Box::new(RijndaelProfile),
            ])
        })
    }

    /// Algorithms covered, in enumeration order.
    pub fn algorithms(&self) -> impl Iterator<Item = Algorithm> + '_ {
        self.profiles.iter().map(|profile| profile.algorithm())
    }

    /// Profile for `algorithm`, if covered.
    pub fn profile(&self, algorithm: Algorithm) -> Option<&dyn AlgorithmProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.algorithm() == algorithm)
            .map(|profile| &**profile)
    }

    /// Bytes per transform block, or the cipher block for uncovered algorithms.
    pub fn transform_block_size(&self, config: &CipherConfiguration) -> usize {
        match self.profile(config.algorithm()) {
            Some(profile) => transform_block_size(profile, config),
            None => config.block_bytes(),
        }
    }

    /// Every configuration the algorithm must accept.
    ///
    /// Ordered by key size, block size, mode, padding, then feedback size.
    pub fn legal_configurations(&self, algorithm: Algorithm) -> Vec<CipherConfiguration> {
        let Some(profile) = self.profile(algorithm) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for key in profile.key_sizes().iter() {
            for block in profile.block_sizes().iter() {
                for &mode in profile.cipher_modes() {
                    let feedbacks: Vec<Option<usize>> = if mode.uses_feedback() {
                        profile.feedback_size_range(block).iter().map(Some).collect()
                    } else {
                        vec![None]
                    };
                    for &padding in profile.supported_padding_modes() {
                        for &feedback in &feedbacks {
                            let shape = (key, block, mode, padding, feedback);
                            out.extend(configuration(algorithm, shape));
                        }
                    }
                }
            }
        }
        out
    }

    /// Configurations the algorithm must refuse, with the reason.
    ///
    /// Only construction-time rejections are listed here; transform-time
    /// ones come from [`anticipated_failure`](crate::anticipated_failure).
    pub fn illegal_configurations(
        &self,
        algorithm: Algorithm,
    ) -> Vec<(CipherConfiguration, RejectionReason)> {
        let Some(profile) = self.profile(algorithm) else {
            return Vec::new();
        };
        let padding = PaddingMode::Pkcs7;
        let mut out = Vec::new();
        for key in profile.key_sizes().iter() {
            for block in profile.block_sizes().iter() {
                for &mode in profile.rejected_modes() {
                    if let Some(config) = configuration(algorithm, (key, block, mode, padding, None)) {
                        out.push((config, RejectionReason::UnsupportedMode));
                    }
                }
                let legal = profile.feedback_size_range(block);
                for feedback in (8..=block).step_by(8).filter(|bits| !legal.contains(*bits)) {
                    let shape = (key, block, CipherMode::Cfb, padding, Some(feedback));
                    if let Some(config) = configuration(algorithm, shape) {
                        out.push((config, RejectionReason::UnsupportedFeedbackMode));
                    }
                }
            }
        }
        out
    }

    /// Legal configurations whose decryptor must reject a tampered
    /// ciphertext with [`RejectionReason::InvalidPadding`].
    ///
    /// CBC with PKCS7 or ANSIX923 only: there a bit flipped in the
    /// next-to-last ciphertext block flips the same bit of the padding
    /// block, so the damage to the filler is deterministic.
    pub fn tampered_configurations(&self, algorithm: Algorithm) -> Vec<CipherConfiguration> {
        self.legal_configurations(algorithm)
            .into_iter()
            .filter(|config| {
                config.mode() == CipherMode::Cbc
                    && matches!(config.padding(), PaddingMode::Pkcs7 | PaddingMode::AnsiX923)
            })
            .collect()
    }
}

impl fmt::Debug for ConfigurationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.algorithms()).finish()
    }
}

/// (key bits, block bits, mode, padding, feedback bits)
type Shape = (usize, usize, CipherMode, PaddingMode, Option<usize>);

// Sizes that fail construction contribute nothing.
fn configuration(algorithm: Algorithm, shape: Shape) -> Option<CipherConfiguration> {
    let (key, block, mode, padding, feedback) = shape;
    let mut builder = CipherConfiguration::builder(algorithm)
        .key_size(key)
        .block_size(block)
        .mode(mode)
        .padding(padding);
    if let Some(bits) = feedback {
        builder = builder.feedback_size(bits);
    }
    builder.build().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn legal_counts_per_algorithm() {
        let matrix = ConfigurationMatrix::standard();
        // 3 modes x 5 paddings per (key, block).
        assert_eq!(matrix.legal_configurations(Algorithm::Des).len(), 15);
        assert_eq!(matrix.legal_configurations(Algorithm::TripleDes).len(), 30);
        assert_eq!(matrix.legal_configurations(Algorithm::Rc2).len(), 180);
        // ECB and CBC: 10 each; CFB: 5 paddings x block/8 feedbacks.
        assert_eq!(
            matrix.legal_configurations(Algorithm::Rijndael).len(),
            3 * (30 + 5 * (16 + 24 + 32))
        );
    }

    #[test]
    fn tampered_set_is_cbc_with_checked_filler() {
        let matrix = ConfigurationMatrix::standard();
        let des = matrix.tampered_configurations(Algorithm::Des);
        let paddings: Vec<_> = des.iter().map(|config| config.padding()).collect();
        assert_eq!(paddings, [PaddingMode::Pkcs7, PaddingMode::AnsiX923]);
        assert!(des.iter().all(|config| config.mode() == CipherMode::Cbc));
        // 9 (key, block) pairs x 2 paddings.
        assert_eq!(matrix.tampered_configurations(Algorithm::Rijndael).len(), 18);
    }

    #[test]
    fn enumeration_is_deterministic_and_unique() {
        let matrix = ConfigurationMatrix::standard();
        for algorithm in Algorithm::ALL {
            let first = matrix.legal_configurations(algorithm);
            assert_eq!(first, matrix.legal_configurations(algorithm));
            let unique: HashSet<_> = first.iter().collect();
            assert_eq!(unique.len(), first.len(), "{algorithm}");
        }
    }

    #[test]
    fn illegal_set_for_des() {
        let illegal = ConfigurationMatrix::standard().illegal_configurations(Algorithm::Des);
        let modes = illegal
            .iter()
            .filter(|(_, reason)| *reason == RejectionReason::UnsupportedMode)
            .count();
        let feedback: Vec<_> = illegal
            .iter()
            .filter(|(_, reason)| *reason == RejectionReason::UnsupportedFeedbackMode)
            .filter_map(|(config, _)| config.feedback_size())
            .collect();
        assert_eq!(modes, 2);
        assert_eq!(feedback, vec![16, 24, 32, 40, 48, 56, 64]);
    }

    #[test]
    fn rijndael_has_only_mode_rejections() {
        let illegal = ConfigurationMatrix::standard().illegal_configurations(Algorithm::Rijndael);
        assert_eq!(illegal.len(), 9 * 2);
        assert!(illegal
            .iter()
            .all(|(config, reason)| *reason == RejectionReason::UnsupportedMode
                && matches!(config.mode(), CipherMode::Ofb | CipherMode::Cts)));
    }

    #[test]
    fn reasons_match_their_error_kinds() {
        let feedback = RejectionReason::UnsupportedFeedbackMode;
        assert!(feedback.matches(ErrorKind::UnsupportedFeedbackSize));
        assert!(!RejectionReason::UnsupportedMode.matches(ErrorKind::InsufficientFinalBlock));
    }

    #[test]
    fn matrix_over_a_subset_of_profiles() {
        let matrix = ConfigurationMatrix::new(vec![Box::new(CspProfile::des())]);
        assert_eq!(matrix.algorithms().collect::<Vec<_>>(), vec![Algorithm::Des]);
        assert!(matrix.legal_configurations(Algorithm::Rc2).is_empty());
    }
}
