//! Pushes a buffer through a [`CryptoTransform`] with a chosen call pattern.

use core::fmt;

use modecheck_transform::{CryptoTransform, ErrorKind, TransformError};
use thiserror::Error;

/// How input is split across `transform_block` calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriveStrategy {
    /// One call per whole transform block; the remainder goes to the final call.
    WholeBlock,
    /// One byte per call; the last byte goes to the final call.
    ByteAtATime,
    /// Fixed-size chunks; the last chunk goes to the final call.
    Chunked(usize),
}

impl fmt::Display for DriveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeBlock => f.write_str("whole-block"),
            Self::ByteAtATime => f.write_str("byte-at-a-time"),
            Self::Chunked(n) => write!(f, "chunked({n})"),
        }
    }
}

/// Failure while driving a transform.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DriveError {
    /// The transform itself failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The transform reports a block size other than the configured one.
    #[error("transform block size is {actual} bytes, expected {expected}")]
    BlockSizeMismatch {
        /// Block size implied by the configuration.
        expected: usize,
        /// Block size the transform reported.
        actual: usize,
    },
}

impl DriveError {
    /// Transform error kind, when the failure came from the transform.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Transform(err) => Some(err.kind()),
            Self::BlockSizeMismatch { .. } => None,
        }
    }
}

/// Drives transforms expecting a fixed transform block size.
#[derive(Clone, Copy, Debug)]
pub struct TransformDriver {
    block_size: usize,
    strategy: DriveStrategy,
}

impl TransformDriver {
    /// Driver for `block_size`-byte transform blocks.
    pub fn new(block_size: usize, strategy: DriveStrategy) -> Self {
        Self {
            block_size,
            strategy,
        }
    }

    /// Call pattern in use.
    pub fn strategy(&self) -> DriveStrategy {
        self.strategy
    }

    /// Runs `input` through `transform` and finalizes it.
    ///
    /// A transform whose block sizes differ from the configured one is
    /// reported, not accommodated.
    pub fn drive(
        &self,
        transform: &mut dyn CryptoTransform,
        input: &[u8],
    ) -> Result<Vec<u8>, DriveError> {
        for actual in [transform.input_block_size(), transform.output_block_size()] {
            if actual != self.block_size {
                return Err(DriveError::BlockSizeMismatch {
                    expected: self.block_size,
                    actual,
                });
            }
        }

        let (body, last) = match self.strategy {
            DriveStrategy::WholeBlock => {
                let whole = input.len() - input.len() % self.block_size;
                input.split_at(whole)
            }
            DriveStrategy::ByteAtATime => input.split_at(input.len().saturating_sub(1)),
            DriveStrategy::Chunked(n) => {
                let n = n.max(1);
                let tail = match input.len() % n {
                    0 => n.min(input.len()),
                    rem => rem,
                };
                input.split_at(input.len() - tail)
            }
        };
        let step = match self.strategy {
            DriveStrategy::WholeBlock => self.block_size,
            DriveStrategy::ByteAtATime => 1,
            DriveStrategy::Chunked(n) => n.max(1),
        };

        let mut output = Vec::with_capacity(input.len() + 2 * self.block_size);
        let mut scratch = vec![0u8; step + 2 * self.block_size];
        for chunk in body.chunks(step) {
            let written = transform.transform_block(chunk, &mut scratch)?;
            output.extend_from_slice(&scratch[..written]);
        }
        output.extend(transform.transform_final_block(last)?);
        tracing::trace!(
            strategy = %self.strategy,
            input = input.len(),
            output = output.len(),
            "drove transform"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records call sizes and echoes input back.
    struct Recorder {
        block: usize,
        calls: Vec<usize>,
        last: Option<usize>,
    }

    impl Recorder {
        fn new(block: usize) -> Self {
            Self {
                block,
                calls: Vec::new(),
                last: None,
            }
        }
    }

    impl CryptoTransform for Recorder {
        fn input_block_size(&self) -> usize {
            self.block
        }

        fn output_block_size(&self) -> usize {
            self.block
        }

        fn transform_block(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> Result<usize, TransformError> {
            self.calls.push(input.len());
            output[..input.len()].copy_from_slice(input);
            Ok(input.len())
        }

        fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
            self.last = Some(input.len());
            Ok(input.to_vec())
        }
    }

    #[test]
    fn whole_block_sends_remainder_to_final() {
        let mut recorder = Recorder::new(8);
        let input: Vec<u8> = (0..20).collect();
        let out = TransformDriver::new(8, DriveStrategy::WholeBlock)
            .drive(&mut recorder, &input)
            .expect("drive");
        assert_eq!(out, input);
        assert_eq!(recorder.calls, vec![8, 8]);
        assert_eq!(recorder.last, Some(4));
    }

    #[test]
    fn aligned_whole_block_finalizes_empty() {
        let mut recorder = Recorder::new(8);
        TransformDriver::new(8, DriveStrategy::WholeBlock)
            .drive(&mut recorder, &[0u8; 16])
            .expect("drive");
        assert_eq!(recorder.last, Some(0));
    }

    #[test]
    fn byte_at_a_time_finalizes_on_last_byte() {
        let mut recorder = Recorder::new(8);
        TransformDriver::new(8, DriveStrategy::ByteAtATime)
            .drive(&mut recorder, &[0u8; 5])
            .expect("drive");
        assert_eq!(recorder.calls, vec![1, 1, 1, 1]);
        assert_eq!(recorder.last, Some(1));

        let mut empty = Recorder::new(8);
        TransformDriver::new(8, DriveStrategy::ByteAtATime)
            .drive(&mut empty, &[])
            .expect("drive");
        assert!(empty.calls.is_empty());
        assert_eq!(empty.last, Some(0));
    }

    #[test]
    fn chunked_keeps_last_chunk_for_final() {
        let mut recorder = Recorder::new(8);
        TransformDriver::new(8, DriveStrategy::Chunked(3))
            .drive(&mut recorder, &[0u8; 9])
            .expect("drive");
        assert_eq!(recorder.calls, vec![3, 3]);
        assert_eq!(recorder.last, Some(3));
    }

    #[test]
    fn block_size_mismatch_is_reported() {
        let mut recorder = Recorder::new(16);
        let err = TransformDriver::new(8, DriveStrategy::WholeBlock)
            .drive(&mut recorder, &[0u8; 16])
            .unwrap_err();
        assert_eq!(
            err,
            DriveError::BlockSizeMismatch {
                expected: 8,
                actual: 16
            }
        );
        assert_eq!(err.kind(), None);
        assert!(recorder.calls.is_empty());
    }
}
