//! Streaming encryptors and decryptors.

use core::fmt;

use rand::RngCore;

use crate::config::PaddingMode;
use crate::error::TransformError;
use crate::mode::ModeEngine;
use crate::padding::{pad, unpad};

/// Which way a transform runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Plaintext in, ciphertext out.
    Encrypt,
    /// Ciphertext in, plaintext out.
    Decrypt,
}

/// Block-at-a-time transform with a separate finalization step.
///
/// `transform_block` may be called any number of times with inputs of any
/// length. Bytes that do not yet fill a transform block are buffered.
/// `transform_final_block` flushes the buffer, applies or removes padding,
/// and ends the transform: every later call fails with
/// [`TransformError::Finalized`].
pub trait CryptoTransform {
    /// Bytes per input transform block.
    fn input_block_size(&self) -> usize;

    /// Bytes per output transform block.
    fn output_block_size(&self) -> usize;

    /// Processes as many whole blocks as are available and writes them to
    /// `output`, returning the number of bytes written.
    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, TransformError>;

    /// Processes the buffered tail plus `input` and finishes the transform.
    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError>;
}

/// [`CryptoTransform`] over one of the built-in ciphers.
pub struct SymmetricTransform {
    engine: ModeEngine,
    direction: Direction,
    padding: PaddingMode,
    block: usize,
    pending: Vec<u8>,
    finalized: bool,
    rng: Box<dyn RngCore + Send>,
}

impl SymmetricTransform {
    pub(crate) fn new(
        engine: ModeEngine,
        direction: Direction,
        padding: PaddingMode,
        block: usize,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            engine,
            direction,
            padding,
            block,
            pending: Vec::with_capacity(block),
            finalized: false,
            rng,
        }
    }

    /// Direction this transform was created for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Bytes buffered and not yet emitted.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bytes a decryptor keeps back so the last block can be unpadded.
    fn held_back(&self) -> usize {
        match self.direction {
            Direction::Decrypt if self.padding.is_removable() => self.block,
            _ => 0,
        }
    }

    fn run(&mut self, data: &mut [u8]) {
        match self.direction {
            Direction::Encrypt => self.engine.encrypt(data),
            Direction::Decrypt => self.engine.decrypt(data),
        }
    }
}

impl CryptoTransform for SymmetricTransform {
    fn input_block_size(&self) -> usize {
        self.block
    }

    fn output_block_size(&self) -> usize {
        self.block
    }

    fn transform_block(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, TransformError> {
        if self.finalized {
            return Err(TransformError::Finalized);
        }
        let available = (self.pending.len() + input.len()).saturating_sub(self.held_back());
        let ready = available - available % self.block;
        if output.len() < ready {
            return Err(TransformError::OutputTooSmall {
                needed: ready,
                available: output.len(),
            });
        }

        self.pending.extend_from_slice(input);
        let mut blocks: Vec<u8> = self.pending.drain(..ready).collect();
        self.run(&mut blocks);
        output[..ready].copy_from_slice(&blocks);
        tracing::trace!(
            input = input.len(),
            written = ready,
            pending = self.pending.len(),
            "transform_block"
        );
        Ok(ready)
    }

    fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>, TransformError> {
        if self.finalized {
            return Err(TransformError::Finalized);
        }
        self.finalized = true;

        let mut data = core::mem::take(&mut self.pending);
        data.extend_from_slice(input);
        match self.direction {
            Direction::Encrypt => {
                pad(&mut data, self.block, self.padding, self.rng.as_mut())?;
                self.engine.encrypt(&mut data);
            }
            Direction::Decrypt => {
                if data.len() % self.block != 0 {
                    return Err(TransformError::InsufficientFinalBlock {
                        length: data.len(),
                        block_size: self.block,
                    });
                }
                self.engine.decrypt(&mut data);
                unpad(&mut data, self.block, self.padding)?;
            }
        }
        tracing::trace!(input = input.len(), output = data.len(), "transform_final_block");
        Ok(data)
    }
}

impl fmt::Debug for SymmetricTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricTransform")
            .field("direction", &self.direction)
            .field("padding", &self.padding)
            .field("block", &self.block)
            .field("pending", &self.pending.len())
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}
