//! Streaming symmetric transforms in the shape the conformance harness drives.
//!
//! A [`CipherConfiguration`] names an (algorithm, key size, block size, mode,
//! padding, feedback size) tuple. [`SymmetricAlgorithm::new`] checks it
//! against the algorithm's legal parameter sets and then mints
//! [`SymmetricTransform`] encryptors and decryptors implementing
//! [`CryptoTransform`]:
//! - ECB, CBC and CFB with a feedback size in whole bytes.
//! - None, Zeros, PKCS7, ANSIX923 and ISO10126 padding.
//! - DES, TripleDES and RC2 from RustCrypto; Rijndael from `rijndael-core`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod algorithm;
mod config;
mod error;
mod mode;
pub mod padding;
mod primitive;
mod transform;

pub use crate::algorithm::{KeySizes, SymmetricAlgorithm};
pub use crate::config::{
    Algorithm, CipherConfiguration, CipherConfigurationBuilder, CipherMode, ConfigError,
    PaddingMode,
};
pub use crate::error::{ErrorKind, TransformError};
pub use crate::primitive::BlockPrimitive;
pub use crate::transform::{CryptoTransform, Direction, SymmetricTransform};
