//! Reference Rijndael implementation used as the block primitive behind the
//! `Rijndael` algorithm of `modecheck-transform`.
//!
//! Unlike AES, Rijndael allows the block length and the key length to be
//! chosen independently from 128, 192 and 256 bits. Each of the nine
//! combinations gets its own key schedule and ShiftRows offsets.
//!
//! Table-free and byte-oriented. Not constant time; use it for checking
//! conformance, not for protecting data.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
mod key;
pub mod round;
mod sbox;

pub use crate::block::{xor_in_place, BlockSize, MAX_BLOCK_BYTES};
pub use crate::cipher::{decrypt_block, encrypt_block, expand_key, Rijndael};
pub use crate::error::InvalidLength;
pub use crate::key::{RijndaelKey, RoundKeys};
pub use crate::sbox::{inv_sbox, sbox};
