//! Final-block padding schemes.

use rand::RngCore;

use crate::config::PaddingMode;
use crate::error::TransformError;

/// Length of `len` input bytes after padding to `block_size`.
///
/// `None` when the padding cannot extend the input (unaligned `None` padding).
pub fn padded_len(len: usize, block_size: usize, padding: PaddingMode) -> Option<usize> {
    let remainder = len % block_size;
    match padding {
        PaddingMode::None if remainder != 0 => None,
        PaddingMode::None => Some(len),
        PaddingMode::Zeros if remainder == 0 => Some(len),
        PaddingMode::Zeros => Some(len - remainder + block_size),
        PaddingMode::Pkcs7 | PaddingMode::AnsiX923 | PaddingMode::Iso10126 => {
            Some(len - remainder + block_size)
        }
    }
}

/// Extends `data` to a whole number of blocks.
pub fn pad(
    data: &mut Vec<u8>,
    block_size: usize,
    padding: PaddingMode,
    rng: &mut dyn RngCore,
) -> Result<(), TransformError> {
    let target = padded_len(data.len(), block_size, padding).ok_or(
        TransformError::InsufficientFinalBlock {
            length: data.len(),
            block_size,
        },
    )?;
    let count = target - data.len();
    match padding {
        PaddingMode::None => {}
        PaddingMode::Zeros => data.resize(target, 0),
        PaddingMode::Pkcs7 => data.resize(target, count as u8),
        PaddingMode::AnsiX923 => {
            data.resize(target - 1, 0);
            data.push(count as u8);
        }
        PaddingMode::Iso10126 => {
            let start = data.len();
            data.resize(target - 1, 0);
            rng.fill_bytes(&mut data[start..]);
            data.push(count as u8);
        }
    }
    Ok(())
}

/// Strips removable padding from decrypted `data` in place.
///
/// `None` and `Zeros` leave the data untouched.
pub fn unpad(
    data: &mut Vec<u8>,
    block_size: usize,
    padding: PaddingMode,
) -> Result<(), TransformError> {
    if !padding.is_removable() || data.is_empty() {
        return Ok(());
    }
    let invalid = TransformError::InvalidPadding { padding };
    let count = usize::from(*data.last().ok_or(invalid.clone())?);
    if count == 0 || count > block_size || count > data.len() {
        return Err(invalid);
    }
    let body = data.len() - count;
    let filler = &data[body..data.len() - 1];
    let valid = match padding {
        PaddingMode::Pkcs7 => filler.iter().all(|&b| usize::from(b) == count),
        PaddingMode::AnsiX923 => filler.iter().all(|&b| b == 0),
        _ => true,
    };
    if !valid {
        return Err(invalid);
    }
    data.truncate(body);
    Ok(())
}
