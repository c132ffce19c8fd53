//! Rijndael round transformations over a column-major state of `4 * Nb` bytes.

use crate::block::{xor_in_place, BlockSize, MAX_BLOCK_BYTES};
use crate::sbox::{inv_sbox, sbox};

/// Applies SubBytes to the state in place.
#[inline]
pub fn sub_bytes(state: &mut [u8]) {
    for byte in state.iter_mut() {
        *byte = sbox(*byte);
    }
}

/// Applies the inverse SubBytes transformation.
#[inline]
pub fn inv_sub_bytes(state: &mut [u8]) {
    for byte in state.iter_mut() {
        *byte = inv_sbox(*byte);
    }
}

/// Performs ShiftRows in place; row `r` rotates left by the block's offset for `r`.
pub fn shift_rows(state: &mut [u8], block: BlockSize) {
    let nb = block.columns();
    let offsets = block.shift_offsets();
    let mut tmp = [0u8; MAX_BLOCK_BYTES];
    for col in 0..nb {
        for (row, offset) in offsets.iter().enumerate() {
            tmp[col * 4 + row] = state[((col + offset) % nb) * 4 + row];
        }
    }
    state.copy_from_slice(&tmp[..block.bytes()]);
}

/// Performs the inverse of ShiftRows in place.
pub fn inv_shift_rows(state: &mut [u8], block: BlockSize) {
    let nb = block.columns();
    let offsets = block.shift_offsets();
    let mut tmp = [0u8; MAX_BLOCK_BYTES];
    for col in 0..nb {
        for (row, offset) in offsets.iter().enumerate() {
            tmp[((col + offset) % nb) * 4 + row] = state[col * 4 + row];
        }
    }
    state.copy_from_slice(&tmp[..block.bytes()]);
}

pub(crate) fn xtime(byte: u8) -> u8 {
    let shifted = byte << 1;
    if byte & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        if b & 1 != 0 {
            product ^= a;
        }
        let hi_bit_set = a & 0x80;
        a <<= 1;
        if hi_bit_set != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    product
}

fn mix_single_column(col: &mut [u8]) {
    let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
    col[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
    col[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
    col[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
    col[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
}

fn inv_mix_single_column(col: &mut [u8]) {
    let (a0, a1, a2, a3) = (col[0], col[1], col[2], col[3]);
    col[0] = gmul(a0, 0x0e) ^ gmul(a1, 0x0b) ^ gmul(a2, 0x0d) ^ gmul(a3, 0x09);
    col[1] = gmul(a0, 0x09) ^ gmul(a1, 0x0e) ^ gmul(a2, 0x0b) ^ gmul(a3, 0x0d);
    col[2] = gmul(a0, 0x0d) ^ gmul(a1, 0x09) ^ gmul(a2, 0x0e) ^ gmul(a3, 0x0b);
    col[3] = gmul(a0, 0x0b) ^ gmul(a1, 0x0d) ^ gmul(a2, 0x09) ^ gmul(a3, 0x0e);
}

/// MixColumns over every column of the state.
#[inline]
pub fn mix_columns(state: &mut [u8]) {
    for column in state.chunks_exact_mut(4) {
        mix_single_column(column);
    }
}

/// Inverse MixColumns over every column of the state.
#[inline]
pub fn inv_mix_columns(state: &mut [u8]) {
    for column in state.chunks_exact_mut(4) {
        inv_mix_single_column(column);
    }
}

/// Adds (XORs) a round key into the state.
#[inline]
pub fn add_round_key(state: &mut [u8], round_key: &[u8]) {
    xor_in_place(state, round_key);
}
