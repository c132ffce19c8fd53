//! Rijndael key schedule and block encryption/decryption.

use core::convert::TryInto;

use crate::block::BlockSize;
use crate::error::InvalidLength;
use crate::key::{RijndaelKey, RoundKeys};
use crate::round::{
    add_round_key, inv_mix_columns, inv_shift_rows, inv_sub_bytes, mix_columns, shift_rows,
    sub_bytes, xtime,
};
use crate::sbox::sbox;

fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

fn sub_word(word: u32) -> u32 {
    let b0 = sbox((word >> 24) as u8) as u32;
    let b1 = sbox((word >> 16) as u8) as u32;
    let b2 = sbox((word >> 8) as u8) as u32;
    let b3 = sbox(word as u8) as u32;
    (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
}

/// Expands a key into `Nr + 1` round keys sized for `block`.
pub fn expand_key(key: &RijndaelKey, block: BlockSize) -> RoundKeys {
    let nk = key.words();
    let nb = block.columns();
    let rounds = nk.max(nb) + 6;
    let total = nb * (rounds + 1);

    let mut w: Vec<u32> = Vec::with_capacity(total);
    for chunk in key.as_bytes().chunks_exact(4) {
        let bytes: [u8; 4] = chunk.try_into().expect("chunk length is four");
        w.push(u32::from_be_bytes(bytes));
    }

    let mut rcon = 0x01u8;
    for i in nk..total {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(rot_word(temp)) ^ (u32::from(rcon) << 24);
            rcon = xtime(rcon);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w.push(w[i - nk] ^ temp);
    }

    RoundKeys {
        bytes: w.iter().flat_map(|word| word.to_be_bytes()).collect(),
        block,
        rounds,
    }
}

/// Encrypts one block in place with pre-expanded round keys.
///
/// # Panics
/// If `block.len()` differs from the block length of `round_keys`.
pub fn encrypt_block(block: &mut [u8], round_keys: &RoundKeys) {
    let size = round_keys.block;
    assert_eq!(block.len(), size.bytes(), "block length mismatch");
    let last = round_keys.rounds;

    add_round_key(block, round_keys.get(0));

    for round in 1..last {
        sub_bytes(block);
        shift_rows(block, size);
        mix_columns(block);
        add_round_key(block, round_keys.get(round));
    }

    sub_bytes(block);
    shift_rows(block, size);
    add_round_key(block, round_keys.get(last));
}

/// Decrypts one block in place with pre-expanded round keys.
///
/// # Panics
/// If `block.len()` differs from the block length of `round_keys`.
pub fn decrypt_block(block: &mut [u8], round_keys: &RoundKeys) {
    let size = round_keys.block;
    assert_eq!(block.len(), size.bytes(), "block length mismatch");
    let last = round_keys.rounds;

    add_round_key(block, round_keys.get(last));
    for round in (1..last).rev() {
        inv_shift_rows(block, size);
        inv_sub_bytes(block);
        add_round_key(block, round_keys.get(round));
        inv_mix_columns(block);
    }
    inv_shift_rows(block, size);
    inv_sub_bytes(block);
    add_round_key(block, round_keys.get(0));
}

/// A keyed Rijndael instance for one block size.
#[derive(Clone, Debug)]
pub struct Rijndael {
    round_keys: RoundKeys,
    block: BlockSize,
}

impl Rijndael {
    /// Expands `key` (16, 24 or 32 bytes) for a block of `block_bits` (128, 192 or 256).
    pub fn new(key: &[u8], block_bits: usize) -> Result<Self, InvalidLength> {
        let block = BlockSize::from_bits(block_bits)?;
        let key = RijndaelKey::from_slice(key)?;
        Ok(Self {
            round_keys: expand_key(&key, block),
            block,
        })
    }

    /// Block length.
    #[inline]
    pub fn block_size(&self) -> BlockSize {
        self.block
    }

    /// Encrypts one block in place.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        encrypt_block(block, &self.round_keys);
    }

    /// Decrypts one block in place.
    pub fn decrypt_block(&self, block: &mut [u8]) {
        decrypt_block(block, &self.round_keys);
    }
}
