//! ECB, CBC and CFB-n chaining over a [`BlockPrimitive`].

use rijndael_core::{xor_in_place, MAX_BLOCK_BYTES};

use crate::primitive::BlockPrimitive;

enum Chaining {
    Ecb,
    Cbc { chain: [u8; MAX_BLOCK_BYTES] },
    Cfb { register: [u8; MAX_BLOCK_BYTES], segment: usize },
}

/// A keyed primitive plus the chaining state of one mode of operation.
///
/// Callers hand in whole transform blocks; CFB further splits them into
/// feedback-sized segments.
pub(crate) struct ModeEngine {
    primitive: Box<dyn BlockPrimitive>,
    chaining: Chaining,
    block: usize,
}

impl ModeEngine {
    pub(crate) fn ecb(primitive: Box<dyn BlockPrimitive>) -> Self {
        let block = primitive.block_size();
        Self {
            primitive,
            chaining: Chaining::Ecb,
            block,
        }
    }

    pub(crate) fn cbc(primitive: Box<dyn BlockPrimitive>, iv: &[u8]) -> Self {
        let block = primitive.block_size();
        let mut chain = [0u8; MAX_BLOCK_BYTES];
        chain[..block].copy_from_slice(iv);
        Self {
            primitive,
            chaining: Chaining::Cbc { chain },
            block,
        }
    }

    /// `segment` is the feedback size in bytes.
    pub(crate) fn cfb(primitive: Box<dyn BlockPrimitive>, iv: &[u8], segment: usize) -> Self {
        let block = primitive.block_size();
        let mut register = [0u8; MAX_BLOCK_BYTES];
        register[..block].copy_from_slice(iv);
        Self {
            primitive,
            chaining: Chaining::Cfb { register, segment },
            block,
        }
    }

    /// Encrypts `data` in place. `data.len()` must be a multiple of the unit size.
    pub(crate) fn encrypt(&mut self, data: &mut [u8]) {
        let block = self.block;
        match &mut self.chaining {
            Chaining::Ecb => {
                for chunk in data.chunks_exact_mut(block) {
                    self.primitive.encrypt_block(chunk);
                }
            }
            Chaining::Cbc { chain } => {
                for chunk in data.chunks_exact_mut(block) {
                    xor_in_place(chunk, &chain[..block]);
                    self.primitive.encrypt_block(chunk);
                    chain[..block].copy_from_slice(chunk);
                }
            }
            Chaining::Cfb { register, segment } => {
                let segment = *segment;
                let mut keystream = [0u8; MAX_BLOCK_BYTES];
                for chunk in data.chunks_exact_mut(segment) {
                    keystream[..block].copy_from_slice(&register[..block]);
                    self.primitive.encrypt_block(&mut keystream[..block]);
                    xor_in_place(chunk, &keystream[..segment]);
                    shift_in(&mut register[..block], chunk);
                }
            }
        }
    }

    /// Decrypts `data` in place. `data.len()` must be a multiple of the unit size.
    pub(crate) fn decrypt(&mut self, data: &mut [u8]) {
        let block = self.block;
        match &mut self.chaining {
            Chaining::Ecb => {
                for chunk in data.chunks_exact_mut(block) {
                    self.primitive.decrypt_block(chunk);
                }
            }
            Chaining::Cbc { chain } => {
                let mut saved = [0u8; MAX_BLOCK_BYTES];
                for chunk in data.chunks_exact_mut(block) {
                    saved[..block].copy_from_slice(chunk);
                    self.primitive.decrypt_block(chunk);
                    xor_in_place(chunk, &chain[..block]);
                    chain[..block].copy_from_slice(&saved[..block]);
                }
            }
            Chaining::Cfb { register, segment } => {
                let segment = *segment;
                let mut keystream = [0u8; MAX_BLOCK_BYTES];
                for chunk in data.chunks_exact_mut(segment) {
                    keystream[..block].copy_from_slice(&register[..block]);
                    self.primitive.encrypt_block(&mut keystream[..block]);
                    shift_in(&mut register[..block], chunk);
                    xor_in_place(chunk, &keystream[..segment]);
                }
            }
        }
    }
}

/// Drops the oldest `segment.len()` bytes of the register and appends `segment`.
fn shift_in(register: &mut [u8], segment: &[u8]) {
    let keep = register.len() - segment.len();
    register.copy_within(segment.len().., 0);
    register[keep..].copy_from_slice(segment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rijndael_core::Rijndael;

    fn aes(key: &str) -> Box<dyn BlockPrimitive> {
        let key = hex::decode(key).expect("hex");
        Box::new(Rijndael::new(&key, 128).expect("AES-128"))
    }

    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const IV: &str = "000102030405060708090a0b0c0d0e0f";

    // NIST SP 800-38A, appendix F.
    #[test]
    fn cbc_matches_sp800_38a() {
        let iv = hex::decode(IV).expect("hex");
        let mut data = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51")
            .expect("hex");
        ModeEngine::cbc(aes(KEY), &iv).encrypt(&mut data);
        assert_eq!(
            hex::encode(&data),
            "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
        );
        ModeEngine::cbc(aes(KEY), &iv).decrypt(&mut data);
        assert_eq!(
            hex::encode(&data),
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51"
        );
    }

    #[test]
    fn cfb8_matches_sp800_38a() {
        let iv = hex::decode(IV).expect("hex");
        let plain = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d").expect("hex");
        let mut data = plain.clone();
        ModeEngine::cfb(aes(KEY), &iv, 1).encrypt(&mut data);
        assert_eq!(hex::encode(&data), "3b79424c9c0dd436bace9e0ed4586a4f32b9");
        ModeEngine::cfb(aes(KEY), &iv, 1).decrypt(&mut data);
        assert_eq!(data, plain);
    }

    #[test]
    fn cfb128_matches_sp800_38a() {
        let iv = hex::decode(IV).expect("hex");
        let mut data = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51")
            .expect("hex");
        ModeEngine::cfb(aes(KEY), &iv, 16).encrypt(&mut data);
        assert_eq!(
            hex::encode(&data),
            "3b3fd92eb72dad20333449f8e83cfb4ac8a64537a0b3a93fcde3cdad9f1ce58b"
        );
    }

    #[test]
    fn ecb_repeats_equal_blocks() {
        let mut data = [0u8; 48];
        ModeEngine::ecb(aes(KEY)).encrypt(&mut data);
        assert_eq!(data[..16], data[16..32]);
        assert_eq!(data[..16], data[32..]);
    }

    #[test]
    fn chaining_state_carries_across_calls() {
        let iv = hex::decode(IV).expect("hex");
        let mut whole = [7u8; 32];
        ModeEngine::cfb(aes(KEY), &iv, 4).encrypt(&mut whole);

        let mut split = [7u8; 32];
        let mut engine = ModeEngine::cfb(aes(KEY), &iv, 4);
        let (head, tail) = split.split_at_mut(12);
        engine.encrypt(head);
        engine.encrypt(tail);
        assert_eq!(whole, split);
    }
}
