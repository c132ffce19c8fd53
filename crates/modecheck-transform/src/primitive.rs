//! Keyed single-block ciphers behind one object-safe trait.

use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde2, TdesEde3};
use rc2::Rc2;
use rijndael_core::Rijndael;

use crate::config::{Algorithm, CipherConfiguration};
use crate::error::TransformError;

/// A keyed block cipher operating in place on exactly one block.
pub trait BlockPrimitive: Send {
    /// Block length in bytes.
    fn block_size(&self) -> usize;
    /// Encrypts one block in place.
    fn encrypt_block(&self, block: &mut [u8]);
    /// Decrypts one block in place.
    fn decrypt_block(&self, block: &mut [u8]);
}

/// Adapter for RustCrypto block ciphers.
pub struct RustCryptoBlock<C>(C);

impl<C> BlockPrimitive for RustCryptoBlock<C>
where
    C: BlockEncrypt + BlockDecrypt + Send,
{
    fn block_size(&self) -> usize {
        C::block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.0.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.0.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

impl BlockPrimitive for Rijndael {
    fn block_size(&self) -> usize {
        Rijndael::block_size(self).bytes()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        Rijndael::encrypt_block(self, block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        Rijndael::decrypt_block(self, block);
    }
}

fn keyed<C: KeyInit>(key: &[u8]) -> Result<C, TransformError> {
    C::new_from_slice(key).map_err(|_| TransformError::InvalidKeyLength {
        expected: C::key_size(),
        actual: key.len(),
    })
}

/// Keys the primitive for `config`. Sizes must already be validated.
pub(crate) fn new_primitive(
    config: &CipherConfiguration,
    key: &[u8],
) -> Result<Box<dyn BlockPrimitive>, TransformError> {
    let primitive: Box<dyn BlockPrimitive> = match config.algorithm() {
        Algorithm::Des => Box::new(RustCryptoBlock(keyed::<Des>(key)?)),
        Algorithm::TripleDes if key.len() == 16 => {
            Box::new(RustCryptoBlock(keyed::<TdesEde2>(key)?))
        }
        Algorithm::TripleDes => Box::new(RustCryptoBlock(keyed::<TdesEde3>(key)?)),
        Algorithm::Rc2 => Box::new(RustCryptoBlock(Rc2::new_with_eff_key_len(
            key,
            key.len() * 8,
        ))),
        Algorithm::Rijndael => Box::new(Rijndael::new(key, config.block_size()).map_err(
            |_| TransformError::InvalidKeyLength {
                expected: config.key_bytes(),
                actual: key.len(),
            },
        )?),
    };
    Ok(primitive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(algorithm: Algorithm, key_bits: usize) -> CipherConfiguration {
        CipherConfiguration::builder(algorithm)
            .key_size(key_bits)
            .build()
            .expect("valid configuration")
    }

    #[test]
    fn des_single_block_known_answer() {
        let key = hex::decode("12e77bbf11909db0").expect("hex");
        let des = new_primitive(&config(Algorithm::Des, 64), &key).expect("keyed");
        let mut block = [0u8; 8];
        des.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "4b636d2ca70b771c");
        des.decrypt_block(&mut block);
        assert_eq!(block, [0u8; 8]);
    }

    #[test]
    fn rc2_uses_key_length_as_effective_bits() {
        // RFC 2268 section 5, 64-bit key with 64 effective bits.
        let key = hex::decode("ffffffffffffffff").expect("hex");
        let rc2 = new_primitive(&config(Algorithm::Rc2, 64), &key).expect("keyed");
        let mut block = [0xffu8; 8];
        rc2.encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "278b27e42e2f0d49");
    }

    #[test]
    fn two_key_triple_des_equals_repeated_first_key() {
        let key = hex::decode("0123456789abcdeffedcba9876543210").expect("hex");
        let mut three = key.clone();
        three.extend_from_slice(&key[..8]);
        let ede2 = new_primitive(&config(Algorithm::TripleDes, 128), &key).expect("keyed");
        let ede3 = new_primitive(&config(Algorithm::TripleDes, 192), &three).expect("keyed");
        let mut a = *b"modechek";
        let mut b = a;
        ede2.encrypt_block(&mut a);
        ede3.encrypt_block(&mut b);
        assert_eq!(a, b);
        assert_eq!(ede2.block_size(), 8);
    }

    #[test]
    fn rijndael_reports_its_block_size() {
        let rijndael = new_primitive(
            &CipherConfiguration::builder(Algorithm::Rijndael)
                .key_size(128)
                .block_size(256)
                .build()
                .expect("valid"),
            &[0u8; 16],
        )
        .expect("keyed");
        assert_eq!(rijndael.block_size(), 32);
    }
}
