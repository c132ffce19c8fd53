use modecheck_transform::{
    Algorithm, CipherConfiguration, CipherMode, CryptoTransform, ErrorKind, PaddingMode,
    SymmetricAlgorithm, SymmetricTransform,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn algorithm(config: CipherConfiguration) -> SymmetricAlgorithm {
    SymmetricAlgorithm::new(config).expect("legal configuration")
}

fn feed(transform: &mut SymmetricTransform, input: &[u8], chunks: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = input;
    let mut buf = vec![0u8; input.len() + 64];
    for &size in chunks {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(size.min(rest.len()));
        let n = transform.transform_block(head, &mut buf).expect("transform_block");
        out.extend_from_slice(&buf[..n]);
        rest = tail;
    }
    out.extend(transform.transform_final_block(rest).expect("transform_final_block"));
    out
}

fn rijndael_cfb(feedback: usize, padding: PaddingMode) -> CipherConfiguration {
    CipherConfiguration::builder(Algorithm::Rijndael)
        .key_size(128)
        .block_size(192)
        .mode(CipherMode::Cfb)
        .padding(padding)
        .feedback_size(feedback)
        .build()
        .expect("valid")
}

#[test]
fn des_ecb_known_answer_round_trips() {
    let config = CipherConfiguration::builder(Algorithm::Des)
        .mode(CipherMode::Ecb)
        .padding(PaddingMode::None)
        .build()
        .expect("valid");
    let key = hex::decode("12e77bbf11909db0").expect("hex");
    let iv = [0u8; 8];
    let mut enc = algorithm(config).create_encryptor(&key, &iv).expect("encryptor");
    let cipher = feed(&mut enc, &[0u8; 16], &[8]);
    assert_eq!(hex::encode(&cipher), "4b636d2ca70b771c4b636d2ca70b771c");

    let mut dec = algorithm(config).create_decryptor(&key, &iv).expect("decryptor");
    assert_eq!(feed(&mut dec, &cipher, &[1; 16]), vec![0u8; 16]);
}

#[test]
fn rc2_none_rejects_seventeen_bytes() {
    let config = CipherConfiguration::builder(Algorithm::Rc2)
        .key_size(40)
        .mode(CipherMode::Ecb)
        .padding(PaddingMode::None)
        .build()
        .expect("valid");
    let mut enc = algorithm(config)
        .create_encryptor(&[0x42; 5], &[0u8; 8])
        .expect("encryptor");
    let mut out = [0u8; 32];
    assert_eq!(enc.transform_block(&[0u8; 16], &mut out), Ok(16));
    let err = enc.transform_final_block(&[0u8; 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFinalBlock);
}

#[test]
fn rijndael_cfb_uses_feedback_as_transform_block() {
    let config = rijndael_cfb(24, PaddingMode::Pkcs7);
    let enc = algorithm(config)
        .create_encryptor(&[0u8; 16], &[0u8; 24])
        .expect("encryptor");
    assert_eq!(enc.input_block_size(), 3);
    assert_eq!(enc.output_block_size(), 3);
}

#[test]
fn pkcs7_grows_aligned_input_by_a_full_block() {
    let config = rijndael_cfb(24, PaddingMode::Pkcs7);
    let mut enc = algorithm(config)
        .create_encryptor(&[0u8; 16], &[0u8; 24])
        .expect("encryptor");
    assert_eq!(feed(&mut enc, &[9u8; 6], &[]).len(), 9);
}

#[test]
fn tampered_padding_is_rejected() {
    let config = CipherConfiguration::builder(Algorithm::TripleDes)
        .mode(CipherMode::Cbc)
        .padding(PaddingMode::Pkcs7)
        .build()
        .expect("valid");
    let key = [0x5a; 24];
    let iv = [0x11; 8];
    let mut enc = algorithm(config).create_encryptor(&key, &iv).expect("encryptor");
    let mut cipher = feed(&mut enc, b"eleven byte", &[]);
    // Flips the last pad byte of the recovered plaintext from 5 to 4.
    cipher[7] ^= 0x01;
    let mut dec = algorithm(config).create_decryptor(&key, &iv).expect("decryptor");
    let err = dec.transform_final_block(&cipher).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPadding);
}

#[test]
fn seeded_iso10126_encryptions_are_reproducible() {
    let config = CipherConfiguration::builder(Algorithm::Rc2)
        .padding(PaddingMode::Iso10126)
        .build()
        .expect("valid");
    let key = [3u8; 16];
    let iv = [4u8; 8];
    let encrypt = |seed: u64| {
        let mut enc = algorithm(config)
            .create_encryptor_with_rng(&key, &iv, ChaCha20Rng::seed_from_u64(seed))
            .expect("encryptor");
        feed(&mut enc, &[0u8; 20], &[])
    };
    assert_eq!(encrypt(1), encrypt(1));
    assert_ne!(encrypt(1), encrypt(2));
    // Only the filler of the final block differs.
    assert_eq!(encrypt(1)[..16], encrypt(2)[..16]);
}

fn legal_configuration() -> impl Strategy<Value = CipherConfiguration> {
    let modes = prop::sample::select(vec![CipherMode::Ecb, CipherMode::Cbc, CipherMode::Cfb]);
    let paddings = prop::sample::select(PaddingMode::ALL.to_vec());
    (
        prop::sample::select(Algorithm::ALL.to_vec()),
        modes,
        paddings,
        prop::sample::select(vec![128usize, 192, 256]),
        1usize..=4,
    )
        .prop_map(|(algorithm, mode, padding, block, feedback_bytes)| {
            let mut builder = CipherConfiguration::builder(algorithm)
                .mode(mode)
                .padding(padding);
            if algorithm == Algorithm::Rijndael {
                builder = builder.block_size(block).key_size(block);
                if mode == CipherMode::Cfb {
                    builder = builder.feedback_size(feedback_bytes * 8);
                }
            }
            builder.build().expect("valid")
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn chunking_does_not_change_output(
        config in legal_configuration(),
        blocks in 0usize..4,
        chunks in prop::collection::vec(1usize..20, 0..12),
        seed in any::<u64>(),
    ) {
        let algorithm = algorithm(config);
        let tbs = config.transform_block_bytes();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut key = vec![0u8; config.key_bytes()];
        let mut iv = vec![0u8; config.block_bytes()];
        rand::RngCore::fill_bytes(&mut rng, &mut key);
        rand::RngCore::fill_bytes(&mut rng, &mut iv);
        let input: Vec<u8> = (0..blocks * tbs).map(|i| i as u8).collect();

        let mut whole = algorithm
            .create_encryptor_with_rng(&key, &iv, ChaCha20Rng::seed_from_u64(seed))
            .expect("encryptor");
        let mut split = algorithm
            .create_encryptor_with_rng(&key, &iv, ChaCha20Rng::seed_from_u64(seed))
            .expect("encryptor");
        let expected = feed(&mut whole, &input, &[]);
        let cipher = feed(&mut split, &input, &chunks);
        prop_assert_eq!(&cipher, &expected);

        let mut dec = algorithm.create_decryptor(&key, &iv).expect("decryptor");
        let recovered = feed(&mut dec, &cipher, &chunks);
        if config.padding() == PaddingMode::Zeros {
            prop_assert_eq!(&recovered[..input.len()], &input[..]);
        } else {
            prop_assert_eq!(recovered, input);
        }
    }
}
