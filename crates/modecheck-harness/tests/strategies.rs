use modecheck_harness::{
    anticipated_failure, check_equivalent, check_round_trip, ComparisonMask, ConfigurationMatrix,
    DriveStrategy, Plaintext, SymmetricProvider, TransformDriver, TransformProvider,
    VectorRepository,
};
use modecheck_transform::{CipherConfiguration, Direction};
use proptest::prelude::*;
use proptest::sample::Index;

fn legal() -> Vec<CipherConfiguration> {
    let matrix = ConfigurationMatrix::standard();
    matrix
        .algorithms()
        .flat_map(|algorithm| matrix.legal_configurations(algorithm))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn chunk_size_never_changes_the_result(
        pick in any::<Index>(),
        chunk in 1usize..48,
        input in proptest::collection::vec(any::<u8>(), 0..80),
    ) {
        let configs = legal();
        let config = *pick.get(&configs);
        let matrix = ConfigurationMatrix::standard();
        let block = matrix.transform_block_size(&config);
        prop_assume!(anticipated_failure(&config, block, input.len()).is_none());

        let material = VectorRepository::standard()
            .expect("fixtures")
            .key_material(&config, Plaintext::Exact)
            .expect("key material");
        let run = |direction, data: &[u8], strategy| {
            let mut transform = SymmetricProvider
                .create(&config, material, direction)
                .expect("legal configuration");
            TransformDriver::new(block, strategy).drive(transform.as_mut(), data)
        };

        let whole = run(Direction::Encrypt, &input, DriveStrategy::WholeBlock).expect("encrypt");
        let chunked = run(Direction::Encrypt, &input, DriveStrategy::Chunked(chunk)).expect("encrypt");
        let mask = ComparisonMask::for_ciphertext(&config, block, input.len());
        prop_assert!(check_equivalent(&whole, &chunked, &mask).is_ok(), "{config}");

        let recovered = run(Direction::Decrypt, &chunked, DriveStrategy::Chunked(chunk)).expect("decrypt");
        prop_assert!(check_round_trip(&input, &recovered, config.padding()).is_ok(), "{config}");
    }
}
