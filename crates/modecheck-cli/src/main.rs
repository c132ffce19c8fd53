//! Command-line interface for `modecheck`.

#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use modecheck_harness::{
    ConfigurationMatrix, ConformanceRunner, DriveStrategy, Plaintext, RunOptions,
    SymmetricProvider, TransformDriver, VectorRepository,
};
use modecheck_transform::{
    Algorithm, CipherConfiguration, CipherMode, PaddingMode, SymmetricAlgorithm,
};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

/// Block-cipher mode conformance CLI.
#[derive(Parser)]
#[command(
    name = "modecheck",
    version,
    author,
    about = "Conformance checks for symmetric block-cipher modes and padding"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// One configuration tuple.
#[derive(Args)]
struct ConfigArgs {
    /// DES, TripleDES, RC2 or Rijndael.
    #[arg(long)]
    algorithm: Algorithm,
    /// Key size in bits (defaults to the algorithm's default).
    #[arg(long)]
    key_size: Option<usize>,
    /// Block size in bits (defaults to the algorithm's default).
    #[arg(long)]
    block_size: Option<usize>,
    /// ECB, CBC, CFB, OFB or CTS.
    #[arg(long, default_value = "CBC")]
    mode: CipherMode,
    /// None, Zeros, PKCS7, ANSIX923 or ISO10126.
    #[arg(long, default_value = "PKCS7")]
    padding: PaddingMode,
    /// CFB feedback size in bits.
    #[arg(long)]
    feedback: Option<usize>,
}

impl ConfigArgs {
    fn build(&self) -> Result<CipherConfiguration> {
        let mut builder = CipherConfiguration::builder(self.algorithm)
            .mode(self.mode)
            .padding(self.padding);
        if let Some(bits) = self.key_size {
            builder = builder.key_size(bits);
        }
        if let Some(bits) = self.block_size {
            builder = builder.block_size(bits);
        }
        if let Some(bits) = self.feedback {
            builder = builder.feedback_size(bits);
        }
        builder.build().context("invalid configuration")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the configuration matrix.
    List {
        /// Only this algorithm.
        #[arg(long)]
        algorithm: Option<Algorithm>,
        /// Print the configurations that must be refused instead.
        #[arg(long, default_value_t = false)]
        illegal: bool,
    },
    /// Run the conformance suite against the built-in transforms.
    Run {
        /// Only this algorithm.
        #[arg(long)]
        algorithm: Option<Algorithm>,
        /// Only configurations in this mode.
        #[arg(long)]
        mode: Option<CipherMode>,
        /// Worker threads; algorithms are split between them.
        #[arg(long, default_value_t = 1)]
        jobs: usize,
        /// Stop at the first failure.
        #[arg(long, default_value_t = false)]
        fail_fast: bool,
    },
    /// Print the expected vector and key material for one case.
    Vector {
        #[command(flatten)]
        config: ConfigArgs,
        /// exact, partial or descending.
        #[arg(long, default_value = "exact")]
        plaintext: Plaintext,
    },
    /// Run one transform over hex input and print the hex output.
    Encrypt {
        #[command(flatten)]
        config: ConfigArgs,
        /// Key as hex.
        #[arg(long, value_name = "HEX")]
        key_hex: String,
        /// IV as hex (one block, also required for ECB).
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
        /// Input bytes as hex.
        #[arg(long, value_name = "HEX")]
        input_hex: String,
        /// Decrypt instead of encrypt.
        #[arg(long, default_value_t = false)]
        decrypt: bool,
        /// Feed the input in chunks of this many bytes.
        #[arg(long)]
        chunk: Option<usize>,
        /// Optional RNG seed for reproducible ISO10126 filler.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::List { algorithm, illegal } => cmd_list(algorithm, illegal),
        Commands::Run {
            algorithm,
            mode,
            jobs,
            fail_fast,
        } => cmd_run(
            algorithm,
            RunOptions {
                jobs,
                fail_fast,
                mode,
            },
        ),
        Commands::Vector { config, plaintext } => cmd_vector(&config, plaintext),
        Commands::Encrypt {
            config,
            key_hex,
            iv_hex,
            input_hex,
            decrypt,
            chunk,
            seed,
        } => cmd_encrypt(&config, &key_hex, &iv_hex, &input_hex, decrypt, chunk, seed),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn selected(matrix: &ConfigurationMatrix, algorithm: Option<Algorithm>) -> Vec<Algorithm> {
    matrix
        .algorithms()
        .filter(|candidate| algorithm.map_or(true, |wanted| wanted == *candidate))
        .collect()
}

fn cmd_list(algorithm: Option<Algorithm>, illegal: bool) -> Result<()> {
    let matrix = ConfigurationMatrix::standard();
    let algorithms = selected(matrix, algorithm);
    if algorithms.is_empty() {
        bail!("no profile for the requested algorithm");
    }
    let mut count = 0;
    for algorithm in algorithms {
        if illegal {
            for (config, reason) in matrix.illegal_configurations(algorithm) {
                println!("{config}  -> {reason}");
                count += 1;
            }
        } else {
            for config in matrix.legal_configurations(algorithm) {
                println!("{config}");
                count += 1;
            }
        }
    }
    println!("{count} configurations");
    Ok(())
}

fn cmd_run(algorithm: Option<Algorithm>, options: RunOptions) -> Result<()> {
    let matrix = ConfigurationMatrix::standard();
    let vectors = VectorRepository::standard().context("load vector fixtures")?;
    let runner = ConformanceRunner::new(matrix, vectors, SymmetricProvider).with_options(options);
    let report = match algorithm {
        Some(algorithm) => runner.run_algorithm(algorithm),
        None => runner.run_matrix(),
    };
    for failure in report.failures() {
        println!("FAIL {failure}");
    }
    println!("{report}");
    if !report.is_success() {
        bail!("{} case(s) failed", report.failures().len());
    }
    Ok(())
}

fn cmd_vector(args: &ConfigArgs, plaintext: Plaintext) -> Result<()> {
    let config = args.build()?;
    let matrix = ConfigurationMatrix::standard();
    let vectors = VectorRepository::standard().context("load vector fixtures")?;
    let block = matrix.transform_block_size(&config);
    let material = vectors.key_material(&config, plaintext)?;

    println!("configuration: {config}");
    println!("key: {}", hex::encode(material.key()));
    println!("iv: {}", hex::encode(material.iv()));
    println!("plaintext: {}", hex::encode(plaintext.bytes(&config, block)));
    if vectors.covers(&config, plaintext) {
        let ciphertext = vectors.expected_ciphertext(&config, plaintext)?;
        println!("ciphertext: {}", hex::encode(ciphertext));
    } else {
        println!("ciphertext: (no vectors recorded for this group)");
    }
    Ok(())
}

fn cmd_encrypt(
    args: &ConfigArgs,
    key_hex: &str,
    iv_hex: &str,
    input_hex: &str,
    decrypt: bool,
    chunk: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let config = args.build()?;
    let key = hex::decode(key_hex.trim()).context("decode key hex")?;
    let iv = hex::decode(iv_hex.trim()).context("decode iv hex")?;
    let input = hex::decode(input_hex.trim()).context("decode input hex")?;

    let algorithm = SymmetricAlgorithm::new(config).context("configuration refused")?;
    let rng = seeded_rng(seed);
    let mut transform = if decrypt {
        algorithm.create_decryptor_with_rng(&key, &iv, rng)
    } else {
        algorithm.create_encryptor_with_rng(&key, &iv, rng)
    }
    .context("create transform")?;

    let strategy = chunk.map_or(DriveStrategy::WholeBlock, DriveStrategy::Chunked);
    let output = TransformDriver::new(config.transform_block_bytes(), strategy)
        .drive(&mut transform, &input)
        .context("transform failed")?;
    println!("{}", hex::encode(output));
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng + Send + 'static {
    let mut seed_bytes = [0u8; 32];
    match seed {
        Some(value) => seed_bytes[..8].copy_from_slice(&value.to_le_bytes()),
        None => rand::rngs::OsRng.fill_bytes(&mut seed_bytes),
    }
    ChaCha20Rng::from_seed(seed_bytes)
}
