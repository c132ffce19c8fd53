//! Expected ciphertexts and key material, parsed from embedded fixtures.
//!
//! Fixture files are whitespace-separated records, one per line, with `#`
//! comments. `keys.txt` holds `family algorithm key_bits block_bits key iv`;
//! every other file holds `algorithm key_bits block_bits mode padding
//! feedback plaintext ciphertext`, with `-` for an absent feedback size.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use modecheck_transform::{Algorithm, CipherConfiguration, CipherMode, ConfigError};

use crate::error::{CaseId, Failure, FixtureError};
use crate::plaintext::{KeyFamily, Plaintext};

/// A named fixture: file name and contents.
pub type Fixture<'a> = (&'static str, &'a str);

const KEYS: Fixture<'static> = ("keys.txt", include_str!("../fixtures/keys.txt"));

const VECTORS: [Fixture<'static>; 5] = [
    ("des.txt", include_str!("../fixtures/des.txt")),
    ("tripledes.txt", include_str!("../fixtures/tripledes.txt")),
    ("rc2.txt", include_str!("../fixtures/rc2.txt")),
    ("rijndael.txt", include_str!("../fixtures/rijndael.txt")),
    ("rijndael_cfb.txt", include_str!("../fixtures/rijndael_cfb.txt")),
];

/// Key and IV for one case. The IV is present even for ECB.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl KeyMaterial {
    /// Key material from owned bytes.
    pub fn new(key: Vec<u8>, iv: Vec<u8>) -> Self {
        Self { key, iv }
    }

    /// Key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// IV bytes.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl core::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &hex::encode(&self.key))
            .field("iv", &hex::encode(&self.iv))
            .finish()
    }
}

type KeyIndex = (KeyFamily, Algorithm, usize, usize);

/// Read-only table of known-answer vectors.
#[derive(Debug, Default)]
pub struct VectorRepository {
    vectors: HashMap<CaseId, Vec<u8>>,
    keys: HashMap<KeyIndex, KeyMaterial>,
    groups: HashSet<(Algorithm, CipherMode, Plaintext)>,
}

impl VectorRepository {
    /// Process-wide repository over the embedded fixtures.
    pub fn standard() -> Result<&'static VectorRepository, FixtureError> {
        static REPOSITORY: OnceLock<Result<VectorRepository, FixtureError>> = OnceLock::new();
        REPOSITORY
            .get_or_init(|| Self::parse(KEYS, &VECTORS))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Parses a key fixture and any number of vector fixtures.
    pub fn parse(keys: Fixture<'_>, vectors: &[Fixture<'_>]) -> Result<Self, FixtureError> {
        let mut repository = Self::default();
        for record in records(keys, 6) {
            let (line, fields) = record?;
            let at = Location { file: keys.0, line };
            let family: KeyFamily = at.parse_name(fields[0])?;
            let algorithm: Algorithm = at.parse_name(fields[1])?;
            let index = (family, algorithm, at.bits(fields[2])?, at.bits(fields[3])?);
            let material = KeyMaterial::new(at.hex(fields[4])?, at.hex(fields[5])?);
            if repository.keys.insert(index, material).is_some() {
                return Err(FixtureError::Duplicate { file: keys.0, line });
            }
        }

        for &fixture in vectors {
            for record in records(fixture, 8) {
                let (line, fields) = record?;
                let at = Location { file: fixture.0, line };
                let mut builder = CipherConfiguration::builder(at.parse_name(fields[0])?)
                    .key_size(at.bits(fields[1])?)
                    .block_size(at.bits(fields[2])?)
                    .mode(at.parse_name(fields[3])?)
                    .padding(at.parse_name(fields[4])?);
                if fields[5] != "-" {
                    builder = builder.feedback_size(at.bits(fields[5])?);
                }
                let config = builder.build().map_err(|source| at.config(source))?;
                let case = CaseId::new(config, at.parse_name(fields[6])?);
                let ciphertext = at.hex(fields[7])?;
                if repository.vectors.insert(case, ciphertext).is_some() {
                    return Err(FixtureError::Duplicate {
                        file: fixture.0,
                        line,
                    });
                }
                repository
                    .groups
                    .insert((config.algorithm(), config.mode(), case.plaintext));
            }
        }
        tracing::debug!(
            vectors = repository.vectors.len(),
            keys = repository.keys.len(),
            "loaded vector repository"
        );
        Ok(repository)
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the repository holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Whether vectors exist for this case's (algorithm, mode, plaintext)
    /// group, so a missing one is a fixture defect rather than a gap.
    pub fn covers(&self, config: &CipherConfiguration, plaintext: Plaintext) -> bool {
        self.groups
            .contains(&(config.algorithm(), config.mode(), plaintext))
    }

    /// Expected ciphertext for `config` encrypting `plaintext`.
    pub fn expected_ciphertext(
        &self,
        config: &CipherConfiguration,
        plaintext: Plaintext,
    ) -> Result<&[u8], Failure> {
        let case = CaseId::new(*config, plaintext);
        self.vectors
            .get(&case)
            .map(Vec::as_slice)
            .ok_or(Failure::MissingVector { case })
    }

    /// Key and IV the vector for `config` and `plaintext` was computed with.
    pub fn key_material(
        &self,
        config: &CipherConfiguration,
        plaintext: Plaintext,
    ) -> Result<&KeyMaterial, Failure> {
        let index = (
            plaintext.key_family(),
            config.algorithm(),
            config.key_size(),
            config.block_size(),
        );
        self.keys
            .get(&index)
            .ok_or(Failure::MissingKeyMaterial {
                case: CaseId::new(*config, plaintext),
            })
    }
}

/// Non-comment lines of a fixture, split into exactly `width` fields.
fn records<'a>(
    fixture: Fixture<'a>,
    width: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&'a str>), FixtureError>> + 'a {
    let (file, text) = fixture;
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(move |(line, content)| {
            let fields: Vec<&str> = content.split_whitespace().collect();
            if fields.len() != width {
                return Err(FixtureError::Fields {
                    file,
                    line,
                    expected: width,
                    found: fields.len(),
                });
            }
            Ok((line, fields))
        })
}

struct Location {
    file: &'static str,
    line: usize,
}

impl Location {
    fn bits(&self, field: &str) -> Result<usize, FixtureError> {
        field.parse().map_err(|_| FixtureError::Number {
            file: self.file,
            line: self.line,
            value: field.to_string(),
        })
    }

    fn hex(&self, field: &str) -> Result<Vec<u8>, FixtureError> {
        hex::decode(field).map_err(|source| FixtureError::Hex {
            file: self.file,
            line: self.line,
            source,
        })
    }

    fn parse_name<T>(&self, field: &str) -> Result<T, FixtureError>
    where
        T: core::str::FromStr<Err = ConfigError>,
    {
        field.parse().map_err(|source| self.config(source))
    }

    fn config(&self, source: ConfigError) -> FixtureError {
        FixtureError::Config {
            file: self.file,
            line: self.line,
            source,
        }
    }
}
