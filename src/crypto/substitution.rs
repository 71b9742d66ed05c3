//! Keyed substitution cipher for export strings.
//!
//! This is a tamper deterrent, not encryption: a single fixed substitution
//! over a small alphabet falls to frequency analysis. Use the sealed-file
//! cipher for anything that needs confidentiality.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Transform applied to export strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    /// Identity.
    #[default]
    None,
    /// Secret-seeded permutation of the alphabet.
    Substitution,
}

/// Which way to run the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Derive the permutation of `alphabet` for `secret`.
///
/// The seed is the SHA-256 digest of the secret, so the same secret always
/// yields the same permutation.
pub fn permutation(secret: &str, alphabet: &[char]) -> Vec<char> {
    let seed: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
    let mut rng = Xoshiro256PlusPlus::from_seed(seed);

    let mut shuffled = alphabet.to_vec();
    shuffled.shuffle(&mut rng);
    shuffled
}

/// A prepared keyed transform. Identity when no secret is configured.
#[derive(Debug, Clone, Default)]
pub struct KeyedTransform {
    forward: HashMap<char, char>,
    inverse: HashMap<char, char>,
}

impl KeyedTransform {
    /// Prepare a transform.
    ///
    /// An empty secret or `CipherMode::None` yields the identity. In
    /// substitution mode the alphabet must not repeat characters.
    pub fn new(mode: CipherMode, secret: &str, alphabet: &str) -> Result<Self> {
        if mode == CipherMode::None || secret.is_empty() {
            return Ok(Self::identity());
        }

        let chars: Vec<char> = alphabet.chars().collect();
        if chars.is_empty() {
            return Err(Error::InvalidAlphabet("alphabet is empty".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = chars.iter().find(|c| !seen.insert(**c)) {
            return Err(Error::InvalidAlphabet(format!(
                "character {:?} appears more than once",
                dup
            )));
        }

        let permuted = permutation(secret, &chars);
        let forward: HashMap<char, char> =
            chars.iter().copied().zip(permuted.iter().copied()).collect();
        let inverse = forward.iter().map(|(k, v)| (*v, *k)).collect();

        Ok(Self { forward, inverse })
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.forward.is_empty()
    }

    /// Map every alphabet character of `text`; others pass through.
    pub fn apply(&self, text: &str, direction: Direction) -> String {
        let table = match direction {
            Direction::Encode => &self.forward,
            Direction::Decode => &self.inverse,
        };
        if table.is_empty() {
            return text.to_string();
        }
        text.chars()
            .map(|c| table.get(&c).copied().unwrap_or(c))
            .collect()
    }

    pub fn encode(&self, text: &str) -> String {
        self.apply(text, Direction::Encode)
    }

    pub fn decode(&self, text: &str) -> String {
        self.apply(text, Direction::Decode)
    }
}

/// One-shot form of [`KeyedTransform::apply`].
pub fn transform(
    text: &str,
    mode: CipherMode,
    secret: &str,
    direction: Direction,
    alphabet: &str,
) -> Result<String> {
    Ok(KeyedTransform::new(mode, secret, alphabet)?.apply(text, direction))
}
