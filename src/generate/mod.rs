//! Candidate generation.
//!
//! Workers only see the [`CandidateSource`] contract: a word expands into a
//! finite, lazy sequence of variants, and each variant is enhanced before
//! dedup. Both steps are pure, so every pass over a word yields the same
//! candidates and the worker's seen set filters repeats.
//! [`Leetspeak`] is the substitution-table implementation.

pub mod enhance;
pub mod variations;

pub use enhance::enhance;
pub use variations::Variations;

use blake3::Hasher;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

use crate::config::GenerationConfig;
use crate::model::Candidate;

/// Pure expansion of a seed word into candidates.
pub trait CandidateSource: Send + Sync + 'static {
    type Variants: Iterator<Item = Candidate> + Send;

    /// Finite lazy sequence of raw variants of `word`.
    fn variations(&self, word: &str) -> Self::Variants;

    /// Transform a raw variant into its final candidate form. The same
    /// variant always yields the same candidate.
    fn enhance(&self, variant: Candidate) -> Candidate;
}

/// Character-substitution expansion followed by complexity enhancement.
#[derive(Debug, Clone)]
pub struct Leetspeak {
    substitutions: HashMap<char, Vec<String>>,
    numbers: Vec<char>,
    symbols: Vec<char>,
    seed: u64,
}

impl Leetspeak {
    pub fn new(
        substitutions: HashMap<char, Vec<String>>,
        numbers: Vec<char>,
        symbols: Vec<char>,
    ) -> Self {
        Self {
            substitutions,
            numbers,
            symbols,
            seed: 0,
        }
    }

    /// Pick a different, still fixed, enhancement for every variant.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Random choices for `variant`, derived from the variant and the seed.
    ///
    /// blake3 keeps the derivation identical across builds and platforms, so
    /// a rerun over an existing database regenerates what it already holds.
    fn rng_for(&self, variant: &str) -> StdRng {
        let mut hasher = Hasher::new();
        hasher.update(b"seed:");
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(b"variant:");
        hasher.update(variant.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.substitution_table(),
            config.numbers.clone(),
            config.symbols.clone(),
        )
    }
}

impl CandidateSource for Leetspeak {
    type Variants = Variations;

    fn variations(&self, word: &str) -> Variations {
        Variations::for_word(word, &self.substitutions)
    }

    fn enhance(&self, variant: Candidate) -> Candidate {
        let mut rng = self.rng_for(&variant);
        enhance(&variant, &self.numbers, &self.symbols, &mut rng)
    }
}
