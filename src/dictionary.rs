//! Seed word loading and partitioning across workers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

use crate::config::DictionaryConfig;
use crate::error::Result;

/// Used when the dictionary is missing, unreadable, or has no usable words.
pub const FALLBACK_WORDS: &[&str] = &["cat", "dog", "sun", "bird", "password", "hello"];

/// Load the seed words named by `config`, falling back to [`FALLBACK_WORDS`].
///
/// A missing dictionary is never fatal: it is logged as a warning.
pub fn load_words(config: &DictionaryConfig) -> Vec<String> {
    match read_words(&config.path, config.min_word_length, config.max_word_length) {
        Ok(words) if !words.is_empty() => {
            info!(path = %config.path.display(), count = words.len(), "loaded dictionary");
            words
        }
        Ok(_) => {
            warn!(
                path = %config.path.display(),
                min = config.min_word_length,
                max = config.max_word_length,
                "dictionary has no words in the length range, using fallback words"
            );
            fallback_words()
        }
        Err(e) => {
            warn!(path = %config.path.display(), "dictionary not available ({e}), using fallback words");
            fallback_words()
        }
    }
}

/// Read trimmed, lowercased words whose length (in characters) is within
/// `min..=max`. Lines that are not valid UTF-8 are skipped.
pub fn read_words(path: &Path, min: usize, max: usize) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut words = Vec::new();

    for line in reader.split(b'\n') {
        let line = line?;
        let Ok(text) = std::str::from_utf8(&line) else {
            continue;
        };
        let word = text.trim();
        if (min..=max).contains(&word.chars().count()) {
            words.push(word.to_lowercase());
        }
    }

    Ok(words)
}

pub fn fallback_words() -> Vec<String> {
    FALLBACK_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Split `words` into at most `parts` contiguous, non-empty chunks whose
/// sizes differ by at most one. Fewer chunks come back when there are fewer
/// words than parts.
pub fn partition(words: Vec<String>, parts: usize) -> Vec<Vec<String>> {
    if words.is_empty() {
        return Vec::new();
    }
    let parts = parts.clamp(1, words.len());
    let base = words.len() / parts;
    let extra = words.len() % parts;

    let mut rest = words.into_iter();
    (0..parts)
        .map(|i| {
            let size = base + usize::from(i < extra);
            rest.by_ref().take(size).collect()
        })
        .collect()
}
