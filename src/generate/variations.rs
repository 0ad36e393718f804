//! Lazy cartesian product over per-character substitution options.

use std::collections::HashMap;

use crate::model::Candidate;

/// Iterator over every combination of per-position options.
///
/// The rightmost position varies fastest. Nothing beyond the option table
/// and an odometer is kept in memory, so long words with many substitutions
/// stay cheap to walk.
#[derive(Debug, Clone)]
pub struct Variations {
    options: Vec<Vec<String>>,
    cursor: Vec<usize>,
    done: bool,
}

impl Variations {
    /// Build from explicit per-position options.
    ///
    /// Yields nothing when there are no positions or any position has no
    /// options.
    pub fn new(options: Vec<Vec<String>>) -> Self {
        let done = options.is_empty() || options.iter().any(|o| o.is_empty());
        let cursor = vec![0; options.len()];
        Self {
            options,
            cursor,
            done,
        }
    }

    /// Options for each character of `word` (lowercased): its replacement
    /// glyphs, or the character itself when it has none, plus its uppercase
    /// form.
    pub fn for_word(word: &str, substitutions: &HashMap<char, Vec<String>>) -> Self {
        let options = word
            .to_lowercase()
            .chars()
            .map(|c| {
                let mut choices = substitutions
                    .get(&c)
                    .cloned()
                    .unwrap_or_else(|| vec![c.to_string()]);
                let upper: String = c.to_uppercase().collect();
                if !choices.contains(&upper) {
                    choices.push(upper);
                }
                choices
            })
            .collect();
        Self::new(options)
    }

    /// Number of combinations this iterator yields in total, saturating.
    pub fn total(&self) -> u64 {
        if self.options.is_empty() {
            return 0;
        }
        self.options
            .iter()
            .fold(1u64, |acc, o| acc.saturating_mul(o.len() as u64))
    }

    fn advance(&mut self) {
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.options[pos].len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Variations {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.done {
            return None;
        }
        let item = self
            .options
            .iter()
            .zip(&self.cursor)
            .map(|(choices, &i)| choices[i].as_str())
            .collect();
        self.advance();
        Some(item)
    }
}
