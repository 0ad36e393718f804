//! Complexity enhancement: make sure a candidate carries an uppercase
//! letter, a digit and a symbol.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Add whatever character classes `candidate` lacks, in a fixed order.
///
/// - uppercase: uppercase a random lowercase letter, or insert a random
///   capital when there is no letter to promote;
/// - digit: insert one from `numbers`;
/// - symbol: insert one from `symbols`.
///
/// Insertions land after the first character whenever the candidate is
/// non-empty. Candidates that already satisfy a class are left alone for
/// that class, so a fully compliant candidate comes back unchanged.
pub fn enhance<R: Rng + ?Sized>(
    candidate: &str,
    numbers: &[char],
    symbols: &[char],
    rng: &mut R,
) -> String {
    let mut chars: Vec<char> = candidate.chars().collect();

    if !chars.iter().any(|c| c.is_uppercase()) {
        let lowercase: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_lowercase())
            .map(|(i, _)| i)
            .collect();
        match lowercase.choose(rng) {
            Some(&pos) => {
                let upper: Vec<char> = chars[pos].to_uppercase().collect();
                chars.splice(pos..=pos, upper);
            }
            None => {
                let capital = rng.random_range(b'A'..=b'Z') as char;
                let at = rng.random_range(0..=chars.len());
                chars.insert(at, capital);
            }
        }
    }

    if !chars.iter().any(|c| c.is_ascii_digit() || numbers.contains(c)) {
        if let Some(&digit) = numbers.choose(rng) {
            let at = insertion_point(chars.len(), rng);
            chars.insert(at, digit);
        }
    }

    if !chars.iter().any(|c| symbols.contains(c)) {
        if let Some(&symbol) = symbols.choose(rng) {
            let at = insertion_point(chars.len(), rng);
            chars.insert(at, symbol);
        }
    }

    chars.into_iter().collect()
}

fn insertion_point<R: Rng + ?Sized>(len: usize, rng: &mut R) -> usize {
    if len == 0 { 0 } else { rng.random_range(1..=len) }
}
