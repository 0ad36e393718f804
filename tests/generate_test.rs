//! Integration tests for variation expansion and enhancement.

use leetforge::config::GenerationConfig;
use leetforge::generate::{CandidateSource, Leetspeak, Variations, enhance};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

fn table(entries: &[(char, &[&str])]) -> HashMap<char, Vec<String>> {
    entries
        .iter()
        .map(|(c, glyphs)| (*c, glyphs.iter().map(|g| g.to_string()).collect()))
        .collect()
}

fn digits() -> Vec<char> {
    ('0'..='9').collect()
}

fn symbols() -> Vec<char> {
    vec!['!', '@', '#', '$', '%', '&']
}

fn is_complex(candidate: &str, symbols: &[char]) -> bool {
    candidate.chars().any(|c| c.is_uppercase())
        && candidate.chars().any(|c| c.is_ascii_digit())
        && candidate.chars().any(|c| symbols.contains(&c))
}

// ---------------------------------------------------------------------------
// Variations
// ---------------------------------------------------------------------------

#[test]
fn variations_walk_rightmost_position_fastest() {
    let subs = table(&[('a', &["@", "4"])]);
    let all: Vec<String> = Variations::for_word("cat", &subs).collect();

    assert_eq!(all.len(), 12);
    assert_eq!(&all[..4], &["c@t", "c@T", "c4t", "c4T"]);
    assert_eq!(all.last().map(String::as_str), Some("CAT"));

    let distinct: HashSet<&String> = all.iter().collect();
    assert_eq!(distinct.len(), all.len());
}

#[test]
fn unsubstituted_characters_keep_both_cases() {
    let all: Vec<String> = Variations::for_word("dog", &HashMap::new()).collect();
    assert_eq!(all.len(), 8);
    assert_eq!(all.first().map(String::as_str), Some("dog"));
    assert!(all.contains(&"dOg".to_string()));
    assert_eq!(all.last().map(String::as_str), Some("DOG"));
}

#[test]
fn substituted_characters_drop_their_lowercase_form() {
    let subs = table(&[('o', &["0"])]);
    let all: Vec<String> = Variations::for_word("o", &subs).collect();
    assert_eq!(all, vec!["0".to_string(), "O".to_string()]);
}

#[test]
fn caseless_characters_are_not_duplicated() {
    let all: Vec<String> = Variations::for_word("a1", &HashMap::new()).collect();
    assert_eq!(all, vec!["a1".to_string(), "A1".to_string()]);
}

#[test]
fn words_are_lowercased_before_expansion() {
    let subs = table(&[('a', &["@"])]);
    let upper: Vec<String> = Variations::for_word("CAT", &subs).collect();
    let lower: Vec<String> = Variations::for_word("cat", &subs).collect();
    assert_eq!(upper, lower);
}

#[test]
fn total_matches_yielded_count() {
    let source = Leetspeak::from_config(&GenerationConfig::default());
    let variants = source.variations("password");
    let total = variants.total();
    assert_eq!(total, variants.count() as u64);
}

#[test]
fn empty_inputs_yield_nothing() {
    assert_eq!(Variations::for_word("", &HashMap::new()).count(), 0);
    assert_eq!(Variations::new(Vec::new()).count(), 0);
    assert_eq!(
        Variations::new(vec![vec!["a".to_string()], Vec::new()]).count(),
        0
    );
    assert_eq!(Variations::new(Vec::new()).total(), 0);
}

#[test]
fn total_saturates_instead_of_overflowing() {
    let options = vec![vec!["x".to_string(); 1 << 16]; 5];
    assert_eq!(Variations::new(options).total(), u64::MAX);
}

// ---------------------------------------------------------------------------
// Enhancement
// ---------------------------------------------------------------------------

#[test]
fn enhance_adds_every_missing_class() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let out = enhance("cat", &digits(), &symbols(), &mut rng);
        assert!(is_complex(&out, &symbols()), "{out} lacks a class");
        assert_eq!(out.chars().count(), 5);
        let letters: String = out.chars().filter(|c| c.is_alphabetic()).collect();
        assert_eq!(letters.to_lowercase(), "cat");
        // Insertions never land in front of the first character.
        assert!(out.starts_with('c') || out.starts_with('C'));
    }
}

#[test]
fn enhance_only_touches_missing_classes() {
    let mut rng = StdRng::seed_from_u64(2);

    assert_eq!(enhance("P@ss1", &digits(), &symbols(), &mut rng), "P@ss1");

    let out = enhance("C@t", &digits(), &symbols(), &mut rng);
    assert_eq!(out.chars().count(), 4);
    assert_eq!(
        out.chars().filter(|c| !c.is_ascii_digit()).collect::<String>(),
        "C@t"
    );
}

#[test]
fn enhance_inserts_a_capital_when_nothing_can_be_promoted() {
    let mut rng = StdRng::seed_from_u64(3);

    let out = enhance("1234", &digits(), &symbols(), &mut rng);
    assert_eq!(out.chars().count(), 6);
    assert!(is_complex(&out, &symbols()));
    assert_eq!(out.chars().filter(|c| c.is_ascii_uppercase()).count(), 1);

    let out = enhance("", &digits(), &symbols(), &mut rng);
    assert_eq!(out.chars().count(), 3);
    assert!(out.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
    assert!(is_complex(&out, &symbols()));
}

#[test]
fn enhance_draws_from_configured_pools() {
    let mut rng = StdRng::seed_from_u64(4);
    let out = enhance("abc", &['7'], &['~'], &mut rng);
    assert!(out.contains('7'));
    assert!(out.contains('~'));
}

#[test]
fn enhance_is_deterministic_for_a_seed() {
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..20)
            .map(|_| enhance("hello", &digits(), &symbols(), &mut rng))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(9), run(9));
}

// ---------------------------------------------------------------------------
// Leetspeak source
// ---------------------------------------------------------------------------

#[test]
fn leetspeak_candidates_are_all_complex() {
    let config = GenerationConfig::default();
    let source = Leetspeak::from_config(&config);

    let variants: Vec<String> = source.variations("sun").collect();
    assert_eq!(variants.len(), 12);

    for variant in variants {
        let candidate = source.enhance(variant);
        assert!(is_complex(&candidate, &config.symbols), "{candidate}");
    }
}

#[test]
fn leetspeak_enhancement_is_fixed_per_variant() {
    let source = Leetspeak::from_config(&GenerationConfig::default()).with_seed(7);
    let twin = Leetspeak::from_config(&GenerationConfig::default()).with_seed(7);

    let first: Vec<String> = source
        .variations("hello")
        .map(|v| source.enhance(v))
        .collect();
    let again: Vec<String> = source
        .variations("hello")
        .map(|v| source.enhance(v))
        .collect();
    let other_instance: Vec<String> = twin.variations("hello").map(|v| twin.enhance(v)).collect();

    assert_eq!(first, again);
    assert_eq!(first, other_instance);
}

#[test]
fn leetspeak_seed_changes_enhancement_choices() {
    let config = GenerationConfig::default();
    let a = Leetspeak::from_config(&config).with_seed(1);
    let b = Leetspeak::from_config(&config).with_seed(2);

    let differing = a
        .variations("password")
        .filter(|v| a.enhance(v.clone()) != b.enhance(v.clone()))
        .count();
    assert!(differing > 0);
}
