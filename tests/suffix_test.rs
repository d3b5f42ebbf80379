use docket_refs::suffix::{generate_suffixes, suffix_at};
use std::collections::HashSet;

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

#[test]
fn test_suffix_count_and_uniqueness() {
    for n in 0..=100 {
        let suffixes = generate_suffixes(n);
        assert_eq!(suffixes.len(), n, "wrong number of suffixes for n={}", n);

        let unique: HashSet<&String> = suffixes.iter().collect();
        assert_eq!(unique.len(), n, "duplicate suffix for n={}", n);
    }
}

#[test]
fn test_first_tier_is_single_letters() {
    let suffixes = generate_suffixes(26);
    for (i, letter) in ALPHABET.chars().enumerate() {
        assert_eq!(suffixes[i], letter.to_string());
    }
}

#[test]
fn test_second_tier_is_doubled_letters() {
    let suffixes = generate_suffixes(52);
    for (i, letter) in ALPHABET.chars().enumerate() {
        assert_eq!(suffixes[26 + i], format!("{}{}", letter, letter));
    }
    assert!(!suffixes.contains(&"ab".to_string()), "tiers are not base-26");
}

#[test]
fn test_third_tier_starts_at_52() {
    assert_eq!(suffix_at(51), "zz");
    assert_eq!(suffix_at(52), "aaa");
    assert_eq!(suffix_at(77), "zzz");
    assert_eq!(suffix_at(78), "aaaa");
}

#[test]
fn test_prefix_stability() {
    // A longer list starts with the shorter one
    let short = generate_suffixes(30);
    let long = generate_suffixes(90);
    assert_eq!(&long[..30], &short[..]);
}
