/// Generate `n` disambiguating suffixes for references sharing a year.
///
/// Suffixes come in repetition tiers: "a".."z", then "aa", "bb", .., "zz",
/// then "aaa", .., "zzz" and so on. This is not base-26 enumeration; "ab"
/// never appears.
///
/// # Examples
/// ```
/// use docket_refs::suffix::generate_suffixes;
///
/// let suffixes = generate_suffixes(28);
/// assert_eq!(suffixes[0], "a");
/// assert_eq!(suffixes[25], "z");
/// assert_eq!(suffixes[26], "aa");
/// assert_eq!(suffixes[27], "bb");
/// ```
pub fn generate_suffixes(n: usize) -> Vec<String> {
    (0..n).map(suffix_at).collect()
}

/// Suffix at a single position of the tiered sequence.
pub fn suffix_at(position: usize) -> String {
    let letter = (b'a' + (position % 26) as u8) as char;
    let reps = position / 26 + 1;
    std::iter::repeat(letter).take(reps).collect()
}
