//! ASCII case-insensitive substring search.
//!
//! Every lookup in the template language ignores ASCII case while keeping
//! byte offsets stable: folding is done byte by byte, so a match found in the
//! original text is always on a `char` boundary and never changes length.

/// Returns the byte offset of the first case-insensitive occurrence of
/// `needle` in `haystack` at or after `from`.
///
/// An empty needle never matches.
///
/// ```rust
/// use assembler_tags::find_ci;
///
/// assert_eq!(find_ci("a {{Header}} b", "{{header}}", 0), Some(2));
/// assert_eq!(find_ci("a {{Header}} b", "{{header}}", 3), None);
/// ```
pub fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || from > hay.len() || hay.len() - from < pat.len() {
        return None;
    }
    (from..=hay.len() - pat.len()).find(|&at| hay[at..at + pat.len()].eq_ignore_ascii_case(pat))
}

/// True if `haystack` holds `needle` (ignoring ASCII case) starting exactly at `at`.
pub fn starts_with_ci(haystack: &str, at: usize, needle: &str) -> bool {
    haystack
        .as_bytes()
        .get(at..at + needle.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// True if `needle` occurs anywhere in `haystack`, ignoring ASCII case.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle, 0).is_some()
}

/// Replaces every non-overlapping occurrence of `needle`, scanning left to
/// right. Inserted text is never rescanned.
pub fn replace_all_ci(haystack: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(at) = find_ci(haystack, needle, cursor) {
        out.push_str(&haystack[cursor..at]);
        out.push_str(replacement);
        cursor = at + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

/// Replaces only the first occurrence of `needle`. Returns `None` when the
/// needle is absent so callers can tell "unchanged" apart from "replaced by
/// identical text".
pub fn replace_first_ci(haystack: &str, needle: &str, replacement: &str) -> Option<String> {
    let at = find_ci(haystack, needle, 0)?;
    let mut out = String::with_capacity(haystack.len() + replacement.len());
    out.push_str(&haystack[..at]);
    out.push_str(replacement);
    out.push_str(&haystack[at + needle.len()..]);
    Some(out)
}
