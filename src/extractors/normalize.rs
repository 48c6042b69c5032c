// src/extractors/normalize.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Any run of whitespace, newlines included. U+FEFF is treated as whitespace too.
static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s\u{FEFF}]+").expect("Failed to compile WHITESPACE_RUN_RE")
});

// Two or more of the *same* terminal punctuation mark. Mixed runs like "?!" don't match.
static REPEATED_TERMINAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.{2,}|!{2,}|\?{2,}").expect("Failed to compile REPEATED_TERMINAL_RE")
});

/// Cleans concatenated page/section text into a single normalized string.
///
/// Applied in order:
/// 1. every whitespace run becomes one ASCII space,
/// 2. runs of an identical `.`, `!` or `?` collapse to one character,
/// 3. leading and trailing whitespace is trimmed.
///
/// Never fails and is idempotent.
pub fn normalize_text(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN_RE.replace_all(raw, " ");
    let deduped = REPEATED_TERMINAL_RE.replace_all(&collapsed, |caps: &regex::Captures| {
        // Matches are ASCII, so the first byte is the whole character
        caps[0][..1].to_string()
    });
    deduped.trim().to_string()
}
