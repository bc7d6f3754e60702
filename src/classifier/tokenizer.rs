//! Term extraction for license titles and texts.
//!
//! Text is lower-cased, stripped of HTML-like tags and split into words that
//! keep hyphenated identifiers and dotted version numbers intact
//! (`gpl-2.0`, `1.1`). Spelling variants are folded onto one form, a few
//! ubiquitous words are dropped, and the remaining unigrams are augmented
//! with every contiguous bigram and trigram.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest phrase (in words) emitted by [`tokenize`].
pub const MAX_PHRASE_WORDS: usize = 3;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag pattern"));

/// Alphanumeric runs joined by `.`, `-` or `+`, with an optional trailing `+`.
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:[.\-+][\p{L}\p{N}]+)*\+?").expect("Invalid word pattern")
});

/// `v2`, `v2.0`, `v1.0.1`
static VERSION_PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+(?:\.\d+)*)$").expect("Invalid version pattern"));

static SINGLE_DIGIT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d$").expect("Invalid digit pattern"));

const STOP_WORDS: &[&str] = &["the", "a", "an", "version", "software"];

/// British/American and stylistic variants folded onto a single spelling.
const SPELLING: &[(&str, &str)] = &[
    ("licence", "license"),
    ("licences", "licenses"),
    ("licenced", "licensed"),
    ("licencing", "licensing"),
    ("licencor", "licensor"),
    ("sublicence", "sublicense"),
    ("sub-license", "sublicense"),
    ("sub-licence", "sublicense"),
    ("organisation", "organization"),
    ("organisations", "organizations"),
    ("authorised", "authorized"),
    ("authorisation", "authorization"),
    ("recognised", "recognized"),
    ("behaviour", "behavior"),
    ("colour", "color"),
    ("centre", "center"),
    ("programme", "program"),
    ("acknowledgement", "acknowledgment"),
    ("non-commercial", "noncommercial"),
];

/// Split `text` into normalized terms: unigrams followed by bigrams and trigrams.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let stripped = TAG_PATTERN.replace_all(&lower, " ");

    let words: Vec<String> = WORD_PATTERN
        .find_iter(&stripped)
        .map(|m| normalize_word(m.as_str()))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect();

    let mut terms = Vec::with_capacity(words.len() * MAX_PHRASE_WORDS);
    terms.extend(words.iter().cloned());
    for n in 2..=MAX_PHRASE_WORDS {
        terms.extend(words.windows(n).map(|w| w.join(" ")));
    }
    terms
}

fn normalize_word(word: &str) -> String {
    if let Some((_, to)) = SPELLING.iter().find(|(from, _)| *from == word) {
        return (*to).to_string();
    }
    let word = match VERSION_PREFIX_PATTERN.captures(word) {
        Some(caps) => caps[1].to_string(),
        None => word.to_string(),
    };
    // "version 2" and "v2.0" name the same thing
    if SINGLE_DIGIT_PATTERN.is_match(&word) {
        return format!("{word}.0");
    }
    word
}

/// Number of embedded spaces in a term, i.e. its phrase class (0, 1 or 2).
pub fn phrase_class(term: &str) -> usize {
    term.matches(' ').count().min(MAX_PHRASE_WORDS - 1)
}
