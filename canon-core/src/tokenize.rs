//! Word tokenization shared by evidence retrieval and claim judgment.

use regex::Regex;
use std::collections::HashSet;

lazy_static::lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

/// Lowercase `text` and return its word tokens in order, minus stopwords.
pub fn tokenize(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|w| !stopwords.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Distinct significant tokens of `text`.
pub fn token_set(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    tokenize(text, stopwords).into_iter().collect()
}

/// Number of tokens two sets share.
pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    // Iterate the smaller side.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|t| large.contains(*t)).count()
}
