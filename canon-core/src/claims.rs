//! Claim extraction from backstory text.
//!
//! A backstory is split into sentences and only the sentences that can
//! realistically be checked against a long narrative are kept: those naming
//! the character or describing a concrete action.

use crate::canon::CanonRuleSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shortest sentence, in characters, that can become a claim.
pub const DEFAULT_MIN_CLAIM_LEN: usize = 12;

lazy_static::lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

/// One verifiable sentence from a backstory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Normalized sentence text.
    pub text: String,
    /// Character the backstory is about.
    pub character: String,
    /// Index of the sentence within the backstory.
    pub position: usize,
}

/// Split text into trimmed, non-empty sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace; the
/// punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        // Terminal punctuation is a single byte.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extracts verifiable claims from backstories.
#[derive(Debug, Clone)]
pub struct ClaimExtractor {
    canon: Arc<CanonRuleSet>,
    min_len: usize,
}

impl ClaimExtractor {
    pub fn new(canon: Arc<CanonRuleSet>) -> Self {
        Self {
            canon,
            min_len: DEFAULT_MIN_CLAIM_LEN,
        }
    }

    /// Set the minimum claim length (at least 1).
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len.max(1);
        self
    }

    /// Whether a sentence names the character or contains an action keyword.
    pub fn is_verifiable(&self, sentence: &str, character: &str) -> bool {
        let lower = sentence.to_lowercase();
        if lower.contains(&character.to_lowercase()) {
            return true;
        }
        self.canon
            .action_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
    }

    /// Extract the verifiable claims of `backstory`, in order.
    pub fn extract(&self, backstory: &str, character: &str) -> Vec<Claim> {
        split_sentences(backstory)
            .into_iter()
            .enumerate()
            .filter_map(|(position, sentence)| {
                let cleaned = sentence.replace('\n', " ");
                let cleaned = cleaned.trim();

                if cleaned.chars().count() < self.min_len {
                    return None;
                }
                if !self.is_verifiable(cleaned, character) {
                    return None;
                }

                Some(Claim {
                    text: cleaned.to_string(),
                    character: character.to_string(),
                    position,
                })
            })
            .collect()
    }
}

/// Extract claims with the standard canon and default length floor.
pub fn extract_claims(backstory: &str, character: &str) -> Vec<Claim> {
    ClaimExtractor::new(CanonRuleSet::standard()).extract(backstory, character)
}
