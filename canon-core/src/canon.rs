//! Canon rule tables.
//!
//! A [`CanonRuleSet`] holds every hardcoded narrative fact the judge relies on:
//! per-character forbidden phrases, biographical constraints, impossible
//! meetings, and the vocabularies used by extraction, retrieval and judgment.
//! The built-in set is created once and shared; a replacement can be loaded
//! from JSON.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Errors from loading a canon rule file.
#[derive(Debug, Error)]
pub enum CanonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-wide, read-only canon data.
///
/// Character names are stored lowercased; lookups lowercase their input.
/// Tables missing from a rule file keep their built-in contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonRuleSet {
    /// Phrases that may never appear in a claim about the character.
    pub forbidden_phrases: HashMap<String, Vec<String>>,
    /// Characters who die while confined.
    pub dies_in_confinement: HashSet<String>,
    /// Tokens implying a life after confinement.
    pub afterlife_markers: HashSet<String>,
    /// Characters who never escape confinement.
    pub never_escapes: HashSet<String>,
    /// Tokens implying freedom.
    pub escape_markers: HashSet<String>,
    /// Named characters considered by the meeting rule, in roster order.
    pub roster: Vec<String>,
    /// Unordered pairs of characters who never meet.
    pub impossible_meetings: Vec<[String; 2]>,
    /// Tokens marking a plausible event the novel does not record.
    pub new_event_markers: HashSet<String>,
    /// Words ignored by tokenization.
    pub stopwords: HashSet<String>,
    /// Words that mark a chunk as negating.
    pub negation_words: HashSet<String>,
    /// Action verbs that make a sentence verifiable.
    pub action_keywords: Vec<String>,
}

fn set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

lazy_static::lazy_static! {
    static ref STANDARD: Arc<CanonRuleSet> = Arc::new(CanonRuleSet::build_standard());
}

impl Default for CanonRuleSet {
    fn default() -> Self {
        (**STANDARD).clone()
    }
}

impl CanonRuleSet {
    /// The built-in rule set, shared across the process.
    pub fn standard() -> Arc<CanonRuleSet> {
        Arc::clone(&STANDARD)
    }

    fn build_standard() -> Self {
        let mut forbidden_phrases = HashMap::new();
        // Abbé Faria dies in the Château d'If.
        forbidden_phrases.insert(
            "faria".to_string(),
            [
                "from 1800",
                "after 1800",
                "lived",
                "lived quietly",
                "escaped",
                "escape",
                "free",
                "free life",
                "island",
                "marseille",
                "quay",
                "outside prison",
                "after prison",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        );

        Self {
            forbidden_phrases,
            dies_in_confinement: set(&["faria"]),
            afterlife_markers: set(&["lived", "life", "after", "island", "quietly"]),
            never_escapes: set(&["faria"]),
            escape_markers: set(&["lived", "after", "free", "island"]),
            roster: ["faria", "caderousse", "danglars", "noirtier"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            impossible_meetings: vec![
                ["faria".to_string(), "caderousse".to_string()],
                ["faria".to_string(), "danglars".to_string()],
            ],
            new_event_markers: set(&[
                "rescued",
                "rescue",
                "led",
                "saved",
                "helped",
                "guided",
                "avalanche",
                "expedition",
                "journey",
                "mission",
            ]),
            stopwords: set(&[
                "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "was",
                "were", "is", "are", "as", "by", "that", "this", "he", "she", "they", "his",
                "her", "their", "it", "at", "from",
            ]),
            negation_words: set(&["not", "never", "no", "denied", "refused", "rejected"]),
            action_keywords: [
                "went",
                "traveled",
                "joined",
                "left",
                "fought",
                "escaped",
                "trusted",
                "betrayed",
                "refused",
                "helped",
                "saved",
                "attacked",
                "captured",
                "imprisoned",
                "guided",
                "followed",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }

    /// Load a rule set from a JSON file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CanonError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Parse a rule set from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CanonError> {
        let parsed: Self = serde_json::from_str(json)?;
        Ok(parsed.normalized())
    }

    /// Lowercase every character name and phrase.
    fn normalized(self) -> Self {
        let lower_set =
            |s: HashSet<String>| s.into_iter().map(|w| w.to_lowercase()).collect::<HashSet<_>>();
        let lower_vec = |v: Vec<String>| v.into_iter().map(|w| w.to_lowercase()).collect::<Vec<_>>();

        Self {
            forbidden_phrases: self
                .forbidden_phrases
                .into_iter()
                .map(|(name, phrases)| (name.to_lowercase(), lower_vec(phrases)))
                .collect(),
            dies_in_confinement: lower_set(self.dies_in_confinement),
            afterlife_markers: lower_set(self.afterlife_markers),
            never_escapes: lower_set(self.never_escapes),
            escape_markers: lower_set(self.escape_markers),
            roster: lower_vec(self.roster),
            impossible_meetings: self
                .impossible_meetings
                .into_iter()
                .map(|[a, b]| [a.to_lowercase(), b.to_lowercase()])
                .collect(),
            new_event_markers: lower_set(self.new_event_markers),
            stopwords: lower_set(self.stopwords),
            negation_words: lower_set(self.negation_words),
            action_keywords: lower_vec(self.action_keywords),
        }
    }

    /// Forbidden phrases for a character, if the character has any.
    pub fn forbidden_phrases_for(&self, character: &str) -> Option<&[String]> {
        self.forbidden_phrases
            .get(&character.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Whether `text` contains a forbidden phrase for `character`.
    ///
    /// Matching is case-insensitive substring containment.
    pub fn violates_override(&self, character: &str, text: &str) -> bool {
        let Some(phrases) = self.forbidden_phrases_for(character) else {
            return false;
        };
        let lower = text.to_lowercase();
        phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    pub fn dies_in_confinement(&self, character: &str) -> bool {
        self.dies_in_confinement.contains(&character.to_lowercase())
    }

    pub fn never_escapes(&self, character: &str) -> bool {
        self.never_escapes.contains(&character.to_lowercase())
    }

    /// Whether two characters are recorded as never meeting, in either order.
    pub fn is_impossible_meeting(&self, a: &str, b: &str) -> bool {
        self.impossible_meetings
            .iter()
            .any(|[x, y]| (x == a && y == b) || (x == b && y == a))
    }

    /// Roster names present among `tokens`, in roster order.
    pub fn named_in<'a>(&'a self, tokens: &HashSet<String>) -> Vec<&'a str> {
        self.roster
            .iter()
            .filter(|name| tokens.contains(*name))
            .map(String::as_str)
            .collect()
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negation_words.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_shared() {
        let a = CanonRuleSet::standard();
        let b = CanonRuleSet::standard();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_override_phrases_are_superset() {
        let canon = CanonRuleSet::standard();
        let phrases = canon.forbidden_phrases_for("Faria").unwrap();
        for p in ["marseille", "quay", "outside prison", "free life", "lived quietly", "after prison"] {
            assert!(phrases.iter().any(|x| x == p), "missing phrase {p}");
        }
    }

    #[test]
    fn test_violates_override_is_case_insensitive() {
        let canon = CanonRuleSet::standard();
        assert!(canon.violates_override("FARIA", "He ESCAPED through the tunnel"));
        assert!(!canon.violates_override("Faria", "He taught Dantès mathematics"));
        assert!(!canon.violates_override("Thalcave", "He escaped the flood"));
    }

    #[test]
    fn test_impossible_meeting_is_unordered() {
        let canon = CanonRuleSet::standard();
        assert!(canon.is_impossible_meeting("faria", "danglars"));
        assert!(canon.is_impossible_meeting("danglars", "faria"));
        assert!(!canon.is_impossible_meeting("faria", "noirtier"));
    }

    #[test]
    fn test_from_json_lowercases_overrides() {
        let canon = CanonRuleSet::from_json(
            r#"{
                "forbidden_phrases": { "Ayrton": ["Left The Island"] },
                "never_escapes": ["AYRTON"]
            }"#,
        )
        .unwrap();

        assert!(canon.violates_override("ayrton", "He left the island at dawn"));
        assert!(canon.never_escapes("Ayrton"));
        assert!(!canon.never_escapes("Faria"));
        assert!(canon.forbidden_phrases_for("Faria").is_none());
    }

    #[test]
    fn test_from_json_keeps_builtin_vocabularies() {
        let canon = CanonRuleSet::from_json(r#"{ "forbidden_phrases": {} }"#).unwrap();
        let standard = CanonRuleSet::standard();

        assert_eq!(canon.stopwords, standard.stopwords);
        assert_eq!(canon.negation_words, standard.negation_words);
        assert_eq!(canon.action_keywords, standard.action_keywords);
        assert_eq!(canon.roster, standard.roster);
        assert!(canon.is_negation("never"));
        assert!(canon.dies_in_confinement("Faria"));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("canon.json");
        std::fs::write(&path, r#"{ "roster": ["Ayrton", "Glenarvan"] }"#).unwrap();

        let canon = CanonRuleSet::from_json_file(&path).await.unwrap();
        assert_eq!(canon.roster, vec!["ayrton", "glenarvan"]);
        assert!(canon.violates_override("Faria", "Faria escaped"));

        let err = CanonRuleSet::from_json_file(dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, CanonError::Io(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = CanonRuleSet::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CanonError::Json(_)));
    }
}
