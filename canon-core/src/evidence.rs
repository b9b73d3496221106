//! Evidence retrieval over a book's chunks.

use crate::canon::CanonRuleSet;
use crate::tokenize::{overlap, token_set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of chunks returned per claim.
pub const DEFAULT_TOP_K: usize = 5;

/// An indexed fragment of novel text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceChunk {
    /// Stable identifier within the book.
    pub chunk_id: String,
    /// Chapter the chunk came from.
    #[serde(default)]
    pub chapter_id: Option<usize>,
    /// First word offset within the chapter.
    #[serde(default)]
    pub start_word: Option<usize>,
    /// One past the last word offset within the chapter.
    #[serde(default)]
    pub end_word: Option<usize>,
    /// Raw chunk text.
    pub text: String,
}

impl EvidenceChunk {
    /// A chunk with only an id and text.
    pub fn new(chunk_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            chapter_id: None,
            start_word: None,
            end_word: None,
            text: text.into(),
        }
    }

    pub fn with_chapter(mut self, chapter_id: usize) -> Self {
        self.chapter_id = Some(chapter_id);
        self
    }
}

/// A chunk scored against one claim.
#[derive(Debug, Clone, Copy)]
pub struct ScoredEvidence<'a> {
    pub chunk: &'a EvidenceChunk,
    /// Number of significant tokens shared with the claim.
    pub score: usize,
    /// Whether the chunk contains a negation word.
    pub has_negation: bool,
}

impl ScoredEvidence<'_> {
    pub fn chunk_id(&self) -> &str {
        &self.chunk.chunk_id
    }

    pub fn text(&self) -> &str {
        &self.chunk.text
    }
}

/// Character-aware lexical-overlap retriever.
#[derive(Debug, Clone)]
pub struct EvidenceRetriever {
    canon: Arc<CanonRuleSet>,
    top_k: usize,
}

impl EvidenceRetriever {
    pub fn new(canon: Arc<CanonRuleSet>) -> Self {
        Self {
            canon,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Score every chunk mentioning `character` against `claim`.
    ///
    /// Chunks that don't mention the character, or share no token with the
    /// claim, are skipped. The result is ordered by descending score; equal
    /// scores keep corpus order but callers should not rely on it.
    pub fn retrieve<'a>(
        &self,
        claim: &str,
        chunks: &'a [EvidenceChunk],
        character: &str,
    ) -> Vec<ScoredEvidence<'a>> {
        let stopwords = &self.canon.stopwords;
        let claim_tokens = token_set(claim, stopwords);
        let character = character.to_lowercase();

        let mut scored: Vec<ScoredEvidence<'a>> = chunks
            .iter()
            .filter_map(|chunk| {
                if !chunk.text.to_lowercase().contains(&character) {
                    return None;
                }

                let chunk_tokens = token_set(&chunk.text, stopwords);
                let score = overlap(&claim_tokens, &chunk_tokens);
                if score == 0 {
                    return None;
                }

                let has_negation = chunk_tokens.iter().any(|t| self.canon.is_negation(t));
                Some(ScoredEvidence {
                    chunk,
                    score,
                    has_negation,
                })
            })
            .collect();

        // Stable: ties stay in corpus order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.top_k);
        scored
    }
}

/// Retrieve with the standard canon and `top_k`.
pub fn retrieve_evidence<'a>(
    claim: &str,
    chunks: &'a [EvidenceChunk],
    character: &str,
    top_k: usize,
) -> Vec<ScoredEvidence<'a>> {
    EvidenceRetriever::new(CanonRuleSet::standard())
        .with_top_k(top_k)
        .retrieve(claim, chunks, character)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks() -> Vec<EvidenceChunk> {
        vec![
            EvidenceChunk::new("1", "Thalcave never trusted the foreign explorers."),
            EvidenceChunk::new("2", "The group traveled across Patagonia."),
            EvidenceChunk::new("3", "Thalcave watched the strangers with suspicion."),
        ]
    }

    #[test]
    fn test_retrieve_filters_by_character_and_overlap() {
        let chunks = chunks();
        let results = retrieve_evidence(
            "Thalcave distrusted foreign explorers",
            &chunks,
            "Thalcave",
            DEFAULT_TOP_K,
        );

        // Chunk 3 mentions Thalcave and shares only his name.
        let ids: Vec<_> = results.iter().map(|e| e.chunk_id()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(results[0].score, 3);
        assert!(results[0].has_negation);
        assert_eq!(results[1].score, 1);
        assert!(!results[1].has_negation);
    }

    #[test]
    fn test_retrieve_orders_by_score() {
        let chunks = vec![
            EvidenceChunk::new("low", "Thalcave rode."),
            EvidenceChunk::new("high", "Thalcave rode his horse Thaouka across the pampas."),
        ];
        let results = retrieve_evidence("Thalcave rode Thaouka across the pampas", &chunks, "thalcave", 5);
        assert_eq!(results[0].chunk_id(), "high");
        assert_eq!(results[1].chunk_id(), "low");
    }

    #[test]
    fn test_retrieve_truncates_to_top_k() {
        let chunks: Vec<_> = (0..10)
            .map(|i| EvidenceChunk::new(i.to_string(), "Glenarvan sailed the Duncan."))
            .collect();
        let results = retrieve_evidence("Glenarvan sailed", &chunks, "Glenarvan", 3);
        assert_eq!(results.len(), 3);
        let ids: Vec<_> = results.iter().map(|e| e.chunk_id()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_retrieve_no_candidates() {
        let chunks = chunks();
        assert!(retrieve_evidence("Paganel studied maps", &chunks, "Paganel", 5).is_empty());
        assert!(retrieve_evidence("anything", &[], "Thalcave", 5).is_empty());
    }
}
