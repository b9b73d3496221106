//! Testing utilities.
//!
//! This module provides tools for integration testing:
//! - `InMemoryNovels` for pipelines that never touch the filesystem
//! - `chunks` for building evidence corpora from plain strings

use crate::evidence::EvidenceChunk;
use crate::novel::{NovelError, NovelSource};
use std::cell::Cell;
use std::collections::HashMap;

/// A novel source backed by a map, counting how often it is read.
///
/// Book names match exactly.
#[derive(Debug, Default)]
pub struct InMemoryNovels {
    novels: HashMap<String, String>,
    loads: Cell<usize>,
}

impl InMemoryNovels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a novel under `book`.
    pub fn with_novel(mut self, book: impl Into<String>, text: impl Into<String>) -> Self {
        self.novels.insert(book.into(), text.into());
        self
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }
}

impl NovelSource for InMemoryNovels {
    fn load(&self, book: &str) -> Result<String, NovelError> {
        let text = self
            .novels
            .get(book)
            .cloned()
            .ok_or_else(|| NovelError::UnknownBook(book.to_string()))?;
        self.loads.set(self.loads.get() + 1);
        Ok(text)
    }
}

/// Evidence chunks numbered from 1, one per text.
pub fn chunks(texts: &[&str]) -> Vec<EvidenceChunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| EvidenceChunk::new((i + 1).to_string(), *text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_counts_loads() {
        let novels = InMemoryNovels::new().with_novel("Book", "Text.");
        assert_eq!(novels.load_count(), 0);
        assert_eq!(novels.load("Book").unwrap(), "Text.");
        assert!(novels.load("Other").is_err());
        assert_eq!(novels.load_count(), 1);
    }

    #[test]
    fn test_chunks_numbering() {
        let corpus = chunks(&["first", "second"]);
        assert_eq!(corpus[0].chunk_id, "1");
        assert_eq!(corpus[1].text, "second");
        assert_eq!(corpus[1].chapter_id, None);
    }
}
