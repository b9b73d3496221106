//! Per-book chunk index and its read-through cache.

use super::{ChapterChunker, NovelError, NovelSource};
use crate::evidence::EvidenceChunk;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The chunked text of one novel. Read-only once built.
#[derive(Debug, Clone)]
pub struct BookIndex {
    book: String,
    chunks: Vec<EvidenceChunk>,
}

impl BookIndex {
    pub fn new(book: impl Into<String>, chunks: Vec<EvidenceChunk>) -> Self {
        Self {
            book: book.into(),
            chunks,
        }
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn chunks(&self) -> &[EvidenceChunk] {
        &self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of distinct chapters among the chunks.
    pub fn chapter_count(&self) -> usize {
        let mut chapters: Vec<_> = self.chunks.iter().filter_map(|c| c.chapter_id).collect();
        chapters.dedup();
        chapters.len()
    }

    /// Look up a chunk by id.
    pub fn get(&self, chunk_id: &str) -> Option<&EvidenceChunk> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }
}

/// Read-through cache of book indexes keyed by book name.
///
/// An entry is built on first request and never changes afterwards.
pub struct NovelCache<S> {
    source: S,
    chunker: ChapterChunker,
    books: HashMap<String, Arc<BookIndex>>,
}

impl<S: NovelSource> NovelCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_chunker(source, ChapterChunker::default())
    }

    pub fn with_chunker(source: S, chunker: ChapterChunker) -> Self {
        Self {
            source,
            chunker,
            books: HashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The index for `book`, loading and chunking it on first use.
    pub fn get_or_load(&mut self, book: &str) -> Result<Arc<BookIndex>, NovelError> {
        if let Some(index) = self.books.get(book) {
            return Ok(Arc::clone(index));
        }

        let text = self.source.load(book)?;
        let index = Arc::new(BookIndex::new(book, self.chunker.chunk(&text)));
        info!(
            book,
            chapters = index.chapter_count(),
            chunks = index.chunk_count(),
            "indexed novel"
        );

        self.books.insert(book.to_string(), Arc::clone(&index));
        Ok(index)
    }

    /// Populate the cache for several books up front.
    pub fn warm<'a>(&mut self, books: impl IntoIterator<Item = &'a str>) -> Result<(), NovelError> {
        for book in books {
            self.get_or_load(book)?;
        }
        Ok(())
    }

    pub fn contains(&self, book: &str) -> bool {
        self.books.contains_key(book)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
