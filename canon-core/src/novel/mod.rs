//! Novel loading, chunking and per-book chunk caching.
//!
//! ```text
//!  book name ──► NovelSource ──► text ──► ChapterChunker ──► BookIndex
//!                                                              │
//!                      NovelCache (book name → Arc<BookIndex>) ◄┘
//! ```

mod cache;
mod chunker;

pub use cache::{BookIndex, NovelCache};
pub use chunker::{ChapterChunker, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or chunking a novel.
#[derive(Debug, Error)]
pub enum NovelError {
    #[error("Unknown book name: {0}")]
    UnknownBook(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chunk window: size {chunk_size}, overlap {overlap}")]
    InvalidWindow { chunk_size: usize, overlap: usize },
}

/// Supplies the full text of a novel by book name.
pub trait NovelSource {
    fn load(&self, book: &str) -> Result<String, NovelError>;
}

/// Reads novels from text files in a data directory.
///
/// Book names are resolved by case-insensitive prefix against a catalog, so
/// "The Count of Monte Cristo" and "the count of monte cristo (abridged)"
/// both map to the same file.
#[derive(Debug, Clone)]
pub struct DirectoryNovelSource {
    data_dir: PathBuf,
    /// (lowercased name prefix, file name) in match order.
    catalog: Vec<(String, String)>,
}

impl DirectoryNovelSource {
    /// A source over `data_dir` with the two known novels.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog: vec![
                ("the count".to_string(), "The Count of Monte Cristo.txt".to_string()),
                ("in search".to_string(), "In search of the castaways.txt".to_string()),
            ],
        }
    }

    /// A source with no catalog entries.
    pub fn empty(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog: Vec::new(),
        }
    }

    /// Map book names starting with `prefix` to `file_name`.
    pub fn with_book(mut self, prefix: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.catalog
            .push((prefix.into().to_lowercase(), file_name.into()));
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `book`, if the catalog knows it.
    pub fn resolve(&self, book: &str) -> Option<PathBuf> {
        let lower = book.trim().to_lowercase();
        self.catalog
            .iter()
            .find(|(prefix, _)| lower.starts_with(prefix.as_str()))
            .map(|(_, file)| self.data_dir.join(file))
    }
}

impl NovelSource for DirectoryNovelSource {
    fn load(&self, book: &str) -> Result<String, NovelError> {
        let path = self
            .resolve(book)
            .ok_or_else(|| NovelError::UnknownBook(book.to_string()))?;

        let bytes = std::fs::read(&path).map_err(|source| NovelError::Io {
            path: path.clone(),
            source,
        })?;

        // Invalid UTF-8 is dropped rather than replaced.
        Ok(String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, ""))
    }
}
