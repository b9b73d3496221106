//! Chapter-aware chunking into overlapping word windows.

use super::NovelError;
use crate::evidence::EvidenceChunk;
use regex::Regex;

/// Words per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;

/// Words shared by consecutive chunks of a chapter.
pub const DEFAULT_OVERLAP: usize = 200;

lazy_static::lazy_static! {
    static ref CHAPTER_HEADING: Regex =
        Regex::new(r"(?i)\n\s*(chapter\s+[ivxlcdm0-9]+\.?)").unwrap();
}

/// Splits novel text into chapters, then chapters into word windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for ChapterChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChapterChunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chunker with a custom window. The window must advance.
    pub fn with_window(chunk_size: usize, overlap: usize) -> Result<Self, NovelError> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(NovelError::InvalidWindow {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into trimmed chapters.
    ///
    /// Text before the first heading forms its own chapter when non-blank.
    /// Each heading opens a chapter that includes the heading itself.
    pub fn split_chapters(&self, text: &str) -> Vec<String> {
        let text = text.replace("\r\n", "\n");
        let mut chapters = Vec::new();
        let mut current = String::new();
        let mut last = 0;

        for caps in CHAPTER_HEADING.captures_iter(&text) {
            let (Some(whole), Some(heading)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            current.push_str(&text[last..whole.start()]);
            push_chapter(&mut chapters, &current);
            current = heading.as_str().to_string();
            last = whole.end();
        }
        current.push_str(&text[last..]);
        push_chapter(&mut chapters, &current);

        chapters
    }

    /// Window one chapter's words into chunks.
    pub fn chunk_chapter(&self, chapter: &str, chapter_id: usize) -> Vec<EvidenceChunk> {
        let words: Vec<&str> = chapter.split_whitespace().collect();
        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(EvidenceChunk {
                chunk_id: format!("{chapter_id}_{}", chunks.len()),
                chapter_id: Some(chapter_id),
                start_word: Some(start),
                end_word: Some(end),
                text: words[start..end].join(" "),
            });
            start += step;
        }

        chunks
    }

    /// Chunk a whole novel, chapter by chapter.
    pub fn chunk(&self, text: &str) -> Vec<EvidenceChunk> {
        self.split_chapters(text)
            .iter()
            .enumerate()
            .flat_map(|(chapter_id, chapter)| self.chunk_chapter(chapter, chapter_id))
            .collect()
    }
}

fn push_chapter(chapters: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chapters.push(trimmed.to_string());
    }
}
