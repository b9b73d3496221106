//! Backstory consistency checking against novel canon.
//!
//! This crate provides:
//! - Claim extraction from free-text backstories
//! - Character-aware lexical evidence retrieval over novel chunks
//! - Rule-based per-claim judgment against hardcoded canon
//! - Aggregation of claim decisions into a binary verdict
//! - Novel loading, chapter-aware chunking and a per-book cache
//! - JSON record I/O and a batch driver
//!
//! # Quick Start
//!
//! ```ignore
//! use canon_core::{AggregationPolicy, DirectoryNovelSource, Pipeline, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::new(AggregationPolicy::Strict);
//!     let mut pipeline = Pipeline::new(config, DirectoryNovelSource::new("data"));
//!
//!     let verdict = pipeline.process_record(
//!         "Thalcave",
//!         "In Search of the Castaways",
//!         "Thalcave guided the explorers through Patagonia.",
//!     )?;
//!     println!("{} - {}", verdict.label(), verdict.rationale);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod canon;
pub mod claims;
pub mod evidence;
pub mod judge;
pub mod novel;
pub mod pipeline;
pub mod records;
pub mod testing;
pub mod tokenize;

// Primary public API
pub use aggregate::{aggregate, AggregationPolicy, DecisionTally, Verdict};
pub use canon::{CanonError, CanonRuleSet};
pub use claims::{extract_claims, Claim, ClaimExtractor};
pub use evidence::{retrieve_evidence, EvidenceChunk, EvidenceRetriever, ScoredEvidence};
pub use judge::{judge_claim, CanonRule, ClaimDecision, ClaimJudge, Judgment};
pub use novel::{BookIndex, ChapterChunker, DirectoryNovelSource, NovelCache, NovelError, NovelSource};
pub use pipeline::{ClaimOutcome, ConsistencyVerdict, Pipeline, PipelineConfig, PipelineError};
pub use records::{
    read_records, run_batch, summarize, write_results, BatchReport, DatasetSummary, InputRecord,
    OutputRecord, RecordError, RecordId,
};
