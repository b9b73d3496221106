//! Tabular input and output records, and the batch driver over them.
//!
//! Records are stored as JSON arrays:
//!
//! ```json
//! [{ "id": 7, "book_name": "The Count of Monte Cristo", "char": "Faria", "content": "..." }]
//! ```

use crate::novel::NovelSource;
use crate::pipeline::{Pipeline, PipelineError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Errors from reading or writing record files.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A record identifier, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// One backstory to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub id: RecordId,
    pub book_name: String,
    /// Character name.
    #[serde(rename = "char")]
    pub character: String,
    /// The backstory text.
    pub content: String,
}

/// The verdict for one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: RecordId,
    pub prediction: u8,
    pub rationale: String,
}

/// A record the pipeline could not process.
#[derive(Debug)]
pub struct RecordFailure {
    pub id: RecordId,
    pub error: PipelineError,
}

/// Results of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Verdicts for the records that succeeded, in input order.
    pub outputs: Vec<OutputRecord>,
    /// Records that failed, in input order.
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read input records from a JSON array file.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<InputRecord>, RecordError> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Write output records as a pretty JSON array.
pub async fn write_results(
    path: impl AsRef<Path>,
    outputs: &[OutputRecord],
) -> Result<(), RecordError> {
    let content = serde_json::to_string_pretty(outputs)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Run every record through the pipeline, in order.
///
/// A failing record is reported and skipped; it never affects the others.
pub fn run_batch<S: NovelSource>(pipeline: &mut Pipeline<S>, records: &[InputRecord]) -> BatchReport {
    let mut report = BatchReport::default();

    for record in records {
        match pipeline.process_record(&record.character, &record.book_name, &record.content) {
            Ok(verdict) => report.outputs.push(OutputRecord {
                id: record.id.clone(),
                prediction: verdict.label(),
                rationale: verdict.rationale,
            }),
            Err(error) => {
                warn!(id = %record.id, book = %record.book_name, %error, "record failed");
                report.failures.push(RecordFailure {
                    id: record.id.clone(),
                    error,
                });
            }
        }
    }

    info!(
        processed = report.outputs.len(),
        failed = report.failures.len(),
        "batch complete"
    );
    report
}

/// Overview of an input dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub records: usize,
    /// Record count per book name.
    pub books: BTreeMap<String, usize>,
    /// Distinct character names.
    pub characters: BTreeSet<String>,
}

/// Count records per book and collect the characters.
pub fn summarize(records: &[InputRecord]) -> DatasetSummary {
    let mut summary = DatasetSummary {
        records: records.len(),
        ..Default::default()
    };
    for record in records {
        *summary.books.entry(record.book_name.clone()).or_insert(0) += 1;
        summary.characters.insert(record.character.clone());
    }
    summary
}
