//! Subcommand implementations.
//!
//! Each returns `Ok(false)` when the command ran but some of its work failed.

use crate::PipelineArgs;
use canon_core::{
    read_records, run_batch, summarize, write_results, AggregationPolicy, CanonRuleSet,
    DirectoryNovelSource, NovelCache, Pipeline, PipelineConfig,
};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

const PREVIEW_CHARS: usize = 300;

async fn build_pipeline(
    args: &PipelineArgs,
) -> Result<Pipeline<DirectoryNovelSource>, Box<dyn Error>> {
    let mut config = PipelineConfig::new(args.policy.into()).with_top_k(args.top_k);
    if let Some(path) = &args.canon {
        let canon = CanonRuleSet::from_json_file(path).await?;
        info!(path = %path.display(), "loaded canon rules");
        config = config.with_canon(Arc::new(canon));
    }

    Ok(Pipeline::new(config, DirectoryNovelSource::new(&args.data_dir)))
}

pub async fn run(input: &Path, output: &Path, args: &PipelineArgs) -> Result<bool, Box<dyn Error>> {
    let records = read_records(input).await?;
    let policy = AggregationPolicy::from(args.policy);
    info!(records = records.len(), %policy, "starting batch");

    let mut pipeline = build_pipeline(args).await?;
    let report = run_batch(&mut pipeline, &records);
    write_results(output, &report.outputs).await?;

    println!(
        "Wrote {} results to {}",
        report.outputs.len(),
        output.display()
    );
    for failure in &report.failures {
        error!(id = %failure.id, error = %failure.error, "record not processed");
        eprintln!("[FAILED] record {}: {}", failure.id, failure.error);
    }

    Ok(report.is_complete())
}

pub async fn check(
    character: &str,
    book: &str,
    backstory: &str,
    explain: bool,
    args: &PipelineArgs,
) -> Result<bool, Box<dyn Error>> {
    let mut pipeline = build_pipeline(args).await?;
    let verdict = pipeline.process_record(character, book, backstory)?;

    println!("{} - {}", verdict.label(), verdict.rationale);

    if explain {
        if verdict.short_circuited {
            println!("  (rejected by hard canon before claim checks)");
        }
        for outcome in &verdict.claims {
            println!(
                "  [{}] {} ({})",
                outcome.decision, outcome.claim.text, outcome.rule
            );
            if !outcome.evidence_ids.is_empty() {
                println!("      evidence: {}", outcome.evidence_ids.join(", "));
            }
        }
        println!(
            "  supported={} contradicted={} unclear={}",
            verdict.tally.supported, verdict.tally.contradicted, verdict.tally.unclear
        );
    }

    Ok(true)
}

pub fn index(book: &str, data_dir: &Path) -> Result<bool, Box<dyn Error>> {
    let mut cache = NovelCache::new(DirectoryNovelSource::new(data_dir));
    let index = cache.get_or_load(book)?;

    println!("Book:     {}", index.book());
    println!("Chapters: {}", index.chapter_count());
    println!("Chunks:   {}", index.chunk_count());

    if let Some(first) = index.chunks().first() {
        let preview: String = first.text.chars().take(PREVIEW_CHARS).collect();
        println!();
        println!("[{}] {}", first.chunk_id, preview);
    }

    Ok(true)
}

pub async fn inspect(input: &Path) -> Result<bool, Box<dyn Error>> {
    let records = read_records(input).await?;
    let summary = summarize(&records);

    println!("Records:    {}", summary.records);
    println!("Characters: {}", summary.characters.len());
    for (book, count) in &summary.books {
        println!("  {book}: {count}");
    }
    if !summary.characters.is_empty() {
        let names: Vec<&str> = summary.characters.iter().map(String::as_str).collect();
        println!("  {}", names.join(", "));
    }

    Ok(true)
}
