//! Behavioural tests for the judgment pipeline stages.
//!
//! Run with: `cargo test -p canon-core --test scenarios`

use canon_core::testing::chunks;
use canon_core::{
    aggregate, extract_claims, judge_claim, retrieve_evidence, AggregationPolicy, DecisionTally,
    EvidenceChunk, Verdict,
};
use canon_core::ClaimDecision::{Contradicted, Supported, Unclear};

// =============================================================================
// Extraction
// =============================================================================

#[test]
fn test_extracts_three_thalcave_claims() {
    let claims = extract_claims(
        "Thalcave was courageous. He guided the explorers through Patagonia. He distrusted all foreigners.",
        "Thalcave",
    );
    assert_eq!(claims.len(), 3);
    assert!(claims.iter().all(|c| c.text.chars().count() >= 12));
    assert!(claims.iter().all(|c| c.character == "Thalcave"));
}

#[test]
fn test_short_sentences_never_become_claims() {
    // Every sentence names the character and is under 12 characters.
    let text = "Faria wept. Faria ran! Faria sang? Faria.";
    assert!(extract_claims(text, "Faria").is_empty());
}

#[test]
fn test_embedded_newlines_are_normalized() {
    let claims = extract_claims("Paganel studied\nthe maps of Chile.", "Paganel");
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].text, "Paganel studied the maps of Chile.");
}

// =============================================================================
// Retrieval
// =============================================================================

#[test]
fn test_retrieval_returns_negating_chunk_only() {
    let corpus = vec![
        EvidenceChunk::new("1", "Thalcave never trusted the foreign explorers."),
        EvidenceChunk::new("2", "The group traveled across Patagonia."),
    ];
    let evidence = retrieve_evidence("Thalcave distrusted foreign explorers", &corpus, "Thalcave", 5);

    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].chunk_id(), "1");
    assert!(evidence[0].has_negation);
}

#[test]
fn test_retrieval_ignores_chunks_without_character() {
    // Heavy overlap, but the character is never named.
    let corpus = chunks(&[
        "The guide distrusted foreign explorers crossing Patagonia.",
        "THALCAVE rode ahead.",
    ]);
    let evidence = retrieve_evidence(
        "Thalcave distrusted foreign explorers crossing Patagonia",
        &corpus,
        "thalcave",
        5,
    );
    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence[0].chunk_id(), "2");
}

// =============================================================================
// Judgment
// =============================================================================

#[test]
fn test_faria_escape_contradicted_without_evidence() {
    assert_eq!(judge_claim("Faria escaped the island after 1800", &[], "Faria"), Contradicted);
}

#[test]
fn test_faria_meeting_caderousse_contradicted() {
    assert_eq!(judge_claim("Faria met Caderousse at the inn", &[], "Faria"), Contradicted);
}

#[test]
fn test_judgment_end_to_end_over_corpus() {
    let corpus = chunks(&[
        "Paganel taught geography to the children aboard the Duncan.",
        "Paganel never learned Spanish, only Portuguese.",
    ]);

    let claim = "Paganel taught geography aboard the Duncan";
    let evidence = retrieve_evidence(claim, &corpus, "Paganel", 5);
    assert_eq!(judge_claim(claim, &evidence, "Paganel"), Supported);

    let claim = "Paganel learned Spanish fluently";
    let evidence = retrieve_evidence(claim, &corpus, "Paganel", 5);
    assert_eq!(judge_claim(claim, &evidence, "Paganel"), Contradicted);

    let claim = "Paganel helped the sailors";
    let evidence = retrieve_evidence(claim, &corpus, "Paganel", 5);
    assert_eq!(judge_claim(claim, &evidence, "Paganel"), Unclear);
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_aggregate_examples() {
    assert_eq!(aggregate(&[Supported, Supported, Unclear]).label(), 1);
    assert_eq!(aggregate(&[Unclear, Unclear]).label(), 0);
    assert_eq!(aggregate(&[]).label(), 0);
}

#[test]
fn test_policies_disagree_on_single_contradiction() {
    let tally = DecisionTally::from_decisions(&[Supported, Contradicted, Supported]);
    assert_eq!(AggregationPolicy::Graduated.verdict(&tally), Verdict::Consistent);
    assert_eq!(AggregationPolicy::Strict.verdict(&tally), Verdict::Contradicted);
}
