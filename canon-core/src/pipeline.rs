//! Pipeline - the primary public API for checking a backstory.
//!
//! Wraps claim extraction, evidence retrieval, judgment and aggregation,
//! plus the novel cache, behind a single `process_record` call.

use crate::aggregate::{AggregationPolicy, DecisionTally, Verdict};
use crate::canon::CanonRuleSet;
use crate::claims::{Claim, ClaimExtractor, DEFAULT_MIN_CLAIM_LEN};
use crate::evidence::{EvidenceChunk, EvidenceRetriever, DEFAULT_TOP_K};
use crate::judge::{CanonRule, ClaimDecision, ClaimJudge};
use crate::novel::{NovelCache, NovelError, NovelSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const RATIONALE_HARD_CANON: &str = "Backstory contradicts immutable narrative constraints.";
pub const RATIONALE_CONTRADICTED: &str =
    "Backstory contradicts constraints established in the novel.";
pub const RATIONALE_SUPPORTED: &str =
    "Backstory is consistent with and partially supported by the novel.";
pub const RATIONALE_UNCONTRADICTED: &str = "Backstory does not contradict the novel narrative.";
pub const RATIONALE_NO_CLAIMS: &str =
    "Backstory has no verifiable claims to check against the novel.";
pub const RATIONALE_UNSUPPORTED: &str = "Backstory lacks sufficient support in the novel.";

/// Errors from processing a record.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Novel error: {0}")]
    Novel(#[from] NovelError),
}

/// Configuration for a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How per-claim decisions become a verdict.
    pub policy: AggregationPolicy,

    /// Evidence chunks consulted per claim.
    pub top_k: usize,

    /// Shortest sentence accepted as a claim.
    pub min_claim_len: usize,

    /// Canon tables shared by every stage.
    pub canon: Arc<CanonRuleSet>,
}

impl PipelineConfig {
    /// A config with the standard canon. The policy has no default.
    pub fn new(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            top_k: DEFAULT_TOP_K,
            min_claim_len: DEFAULT_MIN_CLAIM_LEN,
            canon: CanonRuleSet::standard(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_claim_len(mut self, min_claim_len: usize) -> Self {
        self.min_claim_len = min_claim_len;
        self
    }

    pub fn with_canon(mut self, canon: Arc<CanonRuleSet>) -> Self {
        self.canon = canon;
        self
    }
}

/// How one claim was judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub claim: Claim,
    pub decision: ClaimDecision,
    pub rule: CanonRule,
    /// Ids of the evidence chunks retrieved for the claim.
    pub evidence_ids: Vec<String>,
}

/// The verdict for one backstory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyVerdict {
    pub verdict: Verdict,
    pub rationale: String,
    pub tally: DecisionTally,
    /// Per-claim details; empty when hard canon rejected the backstory.
    pub claims: Vec<ClaimOutcome>,
    /// Whether the row-level canon check decided without extracting claims.
    pub short_circuited: bool,
}

impl ConsistencyVerdict {
    /// 0 for contradicted, 1 for consistent.
    pub fn label(&self) -> u8 {
        self.verdict.label()
    }

    fn hard_canon() -> Self {
        Self {
            verdict: Verdict::Contradicted,
            rationale: RATIONALE_HARD_CANON.to_string(),
            tally: DecisionTally::default(),
            claims: Vec::new(),
            short_circuited: true,
        }
    }
}

fn rationale(policy: AggregationPolicy, tally: &DecisionTally, verdict: Verdict) -> &'static str {
    match (policy, verdict) {
        (AggregationPolicy::Strict, Verdict::Contradicted) => RATIONALE_CONTRADICTED,
        (AggregationPolicy::Strict, Verdict::Consistent) if tally.supported > 0 => {
            RATIONALE_SUPPORTED
        }
        (AggregationPolicy::Strict, Verdict::Consistent) => RATIONALE_UNCONTRADICTED,
        (AggregationPolicy::Graduated, _) if tally.is_empty() => RATIONALE_NO_CLAIMS,
        (AggregationPolicy::Graduated, Verdict::Consistent) => RATIONALE_SUPPORTED,
        (AggregationPolicy::Graduated, Verdict::Contradicted) if tally.contradicted > 0 => {
            RATIONALE_CONTRADICTED
        }
        (AggregationPolicy::Graduated, Verdict::Contradicted) => RATIONALE_UNSUPPORTED,
    }
}

/// Checks backstories against the novels supplied by `S`.
pub struct Pipeline<S> {
    config: PipelineConfig,
    extractor: ClaimExtractor,
    retriever: EvidenceRetriever,
    judge: ClaimJudge,
    cache: NovelCache<S>,
}

impl<S: NovelSource> Pipeline<S> {
    pub fn new(config: PipelineConfig, source: S) -> Self {
        Self::with_cache(config, NovelCache::new(source))
    }

    /// Build a pipeline around an existing (possibly warmed) cache.
    pub fn with_cache(config: PipelineConfig, cache: NovelCache<S>) -> Self {
        let canon = Arc::clone(&config.canon);
        Self {
            extractor: ClaimExtractor::new(Arc::clone(&canon)).with_min_len(config.min_claim_len),
            retriever: EvidenceRetriever::new(Arc::clone(&canon)).with_top_k(config.top_k),
            judge: ClaimJudge::new(canon),
            config,
            cache,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &NovelCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut NovelCache<S> {
        &mut self.cache
    }

    /// Check one backstory about `character` against `book`.
    ///
    /// Hard canon is checked first, before the novel is loaded.
    pub fn process_record(
        &mut self,
        character: &str,
        book: &str,
        backstory: &str,
    ) -> Result<ConsistencyVerdict, PipelineError> {
        if self.config.canon.violates_override(character, backstory) {
            info!(character, book, "backstory rejected by hard canon");
            return Ok(ConsistencyVerdict::hard_canon());
        }

        let index = self.cache.get_or_load(book)?;
        let verdict = self.judge_claims(character, index.chunks(), backstory);
        info!(
            character,
            book,
            label = verdict.label(),
            supported = verdict.tally.supported,
            contradicted = verdict.tally.contradicted,
            unclear = verdict.tally.unclear,
            "processed record"
        );
        Ok(verdict)
    }

    /// Check one backstory against caller-supplied chunks. No I/O.
    pub fn evaluate(
        &self,
        character: &str,
        chunks: &[EvidenceChunk],
        backstory: &str,
    ) -> ConsistencyVerdict {
        if self.config.canon.violates_override(character, backstory) {
            return ConsistencyVerdict::hard_canon();
        }
        self.judge_claims(character, chunks, backstory)
    }

    fn judge_claims(
        &self,
        character: &str,
        chunks: &[EvidenceChunk],
        backstory: &str,
    ) -> ConsistencyVerdict {
        let mut tally = DecisionTally::default();
        let mut outcomes = Vec::new();

        for claim in self.extractor.extract(backstory, character) {
            let evidence = self.retriever.retrieve(&claim.text, chunks, character);
            let judgment = self.judge.explain(&claim.text, &evidence, character);
            debug!(
                position = claim.position,
                decision = %judgment.decision,
                rule = %judgment.rule,
                evidence = evidence.len(),
                "judged claim"
            );

            tally.record(judgment.decision);
            outcomes.push(ClaimOutcome {
                evidence_ids: evidence.iter().map(|e| e.chunk_id().to_string()).collect(),
                claim,
                decision: judgment.decision,
                rule: judgment.rule,
            });
        }

        let policy = self.config.policy;
        let verdict = policy.verdict(&tally);
        ConsistencyVerdict {
            verdict,
            rationale: rationale(policy, &tally, verdict).to_string(),
            tally,
            claims: outcomes,
            short_circuited: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryNovels;

    fn castaways() -> InMemoryNovels {
        InMemoryNovels::new().with_novel(
            "In Search of the Castaways",
            "CHAPTER I\nThalcave crossed the Andes with the explorers.\n\
             CHAPTER II\nThalcave never abandoned his horse Thaouka.",
        )
    }

    #[test]
    fn test_hard_canon_skips_loading() {
        let mut pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Strict), castaways());
        let verdict = pipeline
            .process_record("Faria", "Unknown Book", "Faria lived quietly in Marseille.")
            .unwrap();

        assert_eq!(verdict.label(), 0);
        assert!(verdict.short_circuited);
        assert_eq!(verdict.rationale, RATIONALE_HARD_CANON);
        assert_eq!(pipeline.cache().source().load_count(), 0);
    }

    #[test]
    fn test_unknown_book_errors() {
        let mut pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Strict), castaways());
        let err = pipeline
            .process_record("Thalcave", "Moby Dick", "Thalcave crossed the Andes.")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Novel(NovelError::UnknownBook(_))));
    }

    #[test]
    fn test_supported_record() {
        let mut pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Strict), castaways());
        let verdict = pipeline
            .process_record(
                "Thalcave",
                "In Search of the Castaways",
                "Thalcave crossed the Andes with explorers.",
            )
            .unwrap();

        assert_eq!(verdict.label(), 1);
        assert_eq!(verdict.rationale, RATIONALE_SUPPORTED);
        assert_eq!(verdict.tally.supported, 1);
        // The second chapter shares only the name and does not vote.
        assert_eq!(verdict.claims[0].evidence_ids, vec!["0_0", "1_0"]);
    }

    #[test]
    fn test_strict_empty_backstory_is_consistent() {
        let pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Strict), castaways());
        let verdict = pipeline.evaluate("Thalcave", &[], "   ");
        assert_eq!(verdict.label(), 1);
        assert_eq!(verdict.rationale, RATIONALE_UNCONTRADICTED);
    }

    #[test]
    fn test_graduated_empty_backstory_fails() {
        let pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Graduated), castaways());
        let verdict = pipeline.evaluate("Thalcave", &[], "");
        assert_eq!(verdict.label(), 0);
        assert_eq!(verdict.rationale, RATIONALE_NO_CLAIMS);
    }

    #[test]
    fn test_graduated_unclear_only_fails() {
        let pipeline = Pipeline::new(PipelineConfig::new(AggregationPolicy::Graduated), castaways());
        let verdict = pipeline.evaluate("Thalcave", &[], "Thalcave admired the southern stars.");
        assert_eq!(verdict.tally.unclear, 1);
        assert_eq!(verdict.label(), 0);
        assert_eq!(verdict.rationale, RATIONALE_UNSUPPORTED);
    }

    #[test]
    fn test_policies_disagree_on_one_contradiction_and_two_supports() {
        let corpus = crate::testing::chunks(&[
            "Thalcave crossed the Andes with the explorers.",
            "Thalcave rode his horse Thaouka across the pampas.",
            "Thalcave never abandoned his friends on the road.",
        ]);
        let backstory = "Thalcave crossed the Andes with explorers. \
                         Thalcave rode Thaouka across the pampas. \
                         Thalcave abandoned his friends on the road.";

        let strict = Pipeline::new(PipelineConfig::new(AggregationPolicy::Strict), castaways())
            .evaluate("Thalcave", &corpus, backstory);
        let graduated = Pipeline::new(PipelineConfig::new(AggregationPolicy::Graduated), castaways())
            .evaluate("Thalcave", &corpus, backstory);

        for verdict in [&strict, &graduated] {
            assert_eq!(verdict.tally.supported, 2);
            assert_eq!(verdict.tally.contradicted, 1);
            assert_eq!(verdict.claims[2].decision, ClaimDecision::Contradicted);
        }

        assert_eq!(strict.label(), 0);
        assert_eq!(strict.rationale, RATIONALE_CONTRADICTED);
        assert_eq!(graduated.label(), 1);
        assert_eq!(graduated.rationale, RATIONALE_SUPPORTED);
    }

    #[test]
    fn test_rationale_table() {
        let mut tally = DecisionTally::default();
        tally.record(ClaimDecision::Contradicted);
        assert_eq!(
            rationale(AggregationPolicy::Graduated, &tally, Verdict::Contradicted),
            RATIONALE_CONTRADICTED
        );
        assert_eq!(
            rationale(AggregationPolicy::Strict, &tally, Verdict::Contradicted),
            RATIONALE_CONTRADICTED
        );
    }
}
