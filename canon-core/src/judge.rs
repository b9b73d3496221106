//! Per-claim judgment against canon and retrieved evidence.
//!
//! The judge walks an ordered rule table; the first rule whose predicate
//! holds decides the claim. When none applies, retrieved evidence votes.

use crate::canon::CanonRuleSet;
use crate::evidence::ScoredEvidence;
use crate::tokenize::{overlap, token_set};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Evidence must share at least this many tokens with a claim to vote.
const MIN_VOTING_OVERLAP: usize = 2;

/// The judgment for a single claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimDecision {
    Supported,
    Contradicted,
    Unclear,
}

impl ClaimDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimDecision::Supported => "SUPPORTED",
            ClaimDecision::Contradicted => "CONTRADICTED",
            ClaimDecision::Unclear => "UNCLEAR",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ClaimDecision::Supported)
    }

    pub fn is_contradicted(&self) -> bool {
        matches!(self, ClaimDecision::Contradicted)
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, ClaimDecision::Unclear)
    }
}

impl fmt::Display for ClaimDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonRule {
    /// A forbidden phrase for the character appears in the claim.
    CanonicalOverride,
    /// The claim gives a life after death in confinement.
    DiesInConfinement,
    /// The claim frees a character who never escapes.
    NeverEscapes,
    /// The claim brings together characters who never meet.
    ImpossibleMeeting,
    /// The claim describes a new, unrecorded event.
    NewEvent,
    /// Retrieved evidence decided.
    EvidenceVote,
}

impl CanonRule {
    pub fn name(&self) -> &'static str {
        match self {
            CanonRule::CanonicalOverride => "canonical override",
            CanonRule::DiesInConfinement => "dies in confinement",
            CanonRule::NeverEscapes => "never escapes",
            CanonRule::ImpossibleMeeting => "impossible meeting",
            CanonRule::NewEvent => "new event",
            CanonRule::EvidenceVote => "evidence vote",
        }
    }
}

impl fmt::Display for CanonRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decision with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub decision: ClaimDecision,
    pub rule: CanonRule,
}

/// Everything a rule predicate may look at.
struct RuleContext<'a> {
    claim: &'a str,
    character: &'a str,
    tokens: HashSet<String>,
    canon: &'a CanonRuleSet,
}

struct RuleEntry {
    rule: CanonRule,
    applies: fn(&RuleContext<'_>) -> bool,
    outcome: ClaimDecision,
}

/// Canon rules in priority order; first match wins.
const CANON_RULES: &[RuleEntry] = &[
    RuleEntry {
        rule: CanonRule::CanonicalOverride,
        applies: canonical_override,
        outcome: ClaimDecision::Contradicted,
    },
    RuleEntry {
        rule: CanonRule::DiesInConfinement,
        applies: life_after_confinement,
        outcome: ClaimDecision::Contradicted,
    },
    RuleEntry {
        rule: CanonRule::NeverEscapes,
        applies: escape_from_confinement,
        outcome: ClaimDecision::Contradicted,
    },
    RuleEntry {
        rule: CanonRule::ImpossibleMeeting,
        applies: impossible_meeting,
        outcome: ClaimDecision::Contradicted,
    },
    RuleEntry {
        rule: CanonRule::NewEvent,
        applies: new_event,
        outcome: ClaimDecision::Unclear,
    },
];

fn canonical_override(ctx: &RuleContext<'_>) -> bool {
    ctx.canon.violates_override(ctx.character, ctx.claim)
}

fn life_after_confinement(ctx: &RuleContext<'_>) -> bool {
    ctx.canon.dies_in_confinement(ctx.character)
        && ctx.canon.afterlife_markers.iter().any(|m| ctx.tokens.contains(m))
}

fn escape_from_confinement(ctx: &RuleContext<'_>) -> bool {
    ctx.canon.never_escapes(ctx.character)
        && ctx.canon.escape_markers.iter().any(|m| ctx.tokens.contains(m))
}

/// Fires only when the claim names exactly one pair and that pair never meets.
fn impossible_meeting(ctx: &RuleContext<'_>) -> bool {
    match ctx.canon.named_in(&ctx.tokens).as_slice() {
        [a, b] => ctx.canon.is_impossible_meeting(a, b),
        _ => false,
    }
}

fn new_event(ctx: &RuleContext<'_>) -> bool {
    ctx.canon.new_event_markers.iter().any(|m| ctx.tokens.contains(m))
}

/// Classifies claims. Stateless apart from the shared canon.
#[derive(Debug, Clone)]
pub struct ClaimJudge {
    canon: Arc<CanonRuleSet>,
}

impl ClaimJudge {
    pub fn new(canon: Arc<CanonRuleSet>) -> Self {
        Self { canon }
    }

    /// Decide one claim.
    pub fn judge(&self, claim: &str, evidence: &[ScoredEvidence<'_>], character: &str) -> ClaimDecision {
        self.explain(claim, evidence, character).decision
    }

    /// Decide one claim and report which rule decided it.
    pub fn explain(&self, claim: &str, evidence: &[ScoredEvidence<'_>], character: &str) -> Judgment {
        let ctx = RuleContext {
            claim,
            character,
            tokens: token_set(claim, &self.canon.stopwords),
            canon: &self.canon,
        };

        if let Some(entry) = CANON_RULES.iter().find(|entry| (entry.applies)(&ctx)) {
            return Judgment {
                decision: entry.outcome,
                rule: entry.rule,
            };
        }

        Judgment {
            decision: self.vote(&ctx.tokens, evidence),
            rule: CanonRule::EvidenceVote,
        }
    }

    fn vote(&self, claim_tokens: &HashSet<String>, evidence: &[ScoredEvidence<'_>]) -> ClaimDecision {
        let mut support = 0;
        let mut contradict = 0;

        for ev in evidence {
            let ev_tokens = token_set(ev.text(), &self.canon.stopwords);
            if overlap(claim_tokens, &ev_tokens) < MIN_VOTING_OVERLAP {
                continue;
            }
            if ev_tokens.iter().any(|t| self.canon.is_negation(t)) {
                contradict += 1;
            } else {
                support += 1;
            }
        }

        if contradict > 0 && support == 0 {
            ClaimDecision::Contradicted
        } else if support > 0 {
            ClaimDecision::Supported
        } else {
            ClaimDecision::Unclear
        }
    }
}

/// Judge with the standard canon.
pub fn judge_claim(claim: &str, evidence: &[ScoredEvidence<'_>], character: &str) -> ClaimDecision {
    ClaimJudge::new(CanonRuleSet::standard()).judge(claim, evidence, character)
}
