//! Reducing per-claim decisions to one verdict.

use crate::judge::ClaimDecision;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary consistency verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Contradicted,
    Consistent,
}

impl Verdict {
    /// 0 for contradicted, 1 for consistent.
    pub fn label(&self) -> u8 {
        match self {
            Verdict::Contradicted => 0,
            Verdict::Consistent => 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, Verdict::Consistent)
    }
}

/// Decision counts for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTally {
    pub supported: usize,
    pub contradicted: usize,
    pub unclear: usize,
}

impl DecisionTally {
    pub fn from_decisions<'a>(decisions: impl IntoIterator<Item = &'a ClaimDecision>) -> Self {
        let mut tally = Self::default();
        for decision in decisions {
            tally.record(*decision);
        }
        tally
    }

    pub fn record(&mut self, decision: ClaimDecision) {
        match decision {
            ClaimDecision::Supported => self.supported += 1,
            ClaimDecision::Contradicted => self.contradicted += 1,
            ClaimDecision::Unclear => self.unclear += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.supported + self.contradicted + self.unclear
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// How a record's decisions become a verdict.
///
/// Two policies exist and neither is implied; callers pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Any contradiction fails the record; no claims passes.
    Strict,
    /// Evidence-weighted thresholds; no claims fails.
    Graduated,
}

impl AggregationPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationPolicy::Strict => "strict",
            AggregationPolicy::Graduated => "graduated",
        }
    }

    pub fn verdict(&self, tally: &DecisionTally) -> Verdict {
        match self {
            AggregationPolicy::Strict => strict_verdict(tally),
            AggregationPolicy::Graduated => graduated_verdict(tally),
        }
    }
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(AggregationPolicy::Strict),
            "graduated" => Ok(AggregationPolicy::Graduated),
            other => Err(format!("unknown aggregation policy: {other}")),
        }
    }
}

fn strict_verdict(tally: &DecisionTally) -> Verdict {
    if tally.contradicted >= 1 {
        Verdict::Contradicted
    } else {
        Verdict::Consistent
    }
}

fn graduated_verdict(tally: &DecisionTally) -> Verdict {
    let DecisionTally {
        supported: s,
        contradicted: c,
        ..
    } = *tally;

    if tally.is_empty() {
        // Nothing verifiable: fail safe.
        return Verdict::Contradicted;
    }
    if c >= 2 {
        return Verdict::Contradicted;
    }
    if c == 1 && s >= 2 {
        return Verdict::Consistent;
    }
    if s > c && s >= 1 {
        return Verdict::Consistent;
    }
    Verdict::Contradicted
}

/// Graduated aggregation of a decision sequence.
pub fn aggregate(decisions: &[ClaimDecision]) -> Verdict {
    graduated_verdict(&DecisionTally::from_decisions(decisions))
}
