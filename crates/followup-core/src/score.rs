//! Health scoring: fold a flag set into a 0-100 score plus label.
//!
//! Penalties live in a table rather than inline conditionals so the
//! weighting can be tuned and tested independently of the evaluator.

use serde::{Deserialize, Serialize};

use crate::types::{FlagKind, HealthLabel, HealthScore, RiskFlag};

// ---------------------------------------------------------------------------
// PenaltyTable
// ---------------------------------------------------------------------------

/// Points subtracted from 100 per flag, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTable {
    pub no_owner: u32,
    pub no_deadline: u32,
    pub vague_commitment: u32,
    pub overloaded_owner: u32,
    pub repeated_topic: u32,
}

impl Default for PenaltyTable {
    fn default() -> PenaltyTable {
        PenaltyTable {
            no_owner: 15,
            repeated_topic: 12,
            no_deadline: 10,
            overloaded_owner: 10,
            vague_commitment: 8,
        }
    }
}

impl PenaltyTable {
    pub fn penalty(&self, kind: FlagKind) -> u32 {
        match kind {
            FlagKind::NoOwner => self.no_owner,
            FlagKind::NoDeadline => self.no_deadline,
            FlagKind::VagueCommitment => self.vague_commitment,
            FlagKind::OverloadedOwner => self.overloaded_owner,
            FlagKind::RepeatedTopic => self.repeated_topic,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Pure, order-independent fold: 100 minus the summed penalties,
/// saturating at 0.
pub fn health_score(flags: &[RiskFlag], table: &PenaltyTable) -> HealthScore {
    let total: u32 = flags.iter().map(|f| table.penalty(f.kind)).sum();
    let score = 100u32.saturating_sub(total);
    HealthScore {
        score,
        label: HealthLabel::for_score(score),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
