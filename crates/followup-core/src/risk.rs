//! Risk evaluation: independent predicates run against every commitment.
//!
//! The evaluator has no state of its own. Three checks look only at the
//! commitment; `overloaded_owner` queries the structured store and
//! `repeated_topic` queries the semantic index, so results reflect both
//! stores' contents at call time. All checks run for every commitment (no
//! short-circuiting) and a single commitment may accumulate several flags.

use crate::error::Result;
use crate::index::SimilarityIndex;
use crate::store::CommitmentStore;
use crate::types::{Commitment, FlagKind, RiskFlag, Severity};

/// An owner with strictly more open commitments than this is overloaded.
pub const OVERLOAD_THRESHOLD: u32 = 4;

/// How many index matches the repeated-topic check inspects.
pub const TOPIC_TOP_K: usize = 5;

pub struct RiskEvaluator<'a> {
    store: &'a CommitmentStore,
    index: &'a dyn SimilarityIndex,
}

impl<'a> RiskEvaluator<'a> {
    pub fn new(store: &'a CommitmentStore, index: &'a dyn SimilarityIndex) -> RiskEvaluator<'a> {
        RiskEvaluator { store, index }
    }

    /// Run every check against every commitment and collect all flags.
    ///
    /// `current_meeting` scopes the repeated-topic check: matches from that
    /// meeting are never counted as repeats. Pass `None` when evaluating the
    /// whole store outside any single ingestion.
    pub fn evaluate(
        &self,
        commitments: &[Commitment],
        current_meeting: Option<&str>,
    ) -> Result<Vec<RiskFlag>> {
        let mut flags = Vec::new();
        for c in commitments {
            flags.extend(check_no_owner(c));
            flags.extend(check_no_deadline(c));
            flags.extend(check_vague(c));
            flags.extend(self.check_overloaded_owner(c)?);
            flags.extend(self.check_repeated_topic(c, current_meeting)?);
        }
        Ok(flags)
    }

    /// Owner has more than [`OVERLOAD_THRESHOLD`] open commitments store-wide.
    fn check_overloaded_owner(&self, c: &Commitment) -> Result<Option<RiskFlag>> {
        let Some(owner) = c.assigned_owner() else {
            return Ok(None);
        };
        let open = self.store.open_count_for_owner(owner)?;
        if open <= OVERLOAD_THRESHOLD {
            return Ok(None);
        }
        Ok(Some(RiskFlag {
            kind: FlagKind::OverloadedOwner,
            task: c.task.clone(),
            owner: Some(owner.to_string()),
            severity: Severity::High,
            insight: format!("{owner} has {open} open commitments — overloaded"),
        }))
    }

    /// A similar task exists under a different meeting.
    ///
    /// Exact-text matches are excluded regardless of meeting so a commitment
    /// is never flagged against its own freshly indexed entry.
    fn check_repeated_topic(
        &self,
        c: &Commitment,
        current_meeting: Option<&str>,
    ) -> Result<Option<RiskFlag>> {
        let matches = self.index.query(&c.task, TOPIC_TOP_K)?;
        let task_lower = c.task.to_lowercase();
        let repeated = matches.iter().any(|m| {
            current_meeting.is_none_or(|cur| m.entry.meeting_id != cur)
                && m.entry.text.to_lowercase() != task_lower
        });
        if !repeated {
            return Ok(None);
        }
        Ok(Some(RiskFlag {
            kind: FlagKind::RepeatedTopic,
            task: c.task.clone(),
            owner: c.owner.clone(),
            severity: Severity::High,
            insight: format!(
                "'{}' has appeared in previous meetings without resolution",
                c.task
            ),
        }))
    }
}

fn check_no_owner(c: &Commitment) -> Option<RiskFlag> {
    if c.assigned_owner().is_some() {
        return None;
    }
    Some(RiskFlag {
        kind: FlagKind::NoOwner,
        task: c.task.clone(),
        owner: None,
        severity: Severity::High,
        insight: format!("No owner assigned for: '{}'", c.task),
    })
}

fn check_no_deadline(c: &Commitment) -> Option<RiskFlag> {
    if c.deadline.as_deref().is_some_and(|d| !d.trim().is_empty()) {
        return None;
    }
    Some(RiskFlag {
        kind: FlagKind::NoDeadline,
        task: c.task.clone(),
        owner: c.owner.clone(),
        severity: Severity::Medium,
        insight: format!("No deadline set for: '{}'", c.task),
    })
}

fn check_vague(c: &Commitment) -> Option<RiskFlag> {
    if !c.is_vague {
        return None;
    }
    Some(RiskFlag {
        kind: FlagKind::VagueCommitment,
        task: c.task.clone(),
        owner: c.owner.clone(),
        severity: Severity::Medium,
        insight: format!("Vague commitment with no clear action: '{}'", c.task),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
