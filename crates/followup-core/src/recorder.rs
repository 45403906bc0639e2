//! Dual-write recorder: one logical write fanned out to both stores.
//!
//! The structured row and the index entry share the same id. The two writes
//! are not wrapped in a cross-store transaction; if the index write fails
//! after the row insert, the call errors and the row stays behind. That
//! divergence is detectable and repairable via [`Recorder::reconcile`].

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::index::{IndexEntry, SimilarityIndex};
use crate::store::CommitmentStore;
use crate::types::{Commitment, CommitmentDraft};

/// Outcome of a divergence sweep between the two stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Structured rows that were missing from the index and got re-indexed.
    pub reindexed: usize,
    /// Index entries with no structured row that were removed.
    pub removed: usize,
}

pub struct Recorder<'a> {
    store: &'a CommitmentStore,
    index: &'a mut dyn SimilarityIndex,
}

impl<'a> Recorder<'a> {
    pub fn new(store: &'a CommitmentStore, index: &'a mut dyn SimilarityIndex) -> Recorder<'a> {
        Recorder { store, index }
    }

    /// Persist every draft under a fresh id, row first, then index entry.
    ///
    /// Returns the materialized records in input order.
    pub fn record(
        &mut self,
        meeting_id: &str,
        meeting_title: &str,
        drafts: &[CommitmentDraft],
    ) -> Result<Vec<Commitment>> {
        if drafts.is_empty() {
            return Err(EngineError::NoCommitments);
        }
        let mut recorded = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let commitment = Commitment::from_draft(meeting_id, meeting_title, draft);
            self.store.insert_commitment(&commitment)?;
            self.index.upsert(&IndexEntry::from_commitment(&commitment))?;
            recorded.push(commitment);
        }
        Ok(recorded)
    }

    /// Sweep both stores for ids present in one but not the other.
    ///
    /// Rows missing from the index are re-indexed from the structured store
    /// (the store is the source of truth; rows are never deleted). Index
    /// entries without a row are dropped.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for commitment in self.store.list_all()? {
            if !self.index.contains(&commitment.id)? {
                self.index.upsert(&IndexEntry::from_commitment(&commitment))?;
                report.reindexed += 1;
            }
        }

        let store_ids: HashSet<String> = self.store.commitment_ids()?.into_iter().collect();
        for id in self.index.ids()? {
            if !store_ids.contains(&id) {
                self.index.remove(&id)?;
                report.removed += 1;
            }
        }

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
