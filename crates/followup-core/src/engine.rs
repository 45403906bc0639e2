//! Engine façade: the entry points callers (and the HTTP surface) use.
//!
//! Stores and collaborators are injected at construction, so tests can run
//! the whole engine against in-memory stores and deterministic fakes.

use serde::Serialize;

use crate::compose::{build_context, NO_MATCH_ANSWER};
use crate::error::{EngineError, Result};
use crate::index::SimilarityIndex;
use crate::llm::{Answerer, Extractor};
use crate::recorder::{ReconcileReport, Recorder};
use crate::risk::RiskEvaluator;
use crate::score::{health_score, PenaltyTable};
use crate::store::CommitmentStore;
use crate::types::{Commitment, CommitmentDraft, HealthLabel, RiskFlag};

// ---------------------------------------------------------------------------
// Entry-point outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub meeting_id: String,
    pub meeting_title: String,
    pub extracted_count: usize,
    pub health_score: u32,
    pub health_label: HealthLabel,
    pub commitments: Vec<Commitment>,
    pub risk_flags: Vec<RiskFlag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub total: usize,
    pub commitments: Vec<Commitment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub health_score: u32,
    pub health_label: HealthLabel,
    pub total_commitments: usize,
    pub total_risks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub total_risks: usize,
    pub risks: Vec<RiskFlag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    store: CommitmentStore,
    index: Box<dyn SimilarityIndex>,
    extractor: Box<dyn Extractor>,
    answerer: Box<dyn Answerer>,
    penalties: PenaltyTable,
}

impl Engine {
    pub fn new(
        store: CommitmentStore,
        index: Box<dyn SimilarityIndex>,
        extractor: Box<dyn Extractor>,
        answerer: Box<dyn Answerer>,
    ) -> Engine {
        Engine {
            store,
            index,
            extractor,
            answerer,
            penalties: PenaltyTable::default(),
        }
    }

    pub fn with_penalties(mut self, penalties: PenaltyTable) -> Engine {
        self.penalties = penalties;
        self
    }

    /// Persist one meeting's worth of structured commitments, then evaluate
    /// the new batch against both stores and score it.
    ///
    /// An empty batch is a client-input error, not a crash.
    pub fn ingest(&mut self, meeting_title: &str, drafts: &[CommitmentDraft]) -> Result<IngestOutcome> {
        if drafts.is_empty() {
            return Err(EngineError::NoCommitments);
        }
        let meeting = self.store.create_meeting(meeting_title)?;
        let commitments = Recorder::new(&self.store, self.index.as_mut()).record(
            &meeting.id,
            &meeting.title,
            drafts,
        )?;
        let flags = RiskEvaluator::new(&self.store, self.index.as_ref())
            .evaluate(&commitments, Some(&meeting.id))?;
        let health = health_score(&flags, &self.penalties);

        Ok(IngestOutcome {
            meeting_id: meeting.id,
            meeting_title: meeting.title,
            extracted_count: commitments.len(),
            health_score: health.score,
            health_label: health.label,
            commitments,
            risk_flags: flags,
        })
    }

    /// Extraction path: delegate the transcript to the collaborator, then
    /// ingest whatever it produced.
    pub fn ingest_transcript(&mut self, meeting_title: &str, transcript: &str) -> Result<IngestOutcome> {
        let drafts = self.extractor.extract(transcript)?;
        self.ingest(meeting_title, &drafts)
    }

    /// All commitments, or one owner's, newest first.
    pub fn list(&self, owner: Option<&str>) -> Result<Listing> {
        let commitments = match owner {
            Some(owner) => self.store.list_by_owner(owner)?,
            None => self.store.list_all()?,
        };
        Ok(Listing {
            total: commitments.len(),
            commitments,
        })
    }

    /// Re-evaluate the entire store and fold the flags into one score.
    pub fn health(&self) -> Result<HealthReport> {
        let all = self.store.list_all()?;
        let flags = RiskEvaluator::new(&self.store, self.index.as_ref()).evaluate(&all, None)?;
        let health = health_score(&flags, &self.penalties);
        Ok(HealthReport {
            health_score: health.score,
            health_label: health.label,
            total_commitments: all.len(),
            total_risks: flags.len(),
        })
    }

    /// Every current flag across the entire store.
    pub fn risks(&self) -> Result<RiskReport> {
        let all = self.store.list_all()?;
        let flags = RiskEvaluator::new(&self.store, self.index.as_ref()).evaluate(&all, None)?;
        Ok(RiskReport {
            total_risks: flags.len(),
            risks: flags,
        })
    }

    /// Retrieval-backed question answering. Zero matches short-circuits
    /// with a sentinel answer and never invokes the collaborator.
    pub fn query(&self, question: &str) -> Result<Answer> {
        let answer = match build_context(self.index.as_ref(), question)? {
            None => NO_MATCH_ANSWER.to_string(),
            Some(context) => self.answerer.answer(question, &context)?,
        };
        Ok(Answer {
            question: question.to_string(),
            answer,
        })
    }

    /// Sweep the two stores back into agreement after a partial write.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        Recorder::new(&self.store, self.index.as_mut()).reconcile()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
