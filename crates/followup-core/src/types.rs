use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(crate::error::EngineError::InvalidPriority(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "done" => Ok(Status::Done),
            _ => Err(crate::error::EngineError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

// ---------------------------------------------------------------------------
// FlagKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    NoOwner,
    NoDeadline,
    VagueCommitment,
    OverloadedOwner,
    RepeatedTopic,
}

impl FlagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::NoOwner => "no_owner",
            FlagKind::NoDeadline => "no_deadline",
            FlagKind::VagueCommitment => "vague_commitment",
            FlagKind::OverloadedOwner => "overloaded_owner",
            FlagKind::RepeatedTopic => "repeated_topic",
        }
    }
}

// ---------------------------------------------------------------------------
// HealthLabel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Healthy,
    #[serde(rename = "At Risk")]
    AtRisk,
    Critical,
}

impl HealthLabel {
    /// Map a 0-100 score onto its categorical label.
    pub fn for_score(score: u32) -> HealthLabel {
        if score >= 75 {
            HealthLabel::Healthy
        } else if score >= 50 {
            HealthLabel::AtRisk
        } else {
            HealthLabel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthLabel::Healthy => "Healthy",
            HealthLabel::AtRisk => "At Risk",
            HealthLabel::Critical => "Critical",
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Meeting
// ---------------------------------------------------------------------------

/// One ingestion event. Immutable after creation, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

impl Meeting {
    pub fn new(title: &str) -> Meeting {
        Meeting {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: now_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// CommitmentDraft
// ---------------------------------------------------------------------------

/// The shape the extraction collaborator produces, before persistence.
///
/// Decoding is the defensive boundary: a missing `task` or an unknown
/// `priority` makes the entry undeserializable, and the caller drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentDraft {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_vague: bool,
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A persisted action item. Mutated only by status transitions, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commitment {
    pub id: String,
    pub meeting_id: String,
    /// Denormalized so listings render without a join.
    pub meeting_title: String,
    pub task: String,
    pub owner: Option<String>,
    pub deadline: Option<String>,
    pub priority: Priority,
    pub is_vague: bool,
    pub status: Status,
    pub created_at: String,
}

impl Commitment {
    /// Materialize a draft into a new record bound to its meeting.
    pub fn from_draft(meeting_id: &str, meeting_title: &str, draft: &CommitmentDraft) -> Commitment {
        Commitment {
            id: Uuid::new_v4().to_string(),
            meeting_id: meeting_id.to_string(),
            meeting_title: meeting_title.to_string(),
            task: draft.task.clone(),
            owner: draft.owner.clone(),
            deadline: draft.deadline.clone(),
            priority: draft.priority,
            is_vague: draft.is_vague,
            status: Status::Open,
            created_at: now_rfc3339(),
        }
    }

    /// The owner, treating an empty string the same as absent.
    pub fn assigned_owner(&self) -> Option<&str> {
        self.owner.as_deref().filter(|o| !o.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// RiskFlag
// ---------------------------------------------------------------------------

/// One finding from one risk predicate against one commitment.
/// Produced fresh on every evaluation, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFlag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub severity: Severity,
    pub insight: String,
}

// ---------------------------------------------------------------------------
// HealthScore
// ---------------------------------------------------------------------------

/// 0-100 score plus label, recomputed on demand from the current flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u32,
    pub label: HealthLabel,
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Current UTC time as RFC 3339 with microsecond precision.
///
/// Microseconds keep `ORDER BY created_at DESC` stable for commitments
/// written in the same batch.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_through_str() {
        for p in [Priority::High, Priority::Medium, Priority::Low] {
            let parsed: Priority = p.as_str().parse().unwrap();
            assert_eq!(parsed, p);
        }
    }

    #[test]
    fn priority_rejects_unknown_value() {
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn health_label_thresholds() {
        assert_eq!(HealthLabel::for_score(100), HealthLabel::Healthy);
        assert_eq!(HealthLabel::for_score(75), HealthLabel::Healthy);
        assert_eq!(HealthLabel::for_score(74), HealthLabel::AtRisk);
        assert_eq!(HealthLabel::for_score(50), HealthLabel::AtRisk);
        assert_eq!(HealthLabel::for_score(49), HealthLabel::Critical);
        assert_eq!(HealthLabel::for_score(0), HealthLabel::Critical);
    }

    #[test]
    fn health_label_serializes_with_spaces() {
        let json = serde_json::to_string(&HealthLabel::AtRisk).unwrap();
        assert_eq!(json, "\"At Risk\"");
    }

    #[test]
    fn draft_decodes_with_defaults() {
        let draft: CommitmentDraft =
            serde_json::from_str(r#"{"task": "Ship the beta"}"#).unwrap();
        assert_eq!(draft.task, "Ship the beta");
        assert!(draft.owner.is_none());
        assert!(draft.deadline.is_none());
        assert_eq!(draft.priority, Priority::Medium);
        assert!(!draft.is_vague);
    }

    #[test]
    fn draft_rejects_missing_task() {
        let result: Result<CommitmentDraft, _> =
            serde_json::from_str(r#"{"owner": "priya"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn draft_rejects_invalid_priority() {
        let result: Result<CommitmentDraft, _> =
            serde_json::from_str(r#"{"task": "x", "priority": "urgent"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn assigned_owner_treats_blank_as_absent() {
        let mut c = Commitment::from_draft(
            "m1",
            "Weekly sync",
            &CommitmentDraft {
                task: "Send notes".into(),
                owner: Some("  ".into()),
                deadline: None,
                priority: Priority::Medium,
                is_vague: false,
            },
        );
        assert!(c.assigned_owner().is_none());
        c.owner = Some("priya".into());
        assert_eq!(c.assigned_owner(), Some("priya"));
    }

    #[test]
    fn flag_kind_serializes_as_type_field() {
        let flag = RiskFlag {
            kind: FlagKind::NoOwner,
            task: "Ship the beta".into(),
            owner: None,
            severity: Severity::High,
            insight: "No owner assigned".into(),
        };
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["type"], "no_owner");
        assert_eq!(json["severity"], "high");
        assert!(json.get("owner").is_none());
    }
}
