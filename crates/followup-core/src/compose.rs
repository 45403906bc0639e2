//! Query composition: turn a free-text question into the retrieval context
//! handed to the answering collaborator.

use crate::error::Result;
use crate::index::SimilarityIndex;

/// How many matches back a question's context block.
pub const CONTEXT_TOP_K: usize = 5;

/// Reply used when retrieval finds nothing; the LLM is never invoked then.
pub const NO_MATCH_ANSWER: &str = "No relevant commitments found in memory.";

/// Retrieve the top matches for `question` and format them as a
/// line-oriented context block in rank order. `None` means no matches.
pub fn build_context(index: &dyn SimilarityIndex, question: &str) -> Result<Option<String>> {
    let matches = index.query(question, CONTEXT_TOP_K)?;
    if matches.is_empty() {
        return Ok(None);
    }
    let lines: Vec<String> = matches
        .iter()
        .map(|m| {
            format!(
                "- Task: {} | Owner: {} | Deadline: {} | Meeting: {} | Status: {}",
                m.entry.text, m.entry.owner, m.entry.deadline, m.entry.meeting_title, m.entry.status
            )
        })
        .collect();
    Ok(Some(lines.join("\n")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
