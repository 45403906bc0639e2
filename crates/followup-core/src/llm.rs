//! LLM collaborators: commitment extraction and question answering.
//!
//! The engine depends on the [`Extractor`] and [`Answerer`] capabilities;
//! tests substitute deterministic fakes. [`OpenAiClient`] is the production
//! implementation against an OpenAI-compatible chat-completions endpoint.
//! Collaborator output is treated as trusted except for shape: extraction
//! entries that fail to decode are dropped, not fatal.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::types::CommitmentDraft;

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

pub trait Extractor: Send {
    /// Turn raw transcript text into structured commitment drafts.
    fn extract(&self, transcript: &str) -> Result<Vec<CommitmentDraft>>;
}

pub trait Answerer: Send {
    /// Answer `question` using the retrieved `context` block.
    fn answer(&self, question: &str, context: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are an expert at extracting commitments from meeting transcripts.

Return ONLY valid JSON matching this format:
{
  \"commitments\": [
    {
      \"task\": \"string\",
      \"owner\": \"string or null\",
      \"deadline\": \"string or null\",
      \"priority\": \"high|medium|low\",
      \"is_vague\": true or false
    }
  ]
}";

const ANSWER_SYSTEM_PROMPT: &str = "\
You are an execution intelligence assistant. Answer questions about \
commitments made in past meetings using only the provided context.";

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// Request timeout; the external call is the dominant latency source.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> LlmConfig {
        LlmConfig {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<OpenAiClient> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EngineError::Llm(format!("build http client: {e}")))?;
        Ok(OpenAiClient { http, config })
    }

    fn chat(&self, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| EngineError::Llm(format!("chat completion request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Llm(format!(
                "chat completion returned status {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| EngineError::Llm(format!("decode chat completion: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EngineError::Llm("chat completion had no choices".to_string()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl Extractor for OpenAiClient {
    fn extract(&self, transcript: &str) -> Result<Vec<CommitmentDraft>> {
        let user = format!("Extract all commitments from this meeting transcript:\n\n{transcript}");
        let content = self.chat(EXTRACTION_SYSTEM_PROMPT, &user)?;
        decode_drafts(&content)
    }
}

impl Answerer for OpenAiClient {
    fn answer(&self, question: &str, context: &str) -> Result<String> {
        let user = format!(
            "Based on these commitments from past meetings:\n\n{context}\n\n\
             Answer this question clearly and concisely: {question}"
        );
        self.chat(ANSWER_SYSTEM_PROMPT, &user)
    }
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// Decode the extraction payload, dropping entries that do not conform
/// (missing or empty `task`, unknown `priority`).
pub fn decode_drafts(content: &str) -> Result<Vec<CommitmentDraft>> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        commitments: Vec<serde_json::Value>,
    }

    let stripped = strip_code_fence(content);
    let payload: Payload = serde_json::from_str(stripped)
        .map_err(|e| EngineError::Llm(format!("extraction returned invalid JSON: {e}")))?;

    Ok(payload
        .commitments
        .into_iter()
        .filter_map(|v| serde_json::from_value::<CommitmentDraft>(v).ok())
        .filter(|d| !d.task.trim().is_empty())
        .collect())
}

/// Models often wrap JSON replies in a Markdown code fence despite the
/// prompt; tolerate that.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
