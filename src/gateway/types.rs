//! Request and response payloads for the generation engine, plus the
//! candidate pair handed to operators.
//!
//! The wire structs follow the messages-endpoint format: a model, a token
//! budget, and a list of role/content messages in; content blocks and token
//! usage out.

use serde::{Deserialize, Serialize};

/// Request body for the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<PromptMessage>,
}

/// A single message in a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// Response body from the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: GenUsage,
}

/// One block of response content; only text blocks are expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl GenerationResponse {
    /// Concatenated text of all content blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Token usage reported for one generation call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl GenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Two alternative translations for one source text.
///
/// When the engine's response could not be decoded for a position, both
/// alternatives carry a failure marker annotated with the original text and
/// `fallback` is set, so the operator sees what happened instead of a
/// silently dropped item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub first: String,
    pub second: String,
    #[serde(default)]
    pub fallback: bool,
}

impl CandidatePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            fallback: false,
        }
    }

    /// The failure marker used when decoding produced nothing for an item.
    pub fn fallback(original: &str) -> Self {
        let marker = format!("[generation failed: {original}]");
        Self {
            first: marker.clone(),
            second: marker,
            fallback: true,
        }
    }
}
