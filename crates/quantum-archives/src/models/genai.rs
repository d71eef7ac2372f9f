//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Requests are built by the adapters; responses are treated as untrusted and
//! every field is optional.

use serde::{Deserialize, Serialize};

use super::Role;

/// A single part of a content turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set on reasoning parts, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Plain text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), thought: None }
    }
}

/// A conversation turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Author of the turn; absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Parts of the turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Single-text turn by `role`.
    #[must_use]
    pub fn from_text(role: Role, text: impl Into<String>) -> Self {
        Self { role: Some(role), parts: vec![Part::text(text)] }
    }

    /// Role-less content, as used for system instructions.
    #[must_use]
    pub fn instruction(text: impl Into<String>) -> Self {
        Self { role: None, parts: vec![Part::text(text)] }
    }

    /// Concatenated answer text, skipping reasoning parts.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// Google Search grounding tool marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSearch {}

/// Tool declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Enables search grounding when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    /// The search-grounding tool.
    #[must_use]
    pub fn google_search() -> Self {
        Self { google_search: Some(GoogleSearch {}) }
    }
}

/// Sampling and output-format settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Output MIME type, e.g. `application/json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,

    /// OpenAPI-style schema the output must follow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns, oldest first; the last one is the prompt.
    pub contents: Vec<Content>,

    /// System instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Enabled tools.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    /// Generation settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Web page referenced by a grounding chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebChunk {
    /// Page URI.
    #[serde(default)]
    pub uri: Option<String>,

    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
}

/// One grounding chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Web source, when the chunk came from search.
    #[serde(default)]
    pub web: Option<WebChunk>,
}

/// Grounding metadata attached to a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Retrieved chunks, in the order the API returned them.
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,

    /// Search queries the model issued.
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

/// One generated candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<Content>,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Search grounding details.
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates; only the first is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Model that produced the response.
    #[serde(default)]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate, `None` when it is missing or empty.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let text = self.candidates.first()?.content.as_ref()?.joined_text();
        (!text.is_empty()).then_some(text)
    }

    /// Grounding chunks of the first candidate.
    #[must_use]
    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or(&[])
    }
}
