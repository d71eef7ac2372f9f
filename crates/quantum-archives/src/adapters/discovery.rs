//! Paper discovery: asks the model for a physicist's most significant works.
//!
//! The request uses structured generation (a JSON-array response schema) and
//! the reply is validated field by field. Any failure degrades to an empty
//! list; callers never see an error from [`PaperDiscovery::discover`].

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::client::GenerativeModel;
use crate::config::generation;
use crate::error::{AdapterError, AdapterResult, PayloadError};
use crate::models::genai::{Content, GenerateContentRequest, GenerationConfig};
use crate::models::{PaperDraft, Physicist, Role};

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```(?i:json)?[ \t]*\r?\n?").expect("valid regex"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```\s*$").expect("valid regex"));

/// Strip a leading and a trailing markdown code fence, if present.
///
/// Only one layer is removed. Text without fences, including any valid JSON,
/// is returned unchanged.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let start = OPENING_FENCE.find(text).map_or(0, |m| m.end());
    let rest = &text[start..];
    let end = CLOSING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    &rest[..end]
}

/// Response schema for the paper list.
#[must_use]
pub fn paper_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "The original title of the paper or publication."
                },
                "year": {
                    "type": "INTEGER",
                    "description": "The year of publication."
                },
                "description": {
                    "type": "STRING",
                    "description": "A brief 1-sentence summary of the paper's significance."
                }
            },
            "required": ["title", "year", "description"]
        }
    })
}

/// Prompt asking for `count` works by `physicist`.
#[must_use]
pub fn discovery_prompt(physicist: Physicist, count: usize) -> String {
    format!(
        "List {count} of the most significant scientific papers or books by {}. \
         Focus on their quantum mechanics contributions.",
        physicist.full_name()
    )
}

/// Parse and validate a raw discovery payload.
///
/// The payload may be wrapped in code fences. Every element must carry a
/// string `title`, an integer `year` and a string `description`; a single bad
/// element rejects the whole payload.
pub fn parse_papers(raw: &str) -> Result<Vec<PaperDraft>, PayloadError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(PayloadError::NotAnArray { found: json_type(&other) }),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = item.as_object().ok_or(PayloadError::NotAnObject { index })?;
            Ok(PaperDraft {
                title: string_field(obj, index, "title")?,
                year: year_field(obj, index)?,
                description: string_field(obj, index, "description")?,
            })
        })
        .collect()
}

fn string_field(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<String, PayloadError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(PayloadError::MissingField { index, field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(PayloadError::WrongType { index, field, expected: "a string" }),
    }
}

fn year_field(obj: &Map<String, Value>, index: usize) -> Result<i32, PayloadError> {
    const FIELD: &str = "year";
    match obj.get(FIELD) {
        None | Some(Value::Null) => Err(PayloadError::MissingField { index, field: FIELD }),
        Some(v) => v
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or(PayloadError::WrongType { index, field: FIELD, expected: "an integer" }),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Discovery adapter.
#[derive(Clone)]
pub struct PaperDiscovery {
    model: Arc<dyn GenerativeModel>,
    paper_count: usize,
    temperature: f32,
}

impl PaperDiscovery {
    /// Adapter with the default paper count and temperature.
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            paper_count: generation::PAPERS_PER_PHYSICIST,
            temperature: generation::DISCOVERY_TEMPERATURE,
        }
    }

    /// Override the number of papers requested.
    #[must_use]
    pub const fn with_paper_count(mut self, count: usize) -> Self {
        self.paper_count = count;
        self
    }

    /// Override the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The structured-generation request for `physicist`.
    #[must_use]
    pub fn build_request(&self, physicist: Physicist) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::from_text(
                Role::User,
                discovery_prompt(physicist, self.paper_count),
            )],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(paper_schema()),
                temperature: Some(self.temperature),
            }),
        }
    }

    /// Fetch papers for `physicist`, returning an empty list on any failure.
    pub async fn discover(&self, physicist: Physicist) -> Vec<PaperDraft> {
        match self.try_discover(physicist).await {
            Ok(papers) => {
                tracing::info!(physicist = %physicist, count = papers.len(), "Discovered papers");
                papers
            }
            Err(e) => {
                tracing::error!(physicist = %physicist, error = %e, "Error fetching papers");
                Vec::new()
            }
        }
    }

    /// Fetch papers for `physicist`, surfacing the failure cause.
    pub async fn try_discover(&self, physicist: Physicist) -> AdapterResult<Vec<PaperDraft>> {
        let request = self.build_request(physicist);
        let response = self.model.generate_content(&request).await?;
        let text = response.text().ok_or(AdapterError::EmptyResponse)?;
        Ok(parse_papers(&text)?)
    }
}

impl std::fmt::Debug for PaperDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperDiscovery")
            .field("paper_count", &self.paper_count)
            .field("temperature", &self.temperature)
            .finish()
    }
}
