//! Chat over the collected papers, grounded with Google Search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::GenerativeModel;
use crate::config::generation;
use crate::error::AdapterResult;
use crate::models::genai::{Content, GenerateContentRequest, GenerateContentResponse, Tool};
use crate::models::{ChatMessage, GroundingSource, Paper, Role};

/// Reply used when the model returns no text.
pub const NO_RESPONSE_TEXT: &str = "I couldn't generate a response.";

/// Reply used when the request fails.
pub const ARCHIVE_ERROR_TEXT: &str =
    "I encountered an error accessing the Quantum Archives. Please check your connection or API key.";

/// A normalized chat answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagAnswer {
    /// Answer text, never empty.
    pub text: String,
    /// Citations in the order the API returned them.
    pub sources: Vec<GroundingSource>,
}

impl RagAnswer {
    /// The answer returned when anything goes wrong.
    #[must_use]
    pub fn archive_error() -> Self {
        Self { text: ARCHIVE_ERROR_TEXT.to_string(), sources: Vec::new() }
    }
}

/// System instruction embedding the collection.
#[must_use]
pub fn system_instruction(papers: &[Paper]) -> String {
    let library = papers.iter().map(Paper::context_line).collect::<Vec<_>>().join("\n");

    format!(
        "You are a specialized Quantum Physics Research Assistant.
You have access to a specific collection of papers in the user's library:
{library}

When answering:
1. Prioritize information from the papers in the user's library.
2. Use the Google Search tool to find specific citations, PDF links, or details about equations/content within these papers if asked.
3. If the user asks about a paper NOT in the library, mention that it's not currently collected but answer generally.
4. Provide clear, academic, yet accessible explanations."
    )
}

/// The last `window` real messages of `history`, as API turns.
///
/// Thinking placeholders are never forwarded.
#[must_use]
pub fn recent_history(history: &[ChatMessage], window: usize) -> Vec<Content> {
    let real: Vec<&ChatMessage> = history.iter().filter(|m| !m.is_thinking).collect();
    let skip = real.len().saturating_sub(window);
    real.into_iter().skip(skip).map(|m| Content::from_text(m.role, m.text.clone())).collect()
}

/// Citations from the first candidate; chunks lacking a URI or a title are dropped.
#[must_use]
pub fn extract_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
    response
        .grounding_chunks()
        .iter()
        .filter_map(|chunk| {
            let web = chunk.web.as_ref()?;
            match (web.uri.as_deref(), web.title.as_deref()) {
                (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                    Some(GroundingSource { title: title.to_string(), uri: uri.to_string() })
                }
                _ => None,
            }
        })
        .collect()
}

/// Chat adapter.
#[derive(Clone)]
pub struct RagResponder {
    model: Arc<dyn GenerativeModel>,
    history_window: usize,
}

impl RagResponder {
    /// Adapter with the default history window.
    #[must_use]
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model, history_window: generation::HISTORY_WINDOW }
    }

    /// Override how many prior messages are forwarded.
    #[must_use]
    pub const fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// The conversational request: instruction, truncated history, search tool, new turn.
    #[must_use]
    pub fn build_request(
        &self,
        history: &[ChatMessage],
        papers: &[Paper],
        message: &str,
    ) -> GenerateContentRequest {
        let mut contents = recent_history(history, self.history_window);
        contents.push(Content::from_text(Role::User, message));

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::instruction(system_instruction(papers))),
            tools: vec![Tool::google_search()],
            generation_config: None,
        }
    }

    /// Answer `message`; failures become [`RagAnswer::archive_error`].
    pub async fn answer(
        &self,
        history: &[ChatMessage],
        papers: &[Paper],
        message: &str,
    ) -> RagAnswer {
        match self.try_answer(history, papers, message).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "Error in RAG chat");
                RagAnswer::archive_error()
            }
        }
    }

    /// Answer `message`, surfacing transport and API failures.
    pub async fn try_answer(
        &self,
        history: &[ChatMessage],
        papers: &[Paper],
        message: &str,
    ) -> AdapterResult<RagAnswer> {
        let request = self.build_request(history, papers, message);
        tracing::debug!(
            history = request.contents.len() - 1,
            papers = papers.len(),
            "Sending grounded chat request"
        );

        let response = self.model.generate_content(&request).await?;
        let sources = extract_sources(&response);
        let text = response.text().unwrap_or_else(|| NO_RESPONSE_TEXT.to_string());

        tracing::info!(sources = sources.len(), "Received chat answer");
        Ok(RagAnswer { text, sources })
    }
}

impl std::fmt::Debug for RagResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagResponder").field("history_window", &self.history_window).finish()
    }
}
