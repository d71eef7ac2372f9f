//! Chat transcript model.

use serde::{Deserialize, Serialize};

/// Id of the message every transcript starts with.
pub const WELCOME_ID: &str = "welcome";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the session.
    User,
    /// The generative model.
    Model,
}

/// A citation found by the search-grounding tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    /// Page title.
    pub title: String,
    /// Page URI.
    pub uri: String,
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique id within the transcript.
    pub id: String,

    /// Author.
    pub role: Role,

    /// Message text; empty for a pending placeholder.
    pub text: String,

    /// Citations, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<GroundingSource>,

    /// Transient placeholder shown while the model is answering.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_thinking: bool,
}

impl ChatMessage {
    /// A message typed by the user.
    #[must_use]
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            sources: Vec::new(),
            is_thinking: false,
        }
    }

    /// A model reply with its citations.
    #[must_use]
    pub fn model(
        id: impl Into<String>,
        text: impl Into<String>,
        sources: Vec<GroundingSource>,
    ) -> Self {
        Self { id: id.into(), role: Role::Model, text: text.into(), sources, is_thinking: false }
    }

    /// The pending-answer placeholder.
    #[must_use]
    pub fn thinking(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Model,
            text: String::new(),
            sources: Vec::new(),
            is_thinking: true,
        }
    }

    /// The greeting, worded for the current collection size.
    #[must_use]
    pub fn welcome(collected: usize) -> Self {
        let text = if collected > 0 {
            format!(
                "I have access to your collection of {collected} papers. Ask me anything about \
                 them, or ask me to search for more details."
            )
        } else {
            "Your collection is empty. Go to the 'Discover' tab to find papers from Heisenberg, \
             Pauli, Schrödinger or Dirac first."
                .to_string()
        };
        Self::model(WELCOME_ID, text, Vec::new())
    }

    /// Whether this is the greeting.
    #[must_use]
    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_ID
    }
}
