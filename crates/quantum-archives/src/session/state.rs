//! Session snapshot and its transition function.
//!
//! `SessionState::apply` is pure: ids and timestamps arrive inside the
//! events, so the same event sequence always yields the same state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ChatMessage, Paper, Physicist, Tab};

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User picked a physicist; a discovery request follows.
    PhysicistSelected(Physicist),

    /// A discovery request finished.
    DiscoveryCompleted {
        /// Sequence number the request was tagged with.
        seq: u64,
        /// Physicist the request was for.
        physicist: Physicist,
        /// Tagged papers.
        papers: Vec<Paper>,
    },

    /// User collected a paper.
    PaperCollected {
        /// The paper to collect.
        paper: Paper,
        /// Collection timestamp.
        at: DateTime<Utc>,
    },

    /// User removed a paper from the collection.
    PaperRemoved {
        /// Id of the collected paper.
        id: String,
    },

    /// User switched views.
    TabSwitched(Tab),

    /// User sent a chat message.
    MessageSent {
        /// The user's message.
        message: ChatMessage,
        /// Placeholder shown until the answer arrives.
        placeholder: ChatMessage,
    },

    /// The model answered.
    ResponseReceived {
        /// Id of the placeholder to replace.
        placeholder_id: String,
        /// The answer.
        message: ChatMessage,
    },
}

/// Everything a front-end renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Currently selected physicist.
    pub selected_physicist: Option<Physicist>,

    /// Papers from the latest discovery, replaced on each selection.
    pub discovered_papers: Vec<Paper>,

    /// Papers the user kept, unique by title.
    pub collected_papers: Vec<Paper>,

    /// Visible view.
    pub active_tab: Tab,

    /// Chat transcript.
    pub messages: Vec<ChatMessage>,

    /// A discovery request is in flight.
    pub is_fetching: bool,

    /// A chat request is in flight.
    pub is_loading: bool,

    /// Tag of the latest discovery request.
    pub discovery_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Fresh session with the welcome message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected_physicist: None,
            discovered_papers: Vec::new(),
            collected_papers: Vec::new(),
            active_tab: Tab::default(),
            messages: vec![ChatMessage::welcome(0)],
            is_fetching: false,
            is_loading: false,
            discovery_seq: 0,
        }
    }

    /// Whether a paper with the same title is already collected.
    #[must_use]
    pub fn is_collected(&self, paper: &Paper) -> bool {
        self.collected_papers.iter().any(|p| p.same_title(paper))
    }

    /// Discovered paper by id.
    #[must_use]
    pub fn discovered(&self, id: &str) -> Option<&Paper> {
        self.discovered_papers.iter().find(|p| p.id == id)
    }

    /// Collected paper by id.
    #[must_use]
    pub fn collected(&self, id: &str) -> Option<&Paper> {
        self.collected_papers.iter().find(|p| p.id == id)
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.is_fetching && !self.is_loading
    }

    /// Whether `message` would be accepted right now.
    #[must_use]
    pub fn accepts_message(&self, text: &str) -> bool {
        !self.is_loading && !text.trim().is_empty()
    }

    /// Apply one event.
    #[must_use]
    pub fn apply(mut self, event: Event) -> Self {
        match event {
            Event::PhysicistSelected(physicist) => {
                self.selected_physicist = Some(physicist);
                self.discovered_papers.clear();
                self.is_fetching = true;
                self.discovery_seq += 1;
            }
            Event::DiscoveryCompleted { seq, physicist, papers } => {
                if seq == self.discovery_seq && self.selected_physicist == Some(physicist) {
                    self.discovered_papers = papers;
                    self.is_fetching = false;
                }
            }
            Event::PaperCollected { paper, at } => {
                if !self.is_collected(&paper) {
                    self.collected_papers.push(paper.collected(at));
                }
            }
            Event::PaperRemoved { id } => {
                self.collected_papers.retain(|p| p.id != id);
            }
            Event::TabSwitched(tab) => {
                self.active_tab = tab;
                if tab == Tab::Chat && self.messages.iter().all(ChatMessage::is_welcome) {
                    self.messages = vec![ChatMessage::welcome(self.collected_papers.len())];
                }
            }
            Event::MessageSent { message, placeholder } => {
                if self.accepts_message(&message.text) {
                    self.messages.push(message);
                    self.messages.push(placeholder);
                    self.is_loading = true;
                }
            }
            Event::ResponseReceived { placeholder_id, message } => {
                let before = self.messages.len();
                self.messages.retain(|m| !(m.is_thinking && m.id == placeholder_id));
                if self.messages.len() < before {
                    self.messages.push(message);
                    self.is_loading = false;
                }
            }
        }
        self
    }
}
