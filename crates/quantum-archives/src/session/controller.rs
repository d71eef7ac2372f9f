//! Event-queue driver for a session.
//!
//! A single controller task owns the [`SessionState`]. Front-ends talk to it
//! through a cloneable [`SessionHandle`]; every intent becomes an [`Event`],
//! is applied in queue order, and the resulting snapshot is published on a
//! `watch` channel. Adapter calls run on spawned tasks and report back
//! through the same queue, so no partial update is ever observable.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use super::state::{Event, SessionState};
use crate::adapters::{PaperDiscovery, RagResponder};
use crate::error::SessionError;
use crate::models::{ChatMessage, Paper, Physicist, Tab};

/// Reply used when the chat task itself dies.
pub const CHAT_FAILURE_TEXT: &str = "Sorry, I couldn't process that request.";

/// A user intent, before ids and timestamps are assigned.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Pick a physicist and discover their papers.
    SelectPhysicist(Physicist),
    /// Keep a paper.
    Collect(Paper),
    /// Drop a collected paper by id.
    Remove(String),
    /// Show another view.
    SwitchTab(Tab),
    /// Ask the model something.
    SendMessage(String),
}

enum Input {
    Intent(Intent, oneshot::Sender<Arc<SessionState>>),
    Completed(Event),
}

/// Owns the session and the adapters.
pub struct SessionController {
    discovery: PaperDiscovery,
    rag: RagResponder,
    state: Arc<SessionState>,
    snapshots: watch::Sender<Arc<SessionState>>,
}

impl SessionController {
    /// Controller with a fresh session.
    #[must_use]
    pub fn new(discovery: PaperDiscovery, rag: RagResponder) -> Self {
        let state = Arc::new(SessionState::new());
        let (snapshots, _) = watch::channel(Arc::clone(&state));
        Self { discovery, rag, state, snapshots }
    }

    /// Start the controller task and return a handle to it.
    ///
    /// Must be called inside a Tokio runtime. The task stops once every
    /// handle has been dropped and no adapter call is pending.
    #[must_use]
    pub fn spawn(self) -> SessionHandle {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let weak = queue_tx.downgrade();
        let handle = SessionHandle { queue: queue_tx, snapshots: self.snapshots.subscribe() };
        tokio::spawn(self.run(queue_rx, weak));
        handle
    }

    async fn run(
        mut self,
        mut queue_rx: mpsc::UnboundedReceiver<Input>,
        queue_tx: mpsc::WeakUnboundedSender<Input>,
    ) {
        tracing::debug!("Session controller started");

        while let Some(input) = queue_rx.recv().await {
            match input {
                Input::Intent(intent, ack) => {
                    let event = Self::stamp(intent);
                    let snapshot = self.step(event, &queue_tx);
                    let _ = ack.send(snapshot);
                }
                Input::Completed(event) => {
                    self.step(event, &queue_tx);
                }
            }
        }
        tracing::debug!("Session controller stopped");
    }

    /// Assign ids and timestamps so the transition stays pure.
    fn stamp(intent: Intent) -> Event {
        match intent {
            Intent::SelectPhysicist(physicist) => Event::PhysicistSelected(physicist),
            Intent::Collect(paper) => Event::PaperCollected { paper, at: Utc::now() },
            Intent::Remove(id) => Event::PaperRemoved { id },
            Intent::SwitchTab(tab) => Event::TabSwitched(tab),
            Intent::SendMessage(text) => Event::MessageSent {
                message: ChatMessage::user(new_id("user"), text),
                placeholder: ChatMessage::thinking(new_id("thinking")),
            },
        }
    }

    fn step(
        &mut self,
        event: Event,
        queue: &mpsc::WeakUnboundedSender<Input>,
    ) -> Arc<SessionState> {
        let previous = Arc::clone(&self.state);
        let next = (*previous).clone().apply(event.clone());

        match &event {
            Event::PhysicistSelected(physicist) => {
                self.spawn_discovery(*physicist, next.discovery_seq, queue);
            }
            Event::DiscoveryCompleted { seq, physicist, .. } if next == *previous => {
                tracing::debug!(seq, physicist = %physicist, "Discarding stale discovery result");
            }
            Event::MessageSent { message, placeholder } => {
                if next.messages.last().is_some_and(|m| m.id == placeholder.id) {
                    let history = previous.messages.clone();
                    let papers = next.collected_papers.clone();
                    let text = message.text.clone();
                    self.spawn_chat(history, papers, text, placeholder.id.clone(), queue);
                } else {
                    tracing::debug!("Ignoring chat message while a reply is pending");
                }
            }
            _ => {}
        }

        self.state = Arc::new(next);
        self.snapshots.send_replace(Arc::clone(&self.state));
        Arc::clone(&self.state)
    }

    fn spawn_discovery(
        &self,
        physicist: Physicist,
        seq: u64,
        queue: &mpsc::WeakUnboundedSender<Input>,
    ) {
        let Some(queue) = queue.upgrade() else { return };
        let discovery = self.discovery.clone();

        tokio::spawn(async move {
            tracing::info!(physicist = %physicist, seq, "Fetching papers");
            let papers = discovery
                .discover(physicist)
                .await
                .into_iter()
                .map(|draft| draft.into_paper(new_id(&format!("{physicist:?}")), physicist))
                .collect();
            let _ = queue.send(Input::Completed(Event::DiscoveryCompleted {
                seq,
                physicist,
                papers,
            }));
        });
    }

    fn spawn_chat(
        &self,
        history: Vec<ChatMessage>,
        papers: Vec<Paper>,
        text: String,
        placeholder_id: String,
        queue: &mpsc::WeakUnboundedSender<Input>,
    ) {
        let Some(queue) = queue.upgrade() else { return };
        let rag = self.rag.clone();

        tokio::spawn(async move {
            let answer =
                tokio::spawn(async move { rag.answer(&history, &papers, &text).await }).await;

            let message = match answer {
                Ok(answer) => ChatMessage::model(new_id("model"), answer.text, answer.sources),
                Err(e) => {
                    tracing::error!(error = %e, "Chat task failed");
                    ChatMessage::model(new_id("error"), CHAT_FAILURE_TEXT, Vec::new())
                }
            };
            let _ = queue
                .send(Input::Completed(Event::ResponseReceived { placeholder_id, message }));
        });
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController").field("state", &self.state).finish()
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix.to_lowercase(), Uuid::new_v4())
}

/// Cloneable front-end handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    queue: mpsc::UnboundedSender<Input>,
    snapshots: watch::Receiver<Arc<SessionState>>,
}

impl SessionHandle {
    /// Submit an intent and return the snapshot right after it was applied.
    pub async fn dispatch(&self, intent: Intent) -> Result<Arc<SessionState>, SessionError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.queue
            .send(Input::Intent(intent, ack_tx))
            .map_err(|_| SessionError::Closed)?;
        ack_rx.await.map_err(|_| SessionError::Closed)
    }

    /// Select a physicist; discovery continues in the background.
    pub async fn select_physicist(
        &self,
        physicist: Physicist,
    ) -> Result<Arc<SessionState>, SessionError> {
        self.dispatch(Intent::SelectPhysicist(physicist)).await
    }

    /// Collect a paper; already-collected titles are ignored.
    pub async fn collect(&self, paper: Paper) -> Result<Arc<SessionState>, SessionError> {
        self.dispatch(Intent::Collect(paper)).await
    }

    /// Collect a discovered paper by id.
    pub async fn collect_by_id(&self, id: &str) -> Result<Arc<SessionState>, SessionError> {
        let paper = self
            .snapshot()
            .discovered(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownPaper(id.to_string()))?;
        self.collect(paper).await
    }

    /// Remove a collected paper; unknown ids are ignored.
    pub async fn remove(&self, id: &str) -> Result<Arc<SessionState>, SessionError> {
        self.dispatch(Intent::Remove(id.to_string())).await
    }

    /// Switch the visible view.
    pub async fn switch_tab(&self, tab: Tab) -> Result<Arc<SessionState>, SessionError> {
        self.dispatch(Intent::SwitchTab(tab)).await
    }

    /// Send a chat message; the answer arrives in a later snapshot.
    pub async fn send_message(
        &self,
        text: impl Into<String>,
    ) -> Result<Arc<SessionState>, SessionError> {
        self.dispatch(Intent::SendMessage(text.into())).await
    }

    /// Latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SessionState> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Receiver notified on every new snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.snapshots.clone()
    }

    /// Wait until no discovery or chat request is in flight.
    pub async fn settled(&self) -> Result<Arc<SessionState>, SessionError> {
        let mut rx = self.snapshots.clone();
        let state = rx.wait_for(|s| s.is_settled()).await.map_err(|_| SessionError::Closed)?;
        Ok(Arc::clone(&state))
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").field("snapshot", &self.snapshot()).finish()
    }
}
