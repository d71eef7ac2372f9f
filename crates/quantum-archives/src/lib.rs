//! Quantum Archives
//!
//! Discover papers by Werner Heisenberg, Wolfgang Pauli, Erwin Schrödinger and
//! Paul Dirac through a generative model, collect them into a personal
//! library, and chat about that library with answers grounded in web search.
//!
//! # Features
//!
//! - **Paper discovery**: schema-constrained generation, validated locally
//! - **Grounded chat**: collection-aware system instruction plus Google Search
//! - **Event-driven session**: immutable snapshots behind an event queue
//! - **Two front-ends**: terminal shell and JSON/SSE HTTP API
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quantum_archives::{
//!     Config, GeminiClient, GenerativeModel, PaperDiscovery, RagResponder, SessionController,
//!     models::Physicist,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config)?);
//!
//!     let session = SessionController::new(
//!         PaperDiscovery::new(Arc::clone(&model)),
//!         RagResponder::new(model),
//!     )
//!     .spawn();
//!
//!     session.select_physicist(Physicist::Dirac).await?;
//!     let state = session.settled().await?;
//!     println!("{} papers discovered", state.discovered_papers.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod server;
pub mod session;

pub use adapters::{PaperDiscovery, RagAnswer, RagResponder};
pub use client::{GeminiClient, GenerativeModel};
pub use config::Config;
pub use error::{AdapterError, ClientError, PayloadError, SessionError};
pub use session::{SessionController, SessionHandle, SessionState};
