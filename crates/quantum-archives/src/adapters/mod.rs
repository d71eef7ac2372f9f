//! Adapters between the session and the generative API.
//!
//! Each adapter:
//! 1. Builds a request from session data
//! 2. Calls a [`GenerativeModel`](crate::client::GenerativeModel)
//! 3. Normalizes the reply into UI-ready values, degrading instead of failing

pub mod discovery;
pub mod rag;

pub use discovery::{PaperDiscovery, parse_papers, strip_code_fences};
pub use rag::{RagAnswer, RagResponder, extract_sources};
