//! Data models for the session and the generative API.
//!
//! Session models serialize with `camelCase` names so front-ends can consume
//! snapshots directly; API models mirror the Gemini REST schema.

mod chat;
mod enums;
pub mod genai;
mod paper;

pub use chat::{ChatMessage, GroundingSource, Role, WELCOME_ID};
pub use enums::{Physicist, Tab};
pub use paper::{Paper, PaperDraft};
