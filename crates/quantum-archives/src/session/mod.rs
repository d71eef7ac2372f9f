//! In-memory session: selected physicist, discovered and collected papers,
//! and the chat transcript.

mod controller;
mod state;

pub use controller::{CHAT_FAILURE_TEXT, Intent, SessionController, SessionHandle};
pub use state::{Event, SessionState};
