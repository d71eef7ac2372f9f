//! Output formatters for the terminal front-end.

mod markdown;

pub use markdown::*;
