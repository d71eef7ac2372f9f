//! Fuzzing library for quantum-archives.
//!
//! This crate provides fuzzing targets for the untrusted payloads the
//! archive consumes: discovery paper lists, raw `generateContent` responses
//! and shell input.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_discovery_payload -- -max_total_time=60
//! ```

pub use quantum_archives::{adapters, models};
