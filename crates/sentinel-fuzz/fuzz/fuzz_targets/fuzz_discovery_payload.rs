#![no_main]

use libfuzzer_sys::fuzz_target;
use quantum_archives::adapters::{parse_papers, strip_code_fences};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Valid JSON never carries a fence, so stripping must leave it alone
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        assert_eq!(strip_code_fences(text), text);
    }

    // Should never panic, only return Ok or Err
    let _ = parse_papers(text);
});
