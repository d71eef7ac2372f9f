#![no_main]

use libfuzzer_sys::fuzz_target;
use quantum_archives::adapters::extract_sources;
use quantum_archives::models::genai::GenerateContentResponse;

fuzz_target!(|data: &[u8]| {
    if let Ok(response) = serde_json::from_slice::<GenerateContentResponse>(data) {
        let _ = response.text();
        for source in extract_sources(&response) {
            assert!(!source.title.is_empty() && !source.uri.is_empty());
        }
    }
});
