#![no_main]

use libfuzzer_sys::fuzz_target;
use quantum_archives::models::{Physicist, Tab};
use quantum_archives::server::shell::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else { return };

    for tab in [Tab::Discover, Tab::Collection, Tab::Chat] {
        let _ = Command::parse(line, tab);
    }
    let _ = line.parse::<Physicist>();
});
