#![no_main]

use libfuzzer_sys::fuzz_target;
use sped_auditor::xml::{CteParser, DocumentParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = CteParser.parse(s);
    }
});
