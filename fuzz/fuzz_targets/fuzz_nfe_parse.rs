#![no_main]

use libfuzzer_sys::fuzz_target;
use sped_auditor::xml::{DocumentParser, NfeParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic. Rejected documents are fine.
        let _ = NfeParser.parse(s);
    }
});
