//! SPED ledger reading: encoding detection, period header, record layouts
//! and grouping of detail lines under their document headers.
//!
//! Block C (`C100`/`C170`) carries NF-e, block D (`D100`/`D190`) carries CT-e.

mod encoding;
mod grouper;
mod header;
mod record;

pub use encoding::{decode_text, detect_encoding, fallback_encoding};
pub use grouper::LedgerGrouper;
pub use header::{OPENING_RECORD, extract_period};
pub use record::{DetailRecord, HeaderRecord, ledger_lines, record_tag, split_record};
