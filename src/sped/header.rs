use chrono::NaiveDate;

use super::record::ledger_lines;
use crate::core::Period;

/// Prefix of the opening record (registro 0000) of every SPED file.
pub const OPENING_RECORD: &str = "|0000|";

/// Index of DT_INI in the opening record.
const START_DATE_FIELD: usize = 4;

/// Find the accounting period in the first `scan_lines` lines.
///
/// Returns `None` when no `|0000|` record with a valid `DDMMYYYY` start date
/// is found within the bound.
pub fn extract_period(text: &str, scan_lines: usize) -> Option<Period> {
    ledger_lines(text)
        .take(scan_lines)
        .map(str::trim)
        .filter(|line| line.starts_with(OPENING_RECORD))
        .find_map(|line| {
            line.split('|')
                .nth(START_DATE_FIELD)
                .and_then(parse_start_date)
        })
}

/// Parse `DT_INI`. Besides being eight digits it must be a real calendar
/// date, so `31022024` is rejected like any other malformed value.
fn parse_start_date(field: &str) -> Option<Period> {
    if field.len() != 8 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(field, "%d%m%Y")
        .ok()
        .map(Period::from_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENING: &str = "|0000|017|0|01032024|31032024|EMPRESA LTDA|12345678000195||SP|\n";

    #[test]
    fn period_from_opening_record() {
        let text = format!("{OPENING}|0001|0|\n");
        assert_eq!(
            extract_period(&text, 20),
            Some(Period {
                month: 3,
                year: 2024
            })
        );
    }

    #[test]
    fn period_beyond_scan_bound() {
        let mut text = "|0001|0|\n".repeat(20);
        text.push_str(OPENING);
        assert_eq!(extract_period(&text, 20), None);
        assert!(extract_period(&text, 21).is_some());
    }

    #[test]
    fn malformed_start_date() {
        assert_eq!(extract_period("|0000|017|0|2024-03|31032024|\n", 20), None);
        assert_eq!(extract_period("|0000|017|0|32132024|31032024|\n", 20), None);
        assert_eq!(extract_period("|0000|017|0|31022024|31032024|\n", 20), None);
        assert_eq!(extract_period("|0000|017|0|\n", 20), None);
    }

    #[test]
    fn later_valid_record_is_used() {
        let text = format!("|0000|017|0|bad|\n{OPENING}");
        assert!(extract_period(&text, 20).is_some());
    }

    #[test]
    fn crlf_lines() {
        let text = OPENING.replace('\n', "\r\n");
        assert!(extract_period(&text, 20).is_some());
    }

    #[test]
    fn cr_only_lines() {
        let text = format!("|0001|0|\r{}", OPENING.replace('\n', "\r"));
        assert!(extract_period(&text, 2).is_some());
        assert_eq!(extract_period(&text, 1), None);
    }
}
