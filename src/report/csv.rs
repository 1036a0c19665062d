//! CSV rendering of a report.
//!
//! Semicolon separated with a header row, text quoted, amounts with a
//! decimal comma and two places, CRLF line endings.

use rust_decimal::Decimal;

use super::table::{Cell, ReportTable, WARNINGS_SHEET};
use crate::core::format_ledger_amount;

impl ReportTable {
    /// Results sheet as CSV.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_header(&mut out, self.columns.iter().copied());
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                match cell {
                    Cell::Text(s) => csv_field_str(&mut out, s),
                    Cell::Number(d) => csv_field_decimal(&mut out, *d),
                    Cell::Empty => {}
                }
            }
            out.push_str("\r\n");
        }
        out
    }

    /// Warnings sheet as CSV, one message per row.
    pub fn warnings_csv(&self) -> String {
        let mut out = String::new();
        write_header(&mut out, [WARNINGS_SHEET]);
        for warning in &self.warnings {
            csv_field_str(&mut out, warning);
            out.push_str("\r\n");
        }
        out
    }
}

fn write_header<'a>(out: &mut String, columns: impl IntoIterator<Item = &'a str>) {
    for (i, column) in columns.into_iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        csv_field_str(out, column);
    }
    out.push_str("\r\n");
}

fn csv_field_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

fn csv_field_decimal(out: &mut String, d: Decimal) {
    out.push_str(&format_ledger_amount(d));
}
