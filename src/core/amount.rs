use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::AuditError;

/// Parse a ledger amount written with a decimal comma (`"1234,56"`).
///
/// Empty fields are zero.
pub fn parse_ledger_amount(text: &str) -> Result<Decimal, AuditError> {
    parse_amount(&text.trim().replace(',', "."))
}

/// Parse an XML amount (`"1234.56"`). Empty text is zero.
pub fn parse_xml_amount(text: &str) -> Result<Decimal, AuditError> {
    parse_amount(text.trim())
}

fn parse_amount(s: &str) -> Result<Decimal, AuditError> {
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| AuditError::Amount {
            value: s.to_string(),
        })
}

/// Format an amount the way the ledger writes it: decimal comma, two places.
pub fn format_ledger_amount(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2)).replace('.', ",")
}
