//! Fixed-position extraction of the ledger records used by the audit.
//!
//! Lines are split on `|`. Because every record starts with the separator,
//! field 0 is always empty and field 1 is the record tag.

use crate::core::{AuditError, DeclaredValues, DocumentKind, parse_ledger_amount};

/// Lines of a ledger text. `\n`, `\r\n` and a bare `\r` all end a line.
pub fn ledger_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| line.split('\r'))
}

/// Split a ledger line into its fields.
pub fn split_record(line: &str) -> Vec<&str> {
    line.trim().split('|').collect()
}

/// Record tag of a split line (`C100`, `D190`, ...), if any.
pub fn record_tag<'a>(fields: &[&'a str]) -> Option<&'a str> {
    fields.get(1).copied()
}

/// Field positions of a header record.
struct HeaderLayout {
    series: usize,
    number: usize,
    key: usize,
    emission_date: usize,
    total: usize,
    icms_base: usize,
    icms: usize,
    ipi: Option<usize>,
}

impl HeaderLayout {
    fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            // C100: SER 7, NUM_DOC 8, CHV_NFE 9, DT_DOC 10, VL_DOC 12,
            // VL_BC_ICMS 21, VL_ICMS 22, VL_IPI 25
            DocumentKind::Nfe => Self {
                series: 7,
                number: 8,
                key: 9,
                emission_date: 10,
                total: 12,
                icms_base: 21,
                icms: 22,
                ipi: Some(25),
            },
            // D100: SER 7, NUM_DOC 9, CHV_CTE 10, DT_DOC 11, VL_DOC 13,
            // VL_BC_ICMS 19, VL_ICMS 20
            DocumentKind::Cte => Self {
                series: 7,
                number: 9,
                key: 10,
                emission_date: 11,
                total: 13,
                icms_base: 19,
                icms: 20,
                ipi: None,
            },
        }
    }

    fn required_fields(&self) -> usize {
        let last = [
            self.series,
            self.number,
            self.key,
            self.emission_date,
            self.total,
            self.icms_base,
            self.icms,
            self.ipi.unwrap_or(0),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        last + 1
    }
}

/// A C100 or D100 record. Amounts stay as ledger text until the entity is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub kind: DocumentKind,
    pub series: String,
    pub number: String,
    pub key: String,
    pub emission_date: String,
    pub total: String,
    pub icms_base: String,
    pub icms: String,
    /// Only present on invoices.
    pub ipi: Option<String>,
}

impl HeaderRecord {
    /// Minimum number of split fields a header of this kind must have.
    pub fn required_fields(kind: DocumentKind) -> usize {
        HeaderLayout::for_kind(kind).required_fields()
    }

    /// Extract a header from split fields, validating the field count once.
    pub fn parse(kind: DocumentKind, fields: &[&str]) -> Result<Self, AuditError> {
        let layout = HeaderLayout::for_kind(kind);
        let required = layout.required_fields();
        if fields.len() < required {
            return Err(AuditError::ShortRecord {
                tag: kind.header_tag(),
                found: fields.len(),
                required,
            });
        }
        let text = |i: usize| fields[i].trim().to_string();
        Ok(Self {
            kind,
            series: text(layout.series),
            number: text(layout.number),
            key: text(layout.key),
            emission_date: text(layout.emission_date),
            total: text(layout.total),
            icms_base: text(layout.icms_base),
            icms: text(layout.icms),
            ipi: layout.ipi.map(text),
        })
    }

    /// Convert the amount fields.
    ///
    /// ICMS and IPI, and the transport ICMS base, take part in the audit and
    /// must parse. The document total and invoice ICMS base are informative
    /// only and fall back to zero.
    pub fn declared_values(&self) -> Result<DeclaredValues, AuditError> {
        let lenient = |s: &str| parse_ledger_amount(s).unwrap_or_default();
        match self.kind {
            DocumentKind::Nfe => Ok(DeclaredValues::Invoice {
                total: lenient(&self.total),
                icms_base: lenient(&self.icms_base),
                icms: parse_ledger_amount(&self.icms)?,
                ipi: parse_ledger_amount(self.ipi.as_deref().unwrap_or(""))?,
            }),
            DocumentKind::Cte => Ok(DeclaredValues::Transport {
                total: lenient(&self.total),
                icms_base: parse_ledger_amount(&self.icms_base)?,
                icms: parse_ledger_amount(&self.icms)?,
            }),
        }
    }
}

/// Codes contributed by a C170 or D190 detail line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    pub cfop: Option<String>,
    /// ICMS rate (ALIQ_ICMS), D190 only.
    pub icms_rate: Option<String>,
}

impl DetailRecord {
    /// Extract the codes of a detail line. Lines too short to carry them yield `None`.
    pub fn parse(kind: DocumentKind, fields: &[&str]) -> Option<Self> {
        let non_empty = |i: usize| {
            let s = fields[i].trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match kind {
            // C170: CFOP 11
            DocumentKind::Nfe if fields.len() > 11 => Some(Self {
                cfop: non_empty(11),
                icms_rate: None,
            }),
            // D190: CFOP 3, ALIQ_ICMS 4
            DocumentKind::Cte if fields.len() > 4 => Some(Self {
                cfop: non_empty(3),
                icms_rate: non_empty(4),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings() {
        let lines: Vec<&str> = ledger_lines("|A|\r\n|B|\r|C|\n|D|").collect();
        assert_eq!(lines, ["|A|", "|B|", "|C|", "|D|"]);
    }
    use rust_decimal_macros::dec;

    const C100: &str = "|C100|0|1|FORN01|55|00|1|1234|35240312345678000195550010000012341000012345|15032024|16032024|1500,00|0|0,00|0,00|1500,00|9|0,00|0,00|0,00|1500,00|180,00|0,00|0,00|75,00|0,00|0,00|0,00|0,00|";
    const D100: &str = "|D100|0|1|TRANSP01|57|00|1||987|35240398765432000110570010000009871000098765|10032024|10032024|800,00|0|0|800,00|0|0|800,00|96,00|0,00|||";

    #[test]
    fn required_field_counts() {
        assert_eq!(HeaderRecord::required_fields(DocumentKind::Nfe), 26);
        assert_eq!(HeaderRecord::required_fields(DocumentKind::Cte), 21);
    }

    #[test]
    fn c100_fields() {
        let fields = split_record(C100);
        assert_eq!(record_tag(&fields), Some("C100"));
        let h = HeaderRecord::parse(DocumentKind::Nfe, &fields).unwrap();
        assert_eq!(h.series, "1");
        assert_eq!(h.number, "1234");
        assert_eq!(h.key, "35240312345678000195550010000012341000012345");
        assert_eq!(h.emission_date, "15032024");
        assert_eq!(
            h.declared_values().unwrap(),
            DeclaredValues::Invoice {
                total: dec!(1500.00),
                icms_base: dec!(1500.00),
                icms: dec!(180.00),
                ipi: dec!(75.00),
            }
        );
    }

    #[test]
    fn d100_fields() {
        let fields = split_record(D100);
        let h = HeaderRecord::parse(DocumentKind::Cte, &fields).unwrap();
        assert_eq!(h.number, "987");
        assert_eq!(h.key, "35240398765432000110570010000009871000098765");
        assert_eq!(h.ipi, None);
        assert_eq!(
            h.declared_values().unwrap(),
            DeclaredValues::Transport {
                total: dec!(800.00),
                icms_base: dec!(800.00),
                icms: dec!(96.00),
            }
        );
    }

    #[test]
    fn short_header_is_rejected() {
        let fields = split_record("|C100|0|1|");
        let err = HeaderRecord::parse(DocumentKind::Nfe, &fields).unwrap_err();
        assert!(matches!(
            err,
            AuditError::ShortRecord {
                tag: "C100",
                found: 5,
                required: 26
            }
        ));
    }

    #[test]
    fn informative_amounts_are_lenient() {
        let fields = split_record(C100);
        let mut h = HeaderRecord::parse(DocumentKind::Nfe, &fields).unwrap();
        h.total = "n/d".into();
        assert_eq!(h.declared_values().unwrap().total(), dec!(0));
        h.icms = "1.234,00".into();
        assert!(h.declared_values().is_err());
    }

    #[test]
    fn detail_codes() {
        let c170 = split_record("|C170|1|PROD1|Parafuso|10|UN|100,00|0|0|000|1102|");
        let d = DetailRecord::parse(DocumentKind::Nfe, &c170).unwrap();
        assert_eq!(d.cfop.as_deref(), Some("1102"));
        assert_eq!(d.icms_rate, None);

        let d190 = split_record("|D190|000|1353|12,00|800,00|800,00|96,00|0|");
        let d = DetailRecord::parse(DocumentKind::Cte, &d190).unwrap();
        assert_eq!(d.cfop.as_deref(), Some("1353"));
        assert_eq!(d.icms_rate.as_deref(), Some("12,00"));

        let blank = split_record("|D190|000||  |");
        let d = DetailRecord::parse(DocumentKind::Cte, &blank).unwrap();
        assert_eq!(d, DetailRecord::default());

        assert_eq!(DetailRecord::parse(DocumentKind::Nfe, &split_record("|C170|1|")), None);
    }
}
