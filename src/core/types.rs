use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AuditError;

/// Placeholder for identity fields that could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// The two fiscal document types reconciled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// NF-e, the electronic goods invoice (ledger block C).
    Nfe,
    /// CT-e, the electronic transport document (ledger block D).
    Cte,
}

impl DocumentKind {
    /// Ledger record tag opening one document.
    pub fn header_tag(&self) -> &'static str {
        match self {
            Self::Nfe => "C100",
            Self::Cte => "D100",
        }
    }

    /// Ledger record tag of the detail lines grouped under a header.
    pub fn detail_tag(&self) -> &'static str {
        match self {
            Self::Nfe => "C170",
            Self::Cte => "D190",
        }
    }

    /// XML namespace of the document schema.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Nfe => "http://www.portalfiscal.inf.br/nfe",
            Self::Cte => "http://www.portalfiscal.inf.br/cte",
        }
    }

    /// Element carrying the `Id` attribute with the document key.
    pub fn info_element(&self) -> &'static str {
        match self {
            Self::Nfe => "infNFe",
            Self::Cte => "infCte",
        }
    }

    /// Three-character prefix of the `Id` attribute.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Nfe => "NFe",
            Self::Cte => "CTe",
        }
    }

    /// Human label, also used as the result sheet name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nfe => "NF-e",
            Self::Cte => "CT-e",
        }
    }

    /// Suggested file name for the spreadsheet download.
    pub fn report_file_name(&self) -> &'static str {
        match self {
            Self::Nfe => "auditoria_sped_xml_nfe.xlsx",
            Self::Cte => "auditoria_sped_xml_cte.xlsx",
        }
    }

    /// Tax fields compared against the XML, in reason-priority order.
    pub fn compared_fields(&self) -> &'static [TaxField] {
        match self {
            Self::Nfe => &[TaxField::Icms, TaxField::Ipi],
            Self::Cte => &[TaxField::Icms, TaxField::IcmsBase],
        }
    }
}

/// Accounting period (competência) of a ledger file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

/// Period tag attached to every entity read from one ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodTag {
    Known(Period),
    /// Header record missing or malformed; carries the fallback label.
    Unknown(String),
}

impl std::fmt::Display for PeriodTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(p) => write!(f, "{p}"),
            Self::Unknown(label) => f.write_str(label),
        }
    }
}

/// Tax values compared between ledger and XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxField {
    Icms,
    Ipi,
    IcmsBase,
}

impl TaxField {
    /// Reason tags for a positive and a negative divergence of this field.
    pub fn reasons(&self) -> (DivergenceReason, DivergenceReason) {
        match self {
            Self::Icms => (
                DivergenceReason::CreditExcess,
                DivergenceReason::CreditShortfall,
            ),
            Self::Ipi => (DivergenceReason::IpiExcess, DivergenceReason::IpiShortfall),
            Self::IcmsBase => (
                DivergenceReason::IcmsBaseExcess,
                DivergenceReason::IcmsBaseShortfall,
            ),
        }
    }
}

/// Amounts declared in the ledger, by document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclaredValues {
    /// C100: VL_DOC, VL_BC_ICMS, VL_ICMS, VL_IPI.
    Invoice {
        total: Decimal,
        icms_base: Decimal,
        icms: Decimal,
        ipi: Decimal,
    },
    /// D100: VL_DOC, VL_BC_ICMS, VL_ICMS.
    Transport {
        total: Decimal,
        icms_base: Decimal,
        icms: Decimal,
    },
}

impl DeclaredValues {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Invoice { .. } => DocumentKind::Nfe,
            Self::Transport { .. } => DocumentKind::Cte,
        }
    }

    pub fn total(&self) -> Decimal {
        match self {
            Self::Invoice { total, .. } | Self::Transport { total, .. } => *total,
        }
    }

    /// Declared value of a compared field. IPI is zero on transport documents.
    pub fn value(&self, field: TaxField) -> Decimal {
        match (self, field) {
            (Self::Invoice { icms, .. } | Self::Transport { icms, .. }, TaxField::Icms) => *icms,
            (
                Self::Invoice { icms_base, .. } | Self::Transport { icms_base, .. },
                TaxField::IcmsBase,
            ) => *icms_base,
            (Self::Invoice { ipi, .. }, TaxField::Ipi) => *ipi,
            (Self::Transport { .. }, TaxField::Ipi) => Decimal::ZERO,
        }
    }
}

/// One NF-e or CT-e as declared in a ledger file, with the codes
/// aggregated from its detail lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntity {
    pub period: PeriodTag,
    pub series: String,
    pub number: String,
    /// 44-digit access key.
    pub key: String,
    /// Emission date as written in the ledger (`DDMMYYYY`).
    pub emission_date: String,
    pub declared: DeclaredValues,
    pub cfops: BTreeSet<String>,
    pub icms_rates: BTreeSet<String>,
}

impl LedgerEntity {
    pub fn kind(&self) -> DocumentKind {
        self.declared.kind()
    }

    /// Parsed emission date, if the ledger text is a valid `DDMMYYYY` date.
    pub fn issue_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.emission_date, "%d%m%Y").ok()
    }

    /// CFOP codes, sorted and comma-joined for display.
    pub fn cfop_list(&self) -> String {
        join_codes(&self.cfops)
    }

    /// ICMS rate codes, sorted and comma-joined for display.
    pub fn rate_list(&self) -> String {
        join_codes(&self.icms_rates)
    }
}

fn join_codes(codes: &BTreeSet<String>) -> String {
    codes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name and CNPJ/CPF of a party named in an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyIdentity {
    pub name: String,
    pub tax_id: String,
}

impl Default for PartyIdentity {
    fn default() -> Self {
        Self {
            name: NOT_AVAILABLE.into(),
            tax_id: NOT_AVAILABLE.into(),
        }
    }
}

/// CT-e service payer (tomador), from the `toma3/toma` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PayerRole {
    /// 0
    Remetente,
    /// 1
    Expedidor,
    /// 2
    Recebedor,
    /// 3
    Destinatario,
    #[default]
    NotIdentified,
}

impl PayerRole {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Remetente,
            "1" => Self::Expedidor,
            "2" => Self::Recebedor,
            "3" => Self::Destinatario,
            _ => Self::NotIdentified,
        }
    }

    /// Element holding the party that pays for the service.
    pub fn party_element(&self) -> Option<&'static str> {
        match self {
            Self::Remetente => Some("rem"),
            Self::Expedidor => Some("exped"),
            Self::Recebedor => Some("receb"),
            Self::Destinatario => Some("dest"),
            Self::NotIdentified => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Remetente => "Remetente",
            Self::Expedidor => "Expedidor",
            Self::Recebedor => "Recebedor",
            Self::Destinatario => "Destinatário",
            Self::NotIdentified => "Não Identificado",
        }
    }
}

/// Fiscal values read from an XML document, by document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XmlValues {
    /// `ICMSTot` totals.
    Invoice {
        products_total: Decimal,
        icms: Decimal,
        ipi: Decimal,
    },
    Transport {
        /// `vPrest/vTPrest`.
        service_total: Decimal,
        icms_base: Decimal,
        icms: Decimal,
        icms_rate: Decimal,
        /// Tax situation code, `N/A` when absent.
        cst: String,
        payer_role: PayerRole,
        payer_name: String,
    },
}

impl XmlValues {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Invoice { .. } => DocumentKind::Nfe,
            Self::Transport { .. } => DocumentKind::Cte,
        }
    }

    pub fn value(&self, field: TaxField) -> Decimal {
        match (self, field) {
            (Self::Invoice { icms, .. } | Self::Transport { icms, .. }, TaxField::Icms) => *icms,
            (Self::Invoice { ipi, .. }, TaxField::Ipi) => *ipi,
            (Self::Transport { icms_base, .. }, TaxField::IcmsBase) => *icms_base,
            (Self::Invoice { .. }, TaxField::IcmsBase) | (Self::Transport { .. }, TaxField::Ipi) => {
                Decimal::ZERO
            }
        }
    }
}

/// One parsed NF-e or CT-e XML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmlDocument {
    /// Access key without the `NFe`/`CTe` prefix.
    pub key: String,
    pub issuer: PartyIdentity,
    pub recipient: PartyIdentity,
    pub values: XmlValues,
}

impl XmlDocument {
    pub fn kind(&self) -> DocumentKind {
        self.values.kind()
    }
}

/// Why an entity is divergent. Variant order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DivergenceReason {
    /// Declared ICMS above the XML: credit taken in excess.
    CreditExcess,
    /// Declared ICMS below the XML.
    CreditShortfall,
    IpiExcess,
    IpiShortfall,
    IcmsBaseExcess,
    IcmsBaseShortfall,
    /// Divergent without any specific reason.
    General,
}

impl DivergenceReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditExcess => "Crédito a Maior",
            Self::CreditShortfall => "Crédito a Menor",
            Self::IpiExcess => "Divergência IPI (a Maior)",
            Self::IpiShortfall => "Divergência IPI (a Menor)",
            Self::IcmsBaseExcess => "Divergência BC ICMS (a Maior)",
            Self::IcmsBaseShortfall => "Divergência BC ICMS (a Menor)",
            Self::General => "Divergência Geral",
        }
    }
}

/// Declared versus cross-referenced value of one compared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDifference {
    pub field: TaxField,
    pub declared: Decimal,
    pub cross_referenced: Decimal,
    /// `declared - cross_referenced`.
    pub difference: Decimal,
}

impl FieldDifference {
    /// Fails with [`AuditError::AmountOverflow`] when the difference does
    /// not fit in a `Decimal`.
    pub fn new(
        field: TaxField,
        declared: Decimal,
        cross_referenced: Decimal,
    ) -> Result<Self, AuditError> {
        let difference =
            declared
                .checked_sub(cross_referenced)
                .ok_or_else(|| AuditError::AmountOverflow {
                    declared: declared.to_string(),
                    cross_referenced: cross_referenced.to_string(),
                })?;
        Ok(Self {
            field,
            declared,
            cross_referenced,
            difference,
        })
    }
}

/// Result of reconciling one ledger entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Ok,
    /// At least one reason, in [`DivergenceReason`] order.
    Divergent(Vec<DivergenceReason>),
    /// No XML document with the entity's key.
    NotFound,
}

impl AuditOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn is_divergent(&self) -> bool {
        matches!(self, Self::Divergent(_))
    }
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::NotFound => f.write_str("XML Não Encontrado"),
            Self::Divergent(reasons) => {
                f.write_str("Divergência: ")?;
                for (i, r) in reasons.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(r.label())?;
                }
                Ok(())
            }
        }
    }
}
