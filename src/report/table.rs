use rust_decimal::Decimal;
use serde::Serialize;

use crate::audit::{AuditRun, AuditedEntry};
use crate::core::{DocumentKind, NOT_AVAILABLE, PayerRole, TaxField, XmlValues};

/// Name of the warnings sheet.
pub const WARNINGS_SHEET: &str = "Avisos";

/// One report cell. Numeric columns always hold [`Cell::Number`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Number(Decimal),
    Empty,
}

impl Cell {
    /// Text cell, or [`Cell::Empty`] for an empty value.
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

const NFE_COLUMNS: [&str; 21] = [
    "Competência",
    "Série da nota",
    "Número da nota",
    "Chave",
    "Data de emissão",
    "Valor Total SPED",
    "BC ICMS SPED",
    "Valor ICMS SPED",
    "Valor IPI SPED",
    "CFOP",
    "XML Encontrado",
    "Emitente XML",
    "CNPJ Emitente XML",
    "Destinatário XML",
    "CNPJ Destinatário XML",
    "Valor Produtos XML",
    "Valor ICMS XML",
    "Valor IPI XML",
    "Diferença ICMS (SPED - XML)",
    "Diferença IPI (SPED - XML)",
    "Status Auditoria",
];

const CTE_COLUMNS: [&str; 25] = [
    "Competência",
    "Série CT-e",
    "Número CT-e",
    "Chave CT-e",
    "Tipo Tomador XML",
    "Nome Tomador XML",
    "Data de Emissão SPED",
    "Valor Total Prestação SPED",
    "BC ICMS SPED",
    "Valor ICMS SPED",
    "CFOPs SPED",
    "Alíquotas ICMS SPED",
    "XML Encontrado",
    "Emitente XML",
    "CNPJ Emitente XML",
    "Destinatário XML",
    "CNPJ Destinatário XML",
    "Valor Total Prestação XML",
    "BC ICMS XML",
    "Valor ICMS XML",
    "Alíquota ICMS XML",
    "CST XML",
    "Diferença BC ICMS (SPED - XML)",
    "Diferença ICMS (SPED - XML)",
    "Status Auditoria",
];

/// Tabular form of an [`AuditRun`]: the results sheet plus the warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub kind: DocumentKind,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
    /// Warning messages, XML warnings first.
    pub warnings: Vec<String>,
}

impl ReportTable {
    pub fn from_run(run: &AuditRun) -> Self {
        let rows = run
            .entries
            .iter()
            .map(|entry| match run.kind {
                DocumentKind::Nfe => invoice_row(entry),
                DocumentKind::Cte => transport_row(entry),
            })
            .collect();
        Self {
            kind: run.kind,
            columns: columns(run.kind),
            rows,
            warnings: run.warnings().map(ToString::to_string).collect(),
        }
    }

    /// Name of the results sheet.
    pub fn sheet_name(&self) -> &'static str {
        self.kind.label()
    }

    pub fn file_name(&self) -> &'static str {
        self.kind.report_file_name()
    }

    /// Index of a column by header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == header)
    }
}

/// Ordered result columns for a document kind.
pub fn columns(kind: DocumentKind) -> &'static [&'static str] {
    match kind {
        DocumentKind::Nfe => &NFE_COLUMNS,
        DocumentKind::Cte => &CTE_COLUMNS,
    }
}

fn found_flag(entry: &AuditedEntry) -> Cell {
    Cell::text(if entry.xml_found() { "Sim" } else { "Não" })
}

fn identity_cells(entry: &AuditedEntry) -> [Cell; 4] {
    match &entry.document {
        Some(doc) => [
            Cell::text(doc.issuer.name.as_str()),
            Cell::text(doc.issuer.tax_id.as_str()),
            Cell::text(doc.recipient.name.as_str()),
            Cell::text(doc.recipient.tax_id.as_str()),
        ],
        None => std::array::from_fn(|_| Cell::text(NOT_AVAILABLE)),
    }
}

fn invoice_row(entry: &AuditedEntry) -> Vec<Cell> {
    let e = &entry.entity;
    let (products_total, icms, ipi) = match entry.document.as_deref().map(|d| &d.values) {
        Some(XmlValues::Invoice {
            products_total,
            icms,
            ipi,
        }) => (*products_total, *icms, *ipi),
        _ => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
    };

    let mut row = vec![
        Cell::text(e.period.to_string()),
        Cell::text(e.series.as_str()),
        Cell::text(e.number.as_str()),
        Cell::text(e.key.as_str()),
        Cell::text(e.emission_date.as_str()),
        Cell::Number(e.declared.total()),
        Cell::Number(e.declared.value(TaxField::IcmsBase)),
        Cell::Number(e.declared.value(TaxField::Icms)),
        Cell::Number(e.declared.value(TaxField::Ipi)),
        Cell::text(e.cfop_list()),
        found_flag(entry),
    ];
    row.extend(identity_cells(entry));
    row.extend([
        Cell::Number(products_total),
        Cell::Number(icms),
        Cell::Number(ipi),
        Cell::Number(entry.difference(TaxField::Icms)),
        Cell::Number(entry.difference(TaxField::Ipi)),
        Cell::text(entry.outcome.to_string()),
    ]);
    row
}

fn transport_row(entry: &AuditedEntry) -> Vec<Cell> {
    let e = &entry.entity;
    let xml = match entry.document.as_deref().map(|d| &d.values) {
        Some(XmlValues::Transport {
            service_total,
            icms_base,
            icms,
            icms_rate,
            cst,
            payer_role,
            payer_name,
        }) => (
            *service_total,
            *icms_base,
            *icms,
            *icms_rate,
            cst.as_str(),
            *payer_role,
            payer_name.as_str(),
        ),
        _ => (
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            NOT_AVAILABLE,
            PayerRole::NotIdentified,
            NOT_AVAILABLE,
        ),
    };
    let (service_total, icms_base, icms, icms_rate, cst, payer_role, payer_name) = xml;

    let mut row = vec![
        Cell::text(e.period.to_string()),
        Cell::text(e.series.as_str()),
        Cell::text(e.number.as_str()),
        Cell::text(e.key.as_str()),
        Cell::text(payer_role.label()),
        Cell::text(payer_name),
        Cell::text(e.emission_date.as_str()),
        Cell::Number(e.declared.total()),
        Cell::Number(e.declared.value(TaxField::IcmsBase)),
        Cell::Number(e.declared.value(TaxField::Icms)),
        Cell::text(e.cfop_list()),
        Cell::text(e.rate_list()),
        found_flag(entry),
    ];
    row.extend(identity_cells(entry));
    row.extend([
        Cell::Number(service_total),
        Cell::Number(icms_base),
        Cell::Number(icms),
        Cell::Number(icms_rate),
        Cell::text(cst),
        Cell::Number(entry.difference(TaxField::IcmsBase)),
        Cell::Number(entry.difference(TaxField::Icms)),
        Cell::text(entry.outcome.to_string()),
    ]);
    row
}
