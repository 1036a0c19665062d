use encoding_rs::Encoding;

use super::reconcile::{AuditedEntry, reconcile};
use crate::core::{AuditConfig, AuditError, AuditWarning, DocumentKind, PeriodTag, SourceFile};
use crate::sped::{LedgerGrouper, decode_text, extract_period, fallback_encoding, ledger_lines};
use crate::xml::{XmlLookup, parser_for};

/// Result of auditing one ledger file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAudit {
    pub file: String,
    pub entries: Vec<AuditedEntry>,
    pub warnings: Vec<AuditWarning>,
}

impl FileAudit {
    fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Result of a full audit run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRun {
    pub kind: DocumentKind,
    /// Audited entries in ledger upload order, then file order.
    pub entries: Vec<AuditedEntry>,
    pub xml_warnings: Vec<AuditWarning>,
    pub ledger_warnings: Vec<AuditWarning>,
    /// Number of XML documents in the lookup.
    pub xml_documents: usize,
}

impl AuditRun {
    /// No entity met the inclusion criteria.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_ok()).count()
    }

    pub fn divergent_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_divergent())
            .count()
    }

    pub fn not_found_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.xml_found()).count()
    }

    /// All warnings, XML warnings first.
    pub fn warnings(&self) -> impl Iterator<Item = &AuditWarning> {
        self.xml_warnings.iter().chain(&self.ledger_warnings)
    }
}

/// Audit one ledger file against the lookup.
///
/// Never fails: a failure part way through the file becomes an
/// [`AuditWarning::UnexpectedFailure`] and the entries produced so far are kept.
pub fn audit_ledger_file(
    kind: DocumentKind,
    file: &SourceFile,
    lookup: &XmlLookup,
    config: &AuditConfig,
) -> FileAudit {
    match fallback_encoding(config) {
        Ok(fallback) => audit_file(kind, file, lookup, config, fallback),
        Err(e) => {
            let mut audit = FileAudit::new(&file.name);
            audit.warnings.push(unexpected(&file.name, &e));
            audit
        }
    }
}

fn audit_file(
    kind: DocumentKind,
    file: &SourceFile,
    lookup: &XmlLookup,
    config: &AuditConfig,
    fallback: &'static Encoding,
) -> FileAudit {
    let mut audit = FileAudit::new(&file.name);
    if let Err(e) = read_ledger(kind, file, lookup, config, fallback, &mut audit) {
        audit.warnings.push(unexpected(&file.name, &e));
    }
    tracing::debug!(
        file = %file.name,
        entries = audit.entries.len(),
        warnings = audit.warnings.len(),
        "ledger file audited"
    );
    audit
}

fn read_ledger(
    kind: DocumentKind,
    file: &SourceFile,
    lookup: &XmlLookup,
    config: &AuditConfig,
    fallback: &'static Encoding,
    audit: &mut FileAudit,
) -> Result<(), AuditError> {
    let text = decode_text(&file.bytes, fallback);

    let period = match extract_period(&text, config.header_scan_lines) {
        Some(period) => PeriodTag::Known(period),
        None => {
            tracing::warn!(file = %file.name, "no period in ledger header");
            audit.warnings.push(AuditWarning::PeriodNotFound {
                file: file.name.clone(),
            });
            PeriodTag::Unknown(config.unknown_period_label.clone())
        }
    };

    let mut grouper = LedgerGrouper::new(kind, &file.name, period);
    for (index, line) in ledger_lines(&text).enumerate() {
        if let Some(entity) = grouper.feed(index + 1, line, &mut audit.warnings)? {
            audit.entries.extend(reconcile(entity, lookup, config)?);
        }
    }
    if let Some(entity) = grouper.finish()? {
        audit.entries.extend(reconcile(entity, lookup, config)?);
    }
    Ok(())
}

fn unexpected(file: &str, error: &AuditError) -> AuditWarning {
    tracing::warn!(file = %file, error = %error, "ledger file aborted");
    AuditWarning::UnexpectedFailure {
        file: file.to_string(),
        message: error.to_string(),
    }
}

/// Run a full audit: build the XML lookup, then audit each ledger file in
/// upload order.
///
/// Fails only when no ledger file is given or the configured fallback
/// encoding is unknown.
pub fn run_audit(
    kind: DocumentKind,
    ledgers: &[SourceFile],
    xmls: &[SourceFile],
    config: &AuditConfig,
) -> Result<AuditRun, AuditError> {
    if ledgers.is_empty() {
        return Err(AuditError::NoLedgerFiles);
    }
    let fallback = fallback_encoding(config)?;

    let (lookup, xml_warnings) = XmlLookup::build(parser_for(kind), xmls, fallback);

    let mut entries = Vec::new();
    let mut ledger_warnings = Vec::new();
    for file in ledgers {
        let audit = audit_file(kind, file, &lookup, config, fallback);
        entries.extend(audit.entries);
        ledger_warnings.extend(audit.warnings);
    }

    let run = AuditRun {
        kind,
        entries,
        xml_warnings,
        ledger_warnings,
        xml_documents: lookup.len(),
    };
    tracing::info!(
        kind = kind.label(),
        ledgers = ledgers.len(),
        xml_documents = run.xml_documents,
        entries = run.entries.len(),
        ok = run.ok_count(),
        divergent = run.divergent_count(),
        not_found = run.not_found_count(),
        "audit finished"
    );
    Ok(run)
}
