use thiserror::Error;

use super::types::DocumentKind;

/// Errors that can occur while auditing ledgers against XML documents.
///
/// Only [`AuditError::NoLedgerFiles`] stops a run. Everything else is caught
/// at the per-file or per-document guard and surfaced as an [`AuditWarning`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditError {
    /// A run was started without any ledger file.
    #[error("no ledger files supplied")]
    NoLedgerFiles,

    /// A ledger record has fewer fields than its layout requires.
    #[error("{tag} record has {found} fields, at least {required} required")]
    ShortRecord {
        tag: &'static str,
        found: usize,
        required: usize,
    },

    /// A ledger or XML amount could not be parsed as a decimal number.
    #[error("invalid amount '{value}'")]
    Amount { value: String },

    /// `declared - cross_referenced` is out of the decimal range.
    #[error("difference {declared} - {cross_referenced} overflows")]
    AmountOverflow {
        declared: String,
        cross_referenced: String,
    },

    /// XML reading error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Unknown or unusable text encoding.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Reading an input file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("export error: {0}")]
    Export(String),
}

/// A recoverable condition reported to the end user.
///
/// The `Display` output is the message shown on the warnings sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditWarning {
    /// No `|0000|` record with a usable start date in the ledger header.
    PeriodNotFound { file: String },
    /// A header record had fewer fields than its layout requires.
    MalformedHeader {
        file: String,
        line: usize,
        tag: &'static str,
    },
    /// Processing of a ledger file stopped early.
    UnexpectedFailure { file: String, message: String },
    /// An XML file could not be parsed or carried no document key.
    InvalidXml { file: String, kind: DocumentKind },
}

impl std::fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PeriodNotFound { file } => {
                write!(f, "Aviso: Competência não encontrada em {file}.")
            }
            Self::MalformedHeader { file, line, tag } => {
                write!(f, "Aviso: {tag} malformado em {file} linha {line}.")
            }
            Self::UnexpectedFailure { file, message } => {
                write!(f, "Erro inesperado em {file}: {message}")
            }
            Self::InvalidXml { file, kind } => {
                write!(f, "XML {} inválido ou sem chave: {file}", kind.label())
            }
        }
    }
}

impl AuditWarning {
    /// Name of the file the warning is bound to.
    pub fn file(&self) -> &str {
        match self {
            Self::PeriodNotFound { file }
            | Self::MalformedHeader { file, .. }
            | Self::UnexpectedFailure { file, .. }
            | Self::InvalidXml { file, .. } => file,
        }
    }
}
