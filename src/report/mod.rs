//! Report assembly and export.
//!
//! [`ReportTable::from_run`] lays an audit run out in the fixed column order
//! of its document kind. The table renders to CSV and, with the `xlsx`
//! feature, to a spreadsheet with a results sheet and an `Avisos` sheet.
//!
//! # Example
//!
//! ```
//! use sped_auditor::audit::run_audit;
//! use sped_auditor::report::ReportTable;
//! use sped_auditor::{AuditConfig, DocumentKind, SourceFile};
//!
//! let ledger = SourceFile::new("sped.txt", "|C100|0|1|");
//! let run = run_audit(DocumentKind::Nfe, &[ledger], &[], &AuditConfig::default()).unwrap();
//! let report = ReportTable::from_run(&run);
//! assert!(report.rows.is_empty());
//! assert_eq!(report.warnings.len(), 2);
//! assert!(report.to_csv().starts_with("\"Competência\";"));
//! ```

mod csv;
mod table;
#[cfg(feature = "xlsx")]
mod xlsx;

pub use table::{Cell, ReportTable, WARNINGS_SHEET, columns};
