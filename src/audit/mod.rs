//! Reconciliation of ledger entities against the XML lookup.
//!
//! Each closed entity is filtered by [`passes_inclusion`], joined to its XML
//! document by access key and classified by [`classify`]. A run is strictly
//! sequential: XML files first, then ledger files in upload order.
//!
//! ```
//! use sped_auditor::audit::run_audit;
//! use sped_auditor::{AuditConfig, DocumentKind, SourceFile};
//!
//! let ledger = SourceFile::new("sped.txt", "|0000|017|0|01032024|31032024|\n");
//! let run = run_audit(DocumentKind::Nfe, &[ledger], &[], &AuditConfig::default()).unwrap();
//! assert!(run.is_empty());
//! ```

mod engine;
mod reconcile;

pub use engine::{AuditRun, FileAudit, audit_ledger_file, run_audit};
pub use reconcile::{AuditedEntry, classify, passes_inclusion, reconcile};
