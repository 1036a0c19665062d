//! # sped-auditor
//!
//! Reconciles Brazilian SPED fiscal ledgers (EFD) against the NF-e and CT-e
//! XML documents they declare, flagging ICMS and IPI divergences.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Pipeline
//!
//! 1. [`xml`] parses the uploaded XML documents into an [`xml::XmlLookup`]
//!    keyed by access key.
//! 2. [`sped`] decodes each ledger, reads its period from the `|0000|` record
//!    and groups detail lines (`C170`/`D190`) under their headers
//!    (`C100`/`D100`).
//! 3. [`audit`] filters each entity, joins it to its XML and classifies the
//!    differences.
//! 4. [`report`] lays the result out as a table with a warnings sheet.
//!
//! ## Quick Start
//!
//! ```rust
//! use sped_auditor::audit::run_audit;
//! use sped_auditor::report::ReportTable;
//! use sped_auditor::*;
//!
//! let ledger = "|0000|017|0|01032024|31032024|\n\
//!     |C100|0|1|F1|55|00|1|123|KEY123|05032024|05032024|1000,00|0|0|0|1000,00|9|0|0|0|1000,00|150,00|0|0|0,00|0|0|0|0|\n\
//!     |C170|1|P1|Item|1|UN|1000,00|0|0|000|1102|\n";
//! let xml = r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe"><infNFe Id="NFeKEY123">
//!     <total><ICMSTot><vProd>1000.00</vProd><vICMS>100.00</vICMS><vIPI>0.00</vIPI></ICMSTot></total>
//!     </infNFe></NFe>"#;
//!
//! let run = run_audit(
//!     DocumentKind::Nfe,
//!     &[SourceFile::new("sped.txt", ledger)],
//!     &[SourceFile::new("nota.xml", xml)],
//!     &AuditConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(run.entries[0].outcome.to_string(), "Divergência: Crédito a Maior");
//! assert_eq!(ReportTable::from_run(&run).rows.len(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `xlsx` | Spreadsheet export via `rust_xlsxwriter` |

pub mod audit;
pub mod core;
pub mod report;
pub mod sped;
pub mod xml;

// Re-export core types at crate root for convenience
pub use crate::core::*;
