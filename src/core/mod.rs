//! Core types, errors, configuration and amount handling.
//!
//! The data model follows the two fiscal document types reconciled by the
//! crate: NF-e (goods invoices) and CT-e (transport documents).

mod amount;
mod config;
mod error;
mod source;
mod types;

pub use amount::*;
pub use config::*;
pub use error::*;
pub use source::*;
pub use types::*;
