//! Run configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for an audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Absolute difference at or above which a value is divergent.
    pub tolerance: Decimal,
    /// Number of leading ledger lines searched for the `|0000|` record.
    pub header_scan_lines: usize,
    /// Period label used when the ledger header yields no period.
    pub unknown_period_label: String,
    /// WHATWG label of the encoding used when input is not valid UTF-8.
    pub fallback_encoding: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            tolerance: dec!(0.01),
            header_scan_lines: 20,
            unknown_period_label: "Desconhecida".into(),
            fallback_encoding: "windows-1252".into(),
        }
    }
}

/// Builder for [`AuditConfig`].
///
/// # Example
///
/// ```
/// use sped_auditor::AuditConfigBuilder;
/// use rust_decimal_macros::dec;
///
/// let config = AuditConfigBuilder::new()
///     .tolerance(dec!(0.05))
///     .header_scan_lines(40)
///     .build();
/// assert_eq!(config.tolerance, dec!(0.05));
/// ```
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the divergence tolerance (default 0.01).
    pub fn tolerance(mut self, tolerance: Decimal) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set how many header lines are scanned for the period (default 20).
    pub fn header_scan_lines(mut self, lines: usize) -> Self {
        self.config.header_scan_lines = lines;
        self
    }

    /// Set the label used for files without a period.
    pub fn unknown_period_label(mut self, label: impl Into<String>) -> Self {
        self.config.unknown_period_label = label.into();
        self
    }

    /// Set the fallback single-byte encoding by WHATWG label.
    pub fn fallback_encoding(mut self, label: impl Into<String>) -> Self {
        self.config.fallback_encoding = label.into();
        self
    }

    pub fn build(self) -> AuditConfig {
        self.config
    }
}
