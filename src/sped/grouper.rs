use std::collections::BTreeSet;

use super::record::{DetailRecord, HeaderRecord, record_tag, split_record};
use crate::core::{AuditError, AuditWarning, DocumentKind, LedgerEntity, PeriodTag};

/// An entity whose header has been read and whose detail lines are still
/// being collected.
#[derive(Debug, Clone)]
struct OpenEntity {
    header: HeaderRecord,
    cfops: BTreeSet<String>,
    icms_rates: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
enum GroupState {
    #[default]
    NoEntityOpen,
    EntityOpen(OpenEntity),
}

/// Finalize the open entity, if any.
///
/// Fails only when an audited amount of the entity cannot be parsed.
fn close(state: GroupState, period: &PeriodTag) -> Result<Option<LedgerEntity>, AuditError> {
    let GroupState::EntityOpen(open) = state else {
        return Ok(None);
    };
    let declared = open.header.declared_values()?;
    let HeaderRecord {
        series,
        number,
        key,
        emission_date,
        ..
    } = open.header;
    Ok(Some(LedgerEntity {
        period: period.clone(),
        series,
        number,
        key,
        emission_date,
        declared,
        cfops: open.cfops,
        icms_rates: open.icms_rates,
    }))
}

/// Groups the detail lines of one ledger file under their header records.
///
/// Feed lines in file order; every header record closes the previous
/// entity, and [`LedgerGrouper::finish`] closes the last one.
#[derive(Debug)]
pub struct LedgerGrouper {
    kind: DocumentKind,
    file: String,
    period: PeriodTag,
    state: GroupState,
}

impl LedgerGrouper {
    pub fn new(kind: DocumentKind, file: impl Into<String>, period: PeriodTag) -> Self {
        Self {
            kind,
            file: file.into(),
            period,
            state: GroupState::NoEntityOpen,
        }
    }

    /// Whether a header has been read and not yet closed.
    pub fn has_open_entity(&self) -> bool {
        matches!(self.state, GroupState::EntityOpen(_))
    }

    /// Process one line (1-based `line_no`), returning an entity if the line
    /// closed one.
    pub fn feed(
        &mut self,
        line_no: usize,
        line: &str,
        warnings: &mut Vec<AuditWarning>,
    ) -> Result<Option<LedgerEntity>, AuditError> {
        let fields = split_record(line);
        let Some(tag) = record_tag(&fields) else {
            return Ok(None);
        };

        if tag == self.kind.header_tag() {
            let closed = close(std::mem::take(&mut self.state), &self.period)?;
            match HeaderRecord::parse(self.kind, &fields) {
                Ok(header) => {
                    self.state = GroupState::EntityOpen(OpenEntity {
                        header,
                        cfops: BTreeSet::new(),
                        icms_rates: BTreeSet::new(),
                    });
                }
                Err(AuditError::ShortRecord { tag, found, .. }) => {
                    tracing::warn!(file = %self.file, line = line_no, fields = found, "malformed {tag} record");
                    warnings.push(AuditWarning::MalformedHeader {
                        file: self.file.clone(),
                        line: line_no,
                        tag,
                    });
                }
                Err(e) => return Err(e),
            }
            return Ok(closed);
        }

        if tag == self.kind.detail_tag() {
            if let GroupState::EntityOpen(open) = &mut self.state {
                if let Some(detail) = DetailRecord::parse(self.kind, &fields) {
                    open.cfops.extend(detail.cfop);
                    open.icms_rates.extend(detail.icms_rate);
                }
            }
        }
        Ok(None)
    }

    /// Close the last open entity at end of stream.
    pub fn finish(self) -> Result<Option<LedgerEntity>, AuditError> {
        close(self.state, &self.period)
    }
}
