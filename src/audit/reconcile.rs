use std::cmp::Ordering;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::core::{
    AuditConfig, AuditError, AuditOutcome, DeclaredValues, DivergenceReason, FieldDifference, LedgerEntity,
    TaxField, XmlDocument,
};
use crate::xml::XmlLookup;

/// CFOP first digits of inbound operations.
const INBOUND_CFOP_PREFIXES: [char; 3] = ['1', '2', '3'];

/// One ledger entity after reconciliation against the XML lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditedEntry {
    pub entity: LedgerEntity,
    /// The matching XML document, if one was found.
    pub document: Option<Arc<XmlDocument>>,
    /// One entry per compared field of the document kind.
    pub differences: Vec<FieldDifference>,
    pub outcome: AuditOutcome,
}

impl AuditedEntry {
    pub fn xml_found(&self) -> bool {
        self.document.is_some()
    }

    /// Difference recorded for `field`, zero if the field is not compared.
    pub fn difference(&self, field: TaxField) -> Decimal {
        self.differences
            .iter()
            .find(|d| d.field == field)
            .map(|d| d.difference)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Whether an entity belongs in the report at all.
///
/// Invoices need a tax amount and at least one inbound CFOP; transport
/// documents need ICMS.
pub fn passes_inclusion(entity: &LedgerEntity) -> bool {
    match &entity.declared {
        DeclaredValues::Invoice { icms, ipi, .. } => {
            let taxed = *icms > Decimal::ZERO || *ipi > Decimal::ZERO;
            taxed
                && entity
                    .cfops
                    .iter()
                    .any(|cfop| cfop.starts_with(INBOUND_CFOP_PREFIXES))
        }
        DeclaredValues::Transport { icms, .. } => *icms > Decimal::ZERO,
    }
}

/// Classify compared fields: a field diverges when `|difference| >= tolerance`.
pub fn classify(differences: &[FieldDifference], tolerance: Decimal) -> AuditOutcome {
    let divergent: Vec<&FieldDifference> = differences
        .iter()
        .filter(|d| d.difference.abs() >= tolerance)
        .collect();
    if divergent.is_empty() {
        return AuditOutcome::Ok;
    }

    let mut reasons: Vec<DivergenceReason> = divergent
        .iter()
        .filter_map(|d| {
            let (excess, shortfall) = d.field.reasons();
            match d.difference.cmp(&Decimal::ZERO) {
                Ordering::Greater => Some(excess),
                Ordering::Less => Some(shortfall),
                // only reachable with a non-positive tolerance
                Ordering::Equal => None,
            }
        })
        .collect();
    reasons.sort();
    reasons.dedup();
    if reasons.is_empty() {
        reasons.push(DivergenceReason::General);
    }
    AuditOutcome::Divergent(reasons)
}

/// Reconcile one closed entity. Returns `Ok(None)` when the entity fails
/// [`passes_inclusion`], and an error when a difference overflows.
pub fn reconcile(
    entity: LedgerEntity,
    lookup: &XmlLookup,
    config: &AuditConfig,
) -> Result<Option<AuditedEntry>, AuditError> {
    if !passes_inclusion(&entity) {
        tracing::trace!(key = %entity.key, "entity filtered out");
        return Ok(None);
    }

    let fields = entity.kind().compared_fields();
    let document = lookup
        .get(&entity.key)
        .filter(|doc| doc.kind() == entity.kind())
        .cloned();

    let differences = fields
        .iter()
        .map(|&field| {
            let cross_referenced = document
                .as_ref()
                .map(|doc| doc.values.value(field))
                .unwrap_or(Decimal::ZERO);
            FieldDifference::new(field, entity.declared.value(field), cross_referenced)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = match document {
        Some(_) => classify(&differences, config.tolerance),
        None => AuditOutcome::NotFound,
    };

    Ok(Some(AuditedEntry {
        entity,
        document,
        differences,
        outcome,
    }))
}
