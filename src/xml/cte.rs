use std::collections::HashMap;

use quick_xml::events::BytesStart;

use super::DocumentParser;
use super::nfe::ParsedParty;
use super::reader::{
    ElementVisitor, amount, ancestor, attribute, document_key, leaf, parent, set_once, walk,
};
use crate::core::{AuditError, DocumentKind, NOT_AVAILABLE, PayerRole, XmlDocument, XmlValues};

/// ICMS group for operations taxed in another state. Checked before the
/// groups in [`ICMS_GROUPS`]; its fields carry an `OutraUF` suffix.
const ICMS_OTHER_STATE: &str = "ICMSOutraUF";

/// Remaining ICMS groups of the CT-e schema, in lookup order.
const ICMS_GROUPS: [&str; 11] = [
    "ICMS00",
    "ICMS90",
    "ICMS20",
    "ICMS40",
    "ICMS51",
    "ICMS60",
    "ICMS70",
    "ICMSPart",
    "ICMSST",
    "ICMSCons",
    "ICMSUFDest",
];

/// Parser for CT-e XML (`CTe` or the authorized `cteProc` envelope).
#[derive(Debug, Clone, Copy, Default)]
pub struct CteParser;

impl CteParser {
    /// Parse a CT-e, distinguishing errors from a document without key.
    pub fn read(&self, xml: &str) -> Result<Option<XmlDocument>, AuditError> {
        let kind = DocumentKind::Cte;
        let mut p = CteParsed::default();
        walk(xml, kind.namespace(), &mut p)?;
        p.into_document()
    }
}

impl DocumentParser for CteParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Cte
    }

    fn parse(&self, xml: &str) -> Option<XmlDocument> {
        self.read(xml)
            .inspect_err(|e| tracing::debug!(error = %e, "CT-e XML rejected"))
            .ok()
            .flatten()
    }
}

#[derive(Default, Debug)]
struct IcmsGroup {
    base: Option<String>,
    value: Option<String>,
    rate: Option<String>,
    cst: Option<String>,
}

#[derive(Default)]
struct CteParsed {
    key: Option<String>,
    service_total: Option<String>,
    /// ICMS groups found under `imp/ICMS`, by group element name.
    icms_groups: HashMap<String, IcmsGroup>,
    payer_code: Option<String>,
    /// `xNome` of rem, exped, receb and dest.
    party_names: HashMap<String, String>,
    issuer: ParsedParty,
    recipient: ParsedParty,
}

impl CteParsed {
    fn handle_icms(&mut self, group: &str, leaf: &str, text: &str) {
        if group != ICMS_OTHER_STATE && !ICMS_GROUPS.contains(&group) {
            return;
        }
        let g = self.icms_groups.entry(group.to_string()).or_default();
        if leaf == "CST" {
            set_once(&mut g.cst, text);
            return;
        }
        let field = if group == ICMS_OTHER_STATE {
            leaf.strip_suffix("OutraUF")
        } else {
            Some(leaf)
        };
        match field {
            Some("vBC") => set_once(&mut g.base, text),
            Some("vICMS") => set_once(&mut g.value, text),
            Some("pICMS") => set_once(&mut g.rate, text),
            _ => {}
        }
    }

    /// The other-state group wins; otherwise the first group in lookup order.
    fn selected_icms_group(&self) -> Option<&IcmsGroup> {
        std::iter::once(ICMS_OTHER_STATE)
            .chain(ICMS_GROUPS)
            .find_map(|name| self.icms_groups.get(name))
    }

    fn into_document(self) -> Result<Option<XmlDocument>, AuditError> {
        let Some(key) = self.key.clone() else {
            return Ok(None);
        };

        let empty = IcmsGroup::default();
        let icms = self.selected_icms_group().unwrap_or(&empty);
        let icms_base = amount(&icms.base)?;
        let icms_value = amount(&icms.value)?;
        let icms_rate = amount(&icms.rate)?;
        let cst = icms.cst.clone().unwrap_or_else(|| NOT_AVAILABLE.into());

        let payer_role = self
            .payer_code
            .as_deref()
            .map(PayerRole::from_code)
            .unwrap_or_default();
        let payer_name = payer_role
            .party_element()
            .and_then(|element| self.party_names.get(element))
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.into());

        Ok(Some(XmlDocument {
            key,
            values: XmlValues::Transport {
                service_total: amount(&self.service_total)?,
                icms_base,
                icms: icms_value,
                icms_rate,
                cst,
                payer_role,
                payer_name,
            },
            issuer: self.issuer.into_identity(),
            recipient: self.recipient.into_identity(),
        }))
    }
}

impl ElementVisitor for CteParsed {
    fn start(&mut self, path: &[String], element: &BytesStart<'_>) -> Result<(), AuditError> {
        if self.key.is_none() && leaf(path) == DocumentKind::Cte.info_element() {
            self.key = attribute(element, "Id")?
                .and_then(|id| document_key(&id, DocumentKind::Cte.key_prefix()));
        }
        Ok(())
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), AuditError> {
        let leaf = leaf(path);
        let parent = parent(path);

        if ancestor(path, 2) == "ICMS" {
            self.handle_icms(parent, leaf, text);
            return Ok(());
        }

        match (parent, leaf) {
            ("vPrest", "vTPrest") => set_once(&mut self.service_total, text),
            ("toma3", "toma") => set_once(&mut self.payer_code, text),
            ("emit", _) => self.issuer.handle(leaf, text),
            ("dest", _) => {
                self.recipient.handle(leaf, text);
                if leaf == "xNome" {
                    self.party_names
                        .entry(parent.to_string())
                        .or_insert_with(|| text.to_string());
                }
            }
            ("rem" | "exped" | "receb", "xNome") => {
                self.party_names
                    .entry(parent.to_string())
                    .or_insert_with(|| text.to_string());
            }
            _ => {}
        }
        Ok(())
    }
}
