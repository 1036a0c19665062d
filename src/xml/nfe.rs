use quick_xml::events::BytesStart;

use super::DocumentParser;
use super::reader::{ElementVisitor, amount, attribute, document_key, leaf, parent, set_once, walk};
use crate::core::{AuditError, DocumentKind, NOT_AVAILABLE, PartyIdentity, XmlDocument, XmlValues};

/// Parser for NF-e XML (`NFe` or the authorized `nfeProc` envelope).
#[derive(Debug, Clone, Copy, Default)]
pub struct NfeParser;

impl NfeParser {
    /// Parse an NF-e, distinguishing errors from a document without key.
    pub fn read(&self, xml: &str) -> Result<Option<XmlDocument>, AuditError> {
        let kind = DocumentKind::Nfe;
        let mut p = NfeParsed::default();
        walk(xml, kind.namespace(), &mut p)?;
        p.into_document()
    }
}

impl DocumentParser for NfeParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Nfe
    }

    fn parse(&self, xml: &str) -> Option<XmlDocument> {
        self.read(xml)
            .inspect_err(|e| tracing::debug!(error = %e, "NF-e XML rejected"))
            .ok()
            .flatten()
    }
}

#[derive(Default)]
struct NfeParsed {
    key: Option<String>,
    products_total: Option<String>,
    icms: Option<String>,
    ipi: Option<String>,
    issuer: ParsedParty,
    recipient: ParsedParty,
}

#[derive(Default)]
pub(crate) struct ParsedParty {
    pub(crate) name: Option<String>,
    pub(crate) cnpj: Option<String>,
    pub(crate) cpf: Option<String>,
}

impl ParsedParty {
    pub(crate) fn handle(&mut self, leaf: &str, text: &str) {
        match leaf {
            "xNome" => set_once(&mut self.name, text),
            "CNPJ" => set_once(&mut self.cnpj, text),
            "CPF" => set_once(&mut self.cpf, text),
            _ => {}
        }
    }

    pub(crate) fn into_identity(self) -> PartyIdentity {
        PartyIdentity {
            name: self.name.unwrap_or_else(|| NOT_AVAILABLE.into()),
            tax_id: self
                .cnpj
                .or(self.cpf)
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
        }
    }
}

impl ElementVisitor for NfeParsed {
    fn start(&mut self, path: &[String], element: &BytesStart<'_>) -> Result<(), AuditError> {
        if self.key.is_none() && leaf(path) == DocumentKind::Nfe.info_element() {
            self.key = attribute(element, "Id")?
                .and_then(|id| document_key(&id, DocumentKind::Nfe.key_prefix()));
        }
        Ok(())
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), AuditError> {
        let leaf = leaf(path);
        match parent(path) {
            "ICMSTot" => match leaf {
                "vProd" => set_once(&mut self.products_total, text),
                "vICMS" => set_once(&mut self.icms, text),
                "vIPI" => set_once(&mut self.ipi, text),
                _ => {}
            },
            "emit" => self.issuer.handle(leaf, text),
            "dest" => self.recipient.handle(leaf, text),
            _ => {}
        }
        Ok(())
    }
}

impl NfeParsed {
    fn into_document(self) -> Result<Option<XmlDocument>, AuditError> {
        let Some(key) = self.key else {
            return Ok(None);
        };
        Ok(Some(XmlDocument {
            key,
            values: XmlValues::Invoice {
                products_total: amount(&self.products_total)?,
                icms: amount(&self.icms)?,
                ipi: amount(&self.ipi)?,
            },
            issuer: self.issuer.into_identity(),
            recipient: self.recipient.into_identity(),
        }))
    }
}
