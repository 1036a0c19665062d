use std::collections::HashMap;
use std::sync::Arc;

use encoding_rs::Encoding;

use super::DocumentParser;
use crate::core::{AuditWarning, SourceFile, XmlDocument};
use crate::sped::decode_text;

/// Parsed XML documents keyed by access key.
///
/// Built once per run and only read afterwards; documents are shared with
/// the audited entries through [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct XmlLookup {
    documents: HashMap<String, Arc<XmlDocument>>,
}

impl XmlLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `files` in order. Files that fail to parse or have no key are
    /// left out and reported as [`AuditWarning::InvalidXml`].
    pub fn build(
        parser: &dyn DocumentParser,
        files: &[SourceFile],
        fallback: &'static Encoding,
    ) -> (Self, Vec<AuditWarning>) {
        let mut lookup = Self::new();
        let mut warnings = Vec::new();
        for file in files {
            let text = decode_text(&file.bytes, fallback);
            match parser.parse(&text) {
                Some(doc) => lookup.insert(doc),
                None => {
                    tracing::warn!(file = %file.name, kind = parser.kind().label(), "invalid XML skipped");
                    warnings.push(AuditWarning::InvalidXml {
                        file: file.name.clone(),
                        kind: parser.kind(),
                    });
                }
            }
        }
        tracing::debug!(documents = lookup.len(), "XML lookup built");
        (lookup, warnings)
    }

    /// Add a document. A later document with the same key replaces the earlier one.
    pub fn insert(&mut self, document: XmlDocument) {
        let key = document.key.clone();
        if self
            .documents
            .insert(key.clone(), Arc::new(document))
            .is_some()
        {
            tracing::debug!(key = %key, "duplicate XML key, keeping the later document");
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<XmlDocument>> {
        self.documents.get(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<XmlDocument> for XmlLookup {
    fn from_iter<I: IntoIterator<Item = XmlDocument>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for doc in iter {
            lookup.insert(doc);
        }
        lookup
    }
}
