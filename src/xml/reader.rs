use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::core::{AuditError, parse_xml_amount};
use rust_decimal::Decimal;

/// Path entry for elements outside the document namespace. Never matches a
/// schema element name.
const FOREIGN: &str = "#foreign";

/// Receives the elements of one document namespace while the tree is walked.
///
/// `path` holds the local names from the root down to the current element.
pub(crate) trait ElementVisitor {
    fn start(&mut self, _path: &[String], _element: &BytesStart<'_>) -> Result<(), AuditError> {
        Ok(())
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), AuditError>;
}

/// Walk a namespaced document, reporting elements of `namespace` to `visitor`.
///
/// Malformed markup and unbalanced elements are errors.
pub(crate) fn walk<V: ElementVisitor>(
    xml: &str,
    namespace: &str,
    visitor: &mut V,
) -> Result<(), AuditError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut saw_element = false;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(ref e))) => {
                saw_element = true;
                path.push(element_name(&ns, e, namespace));
                visitor.start(&path, e)?;
            }
            Ok((ns, Event::Empty(ref e))) => {
                saw_element = true;
                path.push(element_name(&ns, e, namespace));
                visitor.start(&path, e)?;
                path.pop();
            }
            Ok((_, Event::Text(ref e))) => {
                let text = e
                    .unescape()
                    .map_err(|e| AuditError::Xml(format!("invalid text: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    visitor.text(&path, text)?;
                }
            }
            Ok((_, Event::CData(ref e))) => {
                let text = std::str::from_utf8(e)
                    .map_err(|e| AuditError::Xml(format!("invalid CDATA: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    visitor.text(&path, text)?;
                }
            }
            Ok((_, Event::End(_))) => {
                path.pop();
            }
            Ok((_, Event::Eof)) => break,
            Err(e) => {
                return Err(AuditError::Xml(format!("XML parse error: {e}")));
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(AuditError::Xml("document has no root element".into()));
    }
    if !path.is_empty() {
        return Err(AuditError::Xml(format!("unclosed element <{}>", path.join("/"))));
    }
    Ok(())
}

fn element_name(ns: &ResolveResult<'_>, e: &BytesStart<'_>, namespace: &str) -> String {
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == namespace.as_bytes() => {
            String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
        }
        _ => FOREIGN.to_string(),
    }
}

/// Value of an attribute, unescaped.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, AuditError> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| AuditError::Xml(format!("invalid attribute: {err}")))?;
    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| AuditError::Xml(format!("invalid attribute value: {err}")))
    })
    .transpose()
}

pub(crate) fn leaf(path: &[String]) -> &str {
    path.last().map(String::as_str).unwrap_or("")
}

pub(crate) fn parent(path: &[String]) -> &str {
    ancestor(path, 1)
}

/// Name `n` levels above the current element.
pub(crate) fn ancestor(path: &[String], n: usize) -> &str {
    path.len()
        .checked_sub(n + 1)
        .map(|i| path[i].as_str())
        .unwrap_or("")
}

/// Keep the first value seen for a field.
pub(crate) fn set_once(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = Some(text.to_string());
    }
}

/// Missing or empty amount elements count as zero.
pub(crate) fn amount(slot: &Option<String>) -> Result<Decimal, AuditError> {
    parse_xml_amount(slot.as_deref().unwrap_or(""))
}

/// Strip the three-character type prefix from an `Id` attribute.
pub(crate) fn document_key(id: &str, prefix: &str) -> Option<String> {
    let key = id.trim();
    let key = key.strip_prefix(prefix).unwrap_or(key);
    (!key.is_empty()).then(|| key.to_string())
}
