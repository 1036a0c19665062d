//! NF-e and CT-e XML parsing.
//!
//! Both parsers walk the document with a namespace-aware reader and only
//! match elements of their own schema namespace, so embedded signatures and
//! foreign extensions are ignored. Missing numeric elements read as zero and
//! missing identity elements as `N/A`.
//!
//! ```
//! use sped_auditor::xml::{DocumentParser, NfeParser};
//!
//! let xml = r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe">
//!   <infNFe Id="NFe35240312345678000195550010000012341000012345">
//!     <total><ICMSTot><vICMS>18.00</vICMS></ICMSTot></total>
//!   </infNFe>
//! </NFe>"#;
//! let doc = NfeParser.parse(xml).unwrap();
//! assert_eq!(doc.key, "35240312345678000195550010000012341000012345");
//! ```

mod cte;
mod lookup;
mod nfe;
mod reader;

pub use cte::CteParser;
pub use lookup::XmlLookup;
pub use nfe::NfeParser;

use crate::core::{DocumentKind, XmlDocument};

/// Parses one kind of fiscal XML document.
pub trait DocumentParser {
    /// Document kind produced by this parser.
    fn kind(&self) -> DocumentKind;

    /// Parse a document. Returns `None` for malformed XML, an unparseable
    /// amount, or a document without access key.
    fn parse(&self, xml: &str) -> Option<XmlDocument>;
}

/// The parser for a document kind.
pub fn parser_for(kind: DocumentKind) -> &'static dyn DocumentParser {
    match kind {
        DocumentKind::Nfe => &NfeParser,
        DocumentKind::Cte => &CteParser,
    }
}
