#![no_main]

use libfuzzer_sys::fuzz_target;
use sped_auditor::audit::audit_ledger_file;
use sped_auditor::xml::{CteParser, NfeParser, XmlLookup};
use sped_auditor::{AuditConfig, DocumentKind, SourceFile};

const NFE_KEY: &str = "35240311111111000111550010000010011000010010";
const CTE_KEY: &str = "35240398765432000110570010000009871000098765";

/// One document per kind with extreme amounts, so fuzzed ledgers that hit
/// these keys reach the difference arithmetic with non-zero XML values.
fn lookup() -> XmlLookup {
    let nfe = format!(
        r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe"><infNFe Id="NFe{NFE_KEY}">
<total><ICMSTot><vProd>1</vProd><vICMS>-79228162514264337593543950335</vICMS><vIPI>79228162514264337593543950335</vIPI></ICMSTot></total>
</infNFe></NFe>"#
    );
    let cte = format!(
        r#"<CTe xmlns="http://www.portalfiscal.inf.br/cte"><infCte Id="CTe{CTE_KEY}">
<vPrest><vTPrest>1</vTPrest></vPrest>
<imp><ICMS><ICMS00><CST>00</CST><vBC>-79228162514264337593543950335</vBC><pICMS>12</pICMS><vICMS>79228162514264337593543950335</vICMS></ICMS00></ICMS></imp>
</infCte></CTe>"#
    );
    [NfeParser.read(&nfe), CteParser.read(&cte)]
        .into_iter()
        .filter_map(|doc| doc.ok().flatten())
        .collect()
}

// Arbitrary bytes through decoding, period detection, grouping and
// reconciliation. Warnings are fine, panics are bugs.
fuzz_target!(|data: &[u8]| {
    let file = SourceFile::new("fuzz.txt", data);
    let lookup = lookup();
    let config = AuditConfig::default();
    for kind in [DocumentKind::Nfe, DocumentKind::Cte] {
        let _ = audit_ledger_file(kind, &file, &lookup, &config);
    }
});
