//! Audit a ledger against XML documents and print the report as CSV.
//!
//! ```text
//! cargo run --example audit_run                       # built-in sample
//! cargo run --example audit_run -- cte efd.txt a.xml  # your files
//! RUST_LOG=sped_auditor=debug cargo run --example audit_run
//! ```

use sped_auditor::audit::run_audit;
use sped_auditor::report::ReportTable;
use sped_auditor::*;
use tracing_subscriber::EnvFilter;

const SAMPLE_LEDGER: &str = "\
|0000|017|0|01032024|31032024|EMPRESA EXEMPLO LTDA|12345678000195||SP|
|C100|0|1|F1|55|00|1|1001|35240311111111000111550010000010011000010010|05032024|05032024|1000,00|0|0|0|1000,00|9|0|0|0|1000,00|120,00|0|0|0,00|0|0|0|0|
|C170|1|P1|Insumo|1|UN|1000,00|0|0|000|1102|
|C100|0|1|F2|55|00|1|1002|35240322222222000122550010000010021000010020|07032024|07032024|500,00|0|0|0|500,00|9|0|0|0|500,00|90,00|0|0|10,00|0|0|0|0|
|C170|1|P2|Peca|1|UN|500,00|0|0|000|2102|
|C100|0|1|F3|55|00|1|1003|35240333333333000133550010000010031000010030|09032024|09032024|300,00|0|0|0|300,00|9|0|0|0|300,00|36,00|0|0|0,00|0|0|0|0|
|C170|1|P3|Revenda|1|UN|300,00|0|0|000|5102|
|C100|0|1|F4|55|00|1|1004|35240344444444000144550010000010041000010040|12032024|12032024|200,00|0|0|0|200,00|9|0|0|0|200,00|24,00|0|0|0,00|0|0|0|0|
|C170|1|P4|Insumo|1|UN|200,00|0|0|000|1101|
|C100|0|1|
";

const SAMPLE_XMLS: [(&str, &str); 2] = [
    (
        "nfe_1001.xml",
        r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe"><NFe><infNFe Id="NFe35240311111111000111550010000010011000010010">
<emit><CNPJ>11111111000111</CNPJ><xNome>Fornecedor A</xNome></emit>
<dest><CNPJ>12345678000195</CNPJ><xNome>Empresa Exemplo Ltda</xNome></dest>
<total><ICMSTot><vProd>1000.00</vProd><vICMS>120.00</vICMS><vIPI>0.00</vIPI></ICMSTot></total>
</infNFe></NFe></nfeProc>"#,
    ),
    (
        "nfe_1002.xml",
        r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe"><infNFe Id="NFe35240322222222000122550010000010021000010020">
<emit><CNPJ>22222222000122</CNPJ><xNome>Fornecedor B</xNome></emit>
<dest><CNPJ>12345678000195</CNPJ><xNome>Empresa Exemplo Ltda</xNome></dest>
<total><ICMSTot><vProd>500.00</vProd><vICMS>60.00</vICMS><vIPI>10.00</vIPI></ICMSTot></total>
</infNFe></NFe>"#,
    ),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sped_auditor=info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (kind, ledgers, xmls): (DocumentKind, Vec<SourceFile>, Vec<SourceFile>) = match args.split_first() {
        Some((kind, paths)) if !paths.is_empty() => {
            let kind = match kind.as_str() {
                "cte" => DocumentKind::Cte,
                _ => DocumentKind::Nfe,
            };
            let (ledger, xmls) = paths.split_first().expect("at least one path");
            let ledgers = vec![SourceFile::from_path(ledger).expect("ledger readable")];
            let xmls = xmls
                .iter()
                .map(|p| SourceFile::from_path(p).expect("XML readable"))
                .collect();
            (kind, ledgers, xmls)
        }
        _ => (
            DocumentKind::Nfe,
            vec![SourceFile::new("sped_marco.txt", SAMPLE_LEDGER)],
            SAMPLE_XMLS
                .iter()
                .map(|(name, xml)| SourceFile::new(*name, *xml))
                .collect(),
        ),
    };

    let run = run_audit(kind, &ledgers, &xmls, &AuditConfig::default()).expect("audit runs");
    if run.is_empty() {
        println!("Nenhuma nota atende aos critérios.");
    }

    let report = ReportTable::from_run(&run);
    println!("=== {} ===", report.sheet_name());
    print!("{}", report.to_csv());
    if !report.warnings.is_empty() {
        println!("=== Avisos ===");
        print!("{}", report.warnings_csv());
    }
    println!(
        "OK: {}  Divergentes: {}  Sem XML: {}",
        run.ok_count(),
        run.divergent_count(),
        run.not_found_count()
    );
}
