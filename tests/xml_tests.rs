//! NF-e and CT-e XML parsing through the public API.

use encoding_rs::WINDOWS_1252;
use rust_decimal_macros::dec;
use sped_auditor::xml::*;
use sped_auditor::*;

const NFE_KEY: &str = "35240312345678000195550010000012341000012345";
const CTE_KEY: &str = "35240398765432000110570010000009871000098765";

fn authorized_nfe() -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe{NFE_KEY}" versao="4.00">
      <ide><cUF>35</cUF><nNF>1234</nNF></ide>
      <emit><CNPJ>12345678000195</CNPJ><xNome><![CDATA[Indústria Alfa]]></xNome></emit>
      <dest><CNPJ>98765432000198</CNPJ><xNome>Comércio Beta</xNome></dest>
      <det nItem="1"><imposto><ICMS><ICMS00><vICMS>9.99</vICMS></ICMS00></ICMS></imposto></det>
      <total>
        <ICMSTot><vBC>1000.00</vBC><vICMS>180.00</vICMS><vProd>1000.00</vProd><vIPI>50.00</vIPI></ICMSTot>
      </total>
    </infNFe>
    <Signature xmlns="http://www.w3.org/2000/09/xmldsig#">
      <SignedInfo><Reference URI="#NFe{NFE_KEY}"/></SignedInfo>
    </Signature>
  </NFe>
  <protNFe versao="4.00"><infProt><chNFe>{NFE_KEY}</chNFe></infProt></protNFe>
</nfeProc>"##
    )
}

#[test]
fn nfe_totals_come_from_icmstot_only() {
    let doc = NfeParser.parse(&authorized_nfe()).unwrap();
    assert_eq!(doc.key, NFE_KEY);
    assert_eq!(doc.kind(), DocumentKind::Nfe);
    assert_eq!(doc.values.value(TaxField::Icms), dec!(180.00));
    assert_eq!(doc.values.value(TaxField::Ipi), dec!(50.00));
    assert_eq!(doc.issuer.name, "Indústria Alfa");
    assert_eq!(doc.recipient.name, "Comércio Beta");
}

#[test]
fn prefixed_nfe_namespace() {
    let xml = format!(
        r#"<n:NFe xmlns:n="http://www.portalfiscal.inf.br/nfe"><n:infNFe Id="NFe{NFE_KEY}"><n:total><n:ICMSTot><n:vICMS>1.00</n:vICMS></n:ICMSTot></n:total></n:infNFe></n:NFe>"#
    );
    let doc = NfeParser.parse(&xml).unwrap();
    assert_eq!(doc.values.value(TaxField::Icms), dec!(1.00));
}

#[test]
fn unprefixed_document_without_namespace_is_rejected() {
    let xml = format!(r#"<NFe><infNFe Id="NFe{NFE_KEY}"/></NFe>"#);
    assert_eq!(NfeParser.parse(&xml), None);
}

#[test]
fn truncated_document_is_rejected() {
    let xml = authorized_nfe();
    let truncated = &xml[..xml.find("</total>").unwrap()];
    assert_eq!(NfeParser.parse(truncated), None);
    assert!(NfeParser.read(truncated).is_err());
}

#[test]
fn parser_for_kind() {
    assert_eq!(parser_for(DocumentKind::Nfe).kind(), DocumentKind::Nfe);
    assert_eq!(parser_for(DocumentKind::Cte).kind(), DocumentKind::Cte);
    assert!(parser_for(DocumentKind::Cte).parse(&authorized_nfe()).is_none());
}

fn cte(payer: &str) -> String {
    format!(
        r#"<cteProc xmlns="http://www.portalfiscal.inf.br/cte" versao="4.00">
  <CTe>
    <infCte Id="CTe{CTE_KEY}" versao="4.00">
      <ide><CFOP>6353</CFOP>{payer}</ide>
      <emit><CNPJ>98765432000110</CNPJ><xNome>Transportes Gama</xNome></emit>
      <rem><CNPJ>11111111000111</CNPJ><xNome>Remetente Delta</xNome></rem>
      <receb><CPF>12345678909</CPF><xNome>Recebedor Epsilon</xNome></receb>
      <dest><CPF>98765432100</CPF><xNome>Destino Zeta</xNome></dest>
      <vPrest><vTPrest>1500.00</vTPrest><Comp><xNome>FRETE</xNome><vComp>1500.00</vComp></Comp></vPrest>
      <imp>
        <ICMS><ICMS20><CST>20</CST><pRedBC>10.00</pRedBC><vBC>1350.00</vBC><pICMS>12.00</pICMS><vICMS>162.00</vICMS></ICMS20></ICMS>
      </imp>
    </infCte>
  </CTe>
</cteProc>"#
    )
}

#[test]
fn cte_values_and_receiver_payer() {
    let doc = CteParser
        .parse(&cte("<toma3><toma>2</toma></toma3>"))
        .unwrap();
    assert_eq!(doc.key, CTE_KEY);
    assert_eq!(
        doc.values,
        XmlValues::Transport {
            service_total: dec!(1500.00),
            icms_base: dec!(1350.00),
            icms: dec!(162.00),
            icms_rate: dec!(12.00),
            cst: "20".into(),
            payer_role: PayerRole::Recebedor,
            payer_name: "Recebedor Epsilon".into(),
        }
    );
    assert_eq!(doc.issuer.name, "Transportes Gama");
    assert_eq!(doc.recipient.tax_id, "98765432100");
}

#[test]
fn cte_other_payer_is_not_identified() {
    let doc = CteParser
        .parse(&cte("<toma4><toma>4</toma></toma4>"))
        .unwrap();
    match doc.values {
        XmlValues::Transport {
            payer_role,
            ref payer_name,
            ..
        } => {
            assert_eq!(payer_role, PayerRole::NotIdentified);
            assert_eq!(payer_name, "N/A");
        }
        other => panic!("unexpected values {other:?}"),
    }
}

#[test]
fn lookup_decodes_latin1_documents() {
    let mut bytes = format!(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?><NFe xmlns="http://www.portalfiscal.inf.br/nfe"><infNFe Id="NFe{NFE_KEY}"><emit><xNome>"#
    )
    .into_bytes();
    bytes.extend_from_slice(b"Fornecedor S\xe3o Paulo");
    bytes.extend_from_slice(b"</xNome></emit></infNFe></NFe>");

    let (lookup, warnings) =
        XmlLookup::build(&NfeParser, &[SourceFile::new("latin1.xml", bytes)], WINDOWS_1252);
    assert!(warnings.is_empty());
    assert_eq!(lookup.get(NFE_KEY).unwrap().issuer.name, "Fornecedor São Paulo");
}

#[test]
fn lookup_reports_each_bad_file() {
    let files = [
        SourceFile::new("vazio.xml", ""),
        SourceFile::new("sem_chave.xml", r#"<NFe xmlns="http://www.portalfiscal.inf.br/nfe"/>"#),
        SourceFile::new("nota.xml", authorized_nfe()),
    ];
    let (lookup, warnings) = XmlLookup::build(&NfeParser, &files, WINDOWS_1252);
    assert_eq!(lookup.len(), 1);
    let names: Vec<&str> = warnings.iter().map(AuditWarning::file).collect();
    assert_eq!(names, ["vazio.xml", "sem_chave.xml"]);
}
