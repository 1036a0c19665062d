//! Property-based tests for inclusion, tolerance and grouping invariants.
//!
//! Run with: `cargo test --test proptest_tests`

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sped_auditor::audit::{classify, run_audit};
use sped_auditor::*;

/// Amount in cents, rendered the way the ledger writes it.
fn ledger_amount(cents: i64) -> String {
    format_ledger_amount(Decimal::new(cents, 2))
}

fn arb_cfop() -> impl Strategy<Value = String> {
    (1u32..=7, 100u32..=999).prop_map(|(first, rest)| format!("{first}{rest}"))
}

fn arb_invoice() -> impl Strategy<Value = (i64, i64, Vec<String>)> {
    (
        0i64..50_000,
        prop_oneof![Just(0i64), 0i64..5_000],
        prop::collection::vec(arb_cfop(), 0..4),
    )
}

fn invoice_ledger(invoices: &[(i64, i64, Vec<String>)]) -> String {
    let mut out = String::from("|0000|017|0|01032024|31032024|\n");
    for (i, (icms, ipi, cfops)) in invoices.iter().enumerate() {
        out.push_str(&format!(
            "|C100|0|1|F1|55|00|1|{i}|KEY{i}|05032024|05032024|1000,00|0|0|0|1000,00|9|0|0|0|1000,00|{}|0|0|{}|0|0|0|0|\n",
            ledger_amount(*icms),
            ledger_amount(*ipi)
        ));
        for cfop in cfops {
            out.push_str(&format!("|C170|1|P|I|1|UN|1|0|0|000|{cfop}|\n"));
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn included_invoices_are_taxed_and_inbound(
        invoices in prop::collection::vec(arb_invoice(), 0..12)
    ) {
        let ledger = SourceFile::new("sped.txt", invoice_ledger(&invoices));
        let run = run_audit(DocumentKind::Nfe, &[ledger], &[], &AuditConfig::default()).unwrap();

        let expected = invoices
            .iter()
            .filter(|(icms, ipi, cfops)| {
                (*icms > 0 || *ipi > 0) && cfops.iter().any(|c| c.starts_with(['1', '2', '3']))
            })
            .count();
        prop_assert_eq!(run.entries.len(), expected);

        for entry in &run.entries {
            let icms = entry.entity.declared.value(TaxField::Icms);
            let ipi = entry.entity.declared.value(TaxField::Ipi);
            prop_assert!(icms > Decimal::ZERO || ipi > Decimal::ZERO);
            prop_assert!(entry.entity.cfops.iter().any(|c| c.starts_with(['1', '2', '3'])));
            prop_assert_eq!(&entry.outcome, &AuditOutcome::NotFound);
        }
    }

    #[test]
    fn rerun_is_deterministic(invoices in prop::collection::vec(arb_invoice(), 0..8)) {
        let ledger = SourceFile::new("sped.txt", invoice_ledger(&invoices));
        let config = AuditConfig::default();
        let first = run_audit(DocumentKind::Nfe, std::slice::from_ref(&ledger), &[], &config).unwrap();
        let second = run_audit(DocumentKind::Nfe, &[ledger], &[], &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn cfop_list_is_sorted_and_unique(cfops in prop::collection::vec(arb_cfop(), 1..10)) {
        let ledger = SourceFile::new(
            "sped.txt",
            invoice_ledger(&[(100, 0, {
                let mut all = cfops.clone();
                all.push("1102".into());
                all
            })]),
        );
        let run = run_audit(DocumentKind::Nfe, &[ledger], &[], &AuditConfig::default()).unwrap();
        let list = run.entries[0].entity.cfop_list();
        let parts: Vec<&str> = list.split(", ").collect();
        let mut sorted = parts.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(parts, sorted);
    }

    #[test]
    fn divergence_matches_tolerance(declared in -100_000i64..100_000, xml in -100_000i64..100_000) {
        let declared = Decimal::new(declared, 3);
        let xml = Decimal::new(xml, 3);
        let diff = FieldDifference::new(TaxField::Icms, declared, xml).unwrap();
        let outcome = classify(&[diff], dec!(0.01));
        prop_assert_eq!(outcome.is_ok(), (declared - xml).abs() < dec!(0.01));
        if let AuditOutcome::Divergent(reasons) = outcome {
            let expected = if declared > xml {
                DivergenceReason::CreditExcess
            } else {
                DivergenceReason::CreditShortfall
            };
            prop_assert_eq!(reasons, vec![expected]);
        }
    }

    #[test]
    fn arbitrary_ledger_text_never_fails_the_run(text in ".{0,400}") {
        let ledger = SourceFile::new("fuzz.txt", text);
        prop_assert!(run_audit(DocumentKind::Cte, &[ledger], &[], &AuditConfig::default()).is_ok());
    }
}
