//! Property tests for normalization, RUT formatting and merging.

use std::collections::HashMap;

use proptest::prelude::*;
use rayen_core::classify::{analyze_anamnesis, detect_attention_type, AttentionType};
use rayen_core::sheet::{merge_in_place, CellValue, ColumnAliases, SpreadsheetDocument, WritePolicy};
use rayen_core::text::{format_rut, normalize};

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        Just(CellValue::from("nan")),
        Just(CellValue::from(" ")),
        Just(CellValue::Number(f64::NAN)),
        "[A-Z]{1,6}".prop_map(CellValue::from),
    ]
}

fn record_strategy() -> impl Strategy<Value = HashMap<String, CellValue>> {
    (cell_strategy(), cell_strategy()).prop_map(|(sex, counseling)| {
        HashMap::from([
            ("SEXO".to_string(), sex),
            ("CONSEJERIA".to_string(), counseling),
        ])
    })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(text in "[a-zA-ZáéíóúÁÉÍÓÚñÑü \t.,-]{0,40}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_has_no_lowercase_or_accents(text in "[a-záéíóúñ ]{0,40}") {
        let out = normalize(&text);
        prop_assert!(out.chars().all(|c| c.is_ascii_uppercase() || c == ' '));
        prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
    }

    #[test]
    fn rut_keeps_digits_and_groups(body in "[1-9][0-9]{0,8}", dv in "[0-9kK]") {
        let formatted = format_rut(&format!("{body}{dv}"));
        let (grouped, check) = formatted.rsplit_once('-').unwrap();
        prop_assert_eq!(check, dv.to_uppercase());
        prop_assert_eq!(grouped.replace('.', ""), body);
        prop_assert!(grouped.split('.').skip(1).all(|g| g.len() == 3));
        // Formatting is stable.
        prop_assert_eq!(format_rut(&formatted), formatted.clone());
    }

    #[test]
    fn classifiers_never_panic(text in "\\PC{0,80}") {
        let analysis = analyze_anamnesis(&text);
        if analysis.attention_type == Some(AttentionType::NoShow) {
            prop_assert!(analysis.deficit.is_none());
        }
        let _ = detect_attention_type(&text);
    }

    #[test]
    fn merge_twice_writes_nothing(
        rows in prop::collection::vec((cell_strategy(), cell_strategy()), 0..8),
        records in prop::collection::vec(record_strategy(), 0..10),
    ) {
        let mut doc = SpreadsheetDocument::new(["SEXO", "CONSEJERÍA"]);
        for (sex, counseling) in rows {
            doc.push_row(vec![sex, counseling]);
        }
        let aliases = ColumnAliases::fill_columns();

        merge_in_place(&mut doc, &records, &aliases, WritePolicy::OnlyIfEmpty);
        let snapshot = format!("{doc:?}");
        let stats = merge_in_place(&mut doc, &records, &aliases, WritePolicy::OnlyIfEmpty);

        prop_assert_eq!(stats.total(), 0);
        prop_assert_eq!(format!("{doc:?}"), snapshot);
    }
}
