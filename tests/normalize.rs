use ingest::IngestError;
use ingest::normalize::{NormalizeOptions, NormalizePlan, normalize_table};

mod common;

use common::{rows, strings};

#[test]
fn identity_normalization_without_schema_or_map() {
    let input = rows(&[&[" Order ID", "Order_ID", "Amount "], &[" 7 ", "8", "1.50\t"]]);
    let options = NormalizeOptions::parse(None, None, false).expect("options");
    let output = normalize_table(&input, &options).expect("normalize");
    assert_eq!(
        output,
        rows(&[&["order id", "order id_2", "amount"], &["7", "8", "1.50"]])
    );
}

#[test]
fn empty_map_leaves_canonical_headers() {
    let input = rows(&[&["A", "a", "B_c"], &["1", "2", "3"]]);
    let options = NormalizeOptions::parse(Some(""), None, false).expect("options");
    let output = normalize_table(&input, &options).expect("normalize");
    assert_eq!(output[0], strings(&["a", "a_2", "b c"]));
}

#[test]
fn rename_keeps_column_order() {
    let input = rows(&[&["a", "c"], &["1", "2"]]);
    let options = NormalizeOptions::parse(Some("a=b"), None, false).expect("options");
    let output = normalize_table(&input, &options).expect("normalize");
    assert_eq!(output, rows(&[&["b", "c"], &["1", "2"]]));
}

#[test]
fn schema_reorders_and_fills_unsourced_columns() {
    let input = rows(&[
        &["Txn Date", "Amount", "Memo"],
        &["2024-01-02", " 10 ", "coffee"],
        &["2024-01-03"],
    ]);
    let options =
        NormalizeOptions::parse(Some("txn_date=date"), Some("id, Date ,amount"), false)
            .expect("options");
    let plan = NormalizePlan::build(&input[0], &options).expect("plan");
    assert_eq!(plan.unresolved(), vec!["id"]);

    let output = normalize_table(&input, &options).expect("normalize");
    assert_eq!(
        output,
        rows(&[
            &["id", "date", "amount"],
            &["", "2024-01-02", "10"],
            &["", "2024-01-03", ""],
        ])
    );
}

#[test]
fn strict_schema_fails_before_projecting() {
    let input = rows(&[&["date", "amount"], &["2024-01-02", "10"]]);
    let options = NormalizeOptions::parse(None, Some("id,date,amount,memo"), true).expect("options");
    let err = normalize_table(&input, &options).expect_err("strict failure");
    match err {
        IngestError::StrictSource { missing } => assert_eq!(missing, strings(&["id", "memo"])),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strict_without_schema_is_ignored() {
    let input = rows(&[&["a"], &["1"]]);
    let options = NormalizeOptions::parse(None, None, true).expect("options");
    assert_eq!(normalize_table(&input, &options).expect("normalize").len(), 2);
}

#[test]
fn colliding_renames_keep_first_column_values() {
    let input = rows(&[&["a", "b"], &["first", "second"]]);
    let options = NormalizeOptions::parse(Some("a=x,b=x"), None, false).expect("options");
    let plan = NormalizePlan::build(&input[0], &options).expect("plan");
    assert_eq!(plan.sources().get("x"), Some(0));
    assert_eq!(plan.output_headers(), strings(&["x", "x_2"]));
    assert_eq!(plan.project(&input[1]), strings(&["first", ""]));
}

#[test]
fn malformed_map_and_empty_schema_fail_to_parse() {
    assert!(matches!(
        NormalizeOptions::parse(Some("a-b"), None, false),
        Err(IngestError::MalformedRename { .. })
    ));
    assert!(matches!(
        NormalizeOptions::parse(None, Some(" , "), false),
        Err(IngestError::EmptySchema { .. })
    ));
}

#[test]
fn empty_table_normalizes_to_nothing() {
    let options = NormalizeOptions::default();
    assert!(normalize_table(&[], &options).expect("normalize").is_empty());
}
