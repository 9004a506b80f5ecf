//! Scenario: `ReadRequest::raw_dictionary` leaves dictionary-encoded values as their raw
//! indices instead of resolving them, against `alltypes_dictionary.parquet`.

mod common;

use parquet_read_pipeline::api::ReadRequest;
use parquet_read_pipeline::assemble::RowValue;
use parquet_read_pipeline::read_column;

#[test]
fn raw_dictionary_returns_indices_not_resolved_values() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_dictionary.parquet");
    if !path.is_file() {
        return;
    }

    let resolved_request = ReadRequest::new().with_columns(vec!["string_col".to_string()]);
    let mut file = std::fs::File::open(&path).unwrap();
    let resolved = read_column(&mut file, &resolved_request).unwrap();

    let raw_request = ReadRequest::new()
        .with_columns(vec!["string_col".to_string()])
        .with_raw_dictionary(true);
    let mut file = std::fs::File::open(&path).unwrap();
    let raw = read_column(&mut file, &raw_request).unwrap();

    assert_eq!(raw.len(), resolved.len());

    // every raw row is a bare dictionary index, distinct from the resolved byte value
    // it would otherwise materialize to.
    for value in &raw {
        assert!(
            matches!(value, RowValue::Int32(_) | RowValue::Null),
            "expected a raw dictionary index, got {:?}",
            value
        );
    }
    assert_ne!(raw, resolved);
}
