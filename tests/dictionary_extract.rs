//! Scenario: extracting a dictionary page's materialized values from a dictionary-encoded
//! column, against `alltypes_dictionary.parquet`.

mod common;

use parquet_read_pipeline::api::ReadRequest;
use parquet_read_pipeline::{read_dictionary, read_dictionary_count};

#[test]
fn string_col_dictionary_resolves_to_materialized_values() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_dictionary.parquet");
    if !path.is_file() {
        return;
    }

    let request = ReadRequest::new().with_columns(vec!["string_col".to_string()]);

    let mut file = std::fs::File::open(&path).unwrap();
    let values = read_dictionary(&mut file, &request)
        .unwrap()
        .expect("string_col is dictionary-encoded in alltypes_dictionary.parquet");
    assert!(!values.is_empty());

    let mut file = std::fs::File::open(&path).unwrap();
    let count = read_dictionary_count(&mut file, &request).unwrap().unwrap();
    assert_eq!(count, values.len());
}
