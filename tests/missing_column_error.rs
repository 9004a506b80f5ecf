//! Scenario: requesting a column path absent from the schema fails fast with
//! `ParquetError::InvalidRequest`, without ever touching the byte source.

mod common;

use parquet_read_pipeline::api::ReadRequest;
use parquet_read_pipeline::error::ParquetError;
use parquet_read_pipeline::read_column;

#[test]
fn unknown_column_name_is_rejected() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");
    let mut file = std::fs::File::open(&path).unwrap();

    let request = ReadRequest::new().with_columns(vec!["no_such_column".to_string()]);
    let err = read_column(&mut file, &request).unwrap_err();
    match err {
        ParquetError::InvalidRequest(message) => {
            assert!(message.contains("no_such_column"));
        }
        other => panic!("expected InvalidRequest, got {:?}", other),
    }
}

#[test]
fn multi_column_request_to_read_column_is_rejected() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");
    let mut file = std::fs::File::open(&path).unwrap();

    let request = ReadRequest::new().with_columns(vec!["id".to_string(), "bool_col".to_string()]);
    let err = read_column(&mut file, &request).unwrap_err();
    assert!(matches!(err, ParquetError::InvalidRequest(_)));
}
