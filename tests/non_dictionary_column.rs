//! Scenario: reading a single plain-encoded (non-dictionary) column end to end through
//! `read_column`, against `alltypes_plain.parquet` (the same fixture the teacher's own
//! integration suite reads `id`/`bool_col`/... from).

mod common;

use parquet_read_pipeline::api::ReadRequest;
use parquet_read_pipeline::assemble::RowValue;
use parquet_read_pipeline::{read_column, read_dictionary};

#[test]
fn id_column_is_plain_encoded_and_reads_every_row() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");
    let mut file = std::fs::File::open(&path).unwrap();

    let request = ReadRequest::new().with_columns(vec!["id".to_string()]);
    let rows = read_column(&mut file, &request).unwrap();

    // alltypes_plain.parquet has 8 rows, well known across the parquet-testing corpus.
    assert_eq!(rows.len(), 8);
    assert_eq!(
        rows,
        vec![4, 5, 6, 7, 2, 3, 0, 1]
            .into_iter()
            .map(RowValue::Int32)
            .collect::<Vec<_>>()
    );

    // id is plain-encoded: no row group carries a dictionary page for it.
    let mut file = std::fs::File::open(&path).unwrap();
    let dict = read_dictionary(&mut file, &request).unwrap();
    assert_eq!(dict, None);
}
