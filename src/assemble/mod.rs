//! Reconstructs nested row records from per-column repetition/definition level and
//! value streams (Dremel reconstruction), walking the schema tree the same way
//! [`crate::metadata::SchemaDescriptor`] does when it builds each column's levels.

use crate::deserialize::{DecodedArray, Value};
use crate::error::{ParquetError, Result};
use crate::metadata::ColumnDescriptor;
use crate::schema::types::{ParquetType, Repetition};

/// Desired shape of assembled rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde_types",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub enum RowFormat {
    /// A positional tuple over the requested columns, in request order.
    Array,
    /// A keyed map matching the schema's field names.
    Object,
}

/// The declared unit of a converted `TIMESTAMP_MILLIS`/`TIMESTAMP_MICROS` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde_types",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub enum TimeUnit {
    Millis,
    Micros,
}

/// A materialized row value, after Dremel reconstruction and before logical-type conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96([u32; 3]),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    /// A `DECIMAL`-converted value: the unscaled signed integer and the schema's declared
    /// scale (see [`crate::convert`]).
    Decimal(i128, i32),
    /// A `TIMESTAMP_MILLIS`/`TIMESTAMP_MICROS`-converted value: the epoch count and its unit.
    Timestamp(i64, TimeUnit),
    List(Vec<RowValue>),
    Object(Vec<(String, RowValue)>),
}

impl From<Value> for RowValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Boolean(b) => RowValue::Boolean(b),
            Value::Int32(i) => RowValue::Int32(i),
            Value::Int64(i) => RowValue::Int64(i),
            Value::Int96(i) => RowValue::Int96(i),
            Value::Float(f) => RowValue::Float(f),
            Value::Double(f) => RowValue::Double(f),
            Value::ByteArray(b) | Value::FixedLenByteArray(b) => RowValue::Bytes(b),
        }
    }
}

struct PathStep {
    repetition: Repetition,
    /// cumulative max definition level through (and including) this step.
    def_level: i16,
}

/// Walks `schema_root` along `descriptor.path()`, collecting each step's repetition kind
/// and cumulative definition level. Mirrors `metadata::schema_descriptor::build_tree`.
fn path_steps(schema_root: &ParquetType, descriptor: &ColumnDescriptor) -> Result<Vec<PathStep>> {
    let mut steps = Vec::with_capacity(descriptor.path().len());
    let mut node = schema_root;
    let mut def_level = 0i16;
    for name in descriptor.path() {
        let next = match node {
            ParquetType::GroupType { fields, .. } => fields.iter().find(|f| f.name() == name),
            ParquetType::PrimitiveType { .. } => None,
        }
        .ok_or_else(|| {
            ParquetError::CorruptMetadata(format!(
                "column path segment '{}' does not exist under its parent group",
                name
            ))
        })?;
        let repetition = *next.get_basic_info().repetition();
        if let Repetition::Optional | Repetition::Repeated = repetition {
            def_level += 1;
        }
        steps.push(PathStep { repetition, def_level });
        node = next;
    }
    Ok(steps)
}

/// A single requested column's per-row reconstructed values.
///
/// `rows[i]` is the value of the `i`-th top-level record: `RowValue::Null` or a scalar for
/// a column with no repeated ancestor, or nested `RowValue::List`s as deep as the column
/// has repeated ancestors (`LIST<T>` nests once, `LIST<LIST<T>>` nests twice, and so on).
pub struct AssembledColumn {
    pub path: Vec<String>,
    pub rows: Vec<RowValue>,
}

/// Pushes `value` into the container one level above `depth` (`depth - 1`): the row
/// itself when `depth == 1`, otherwise the still-open list at `depth - 1`.
fn push_into_parent(rows: &mut Vec<RowValue>, open: &mut [Option<Vec<RowValue>>], depth: usize, value: RowValue) {
    if depth == 0 {
        rows.push(value);
    } else {
        open[depth - 1]
            .as_mut()
            .expect("a container's parent is still open when the container closes")
            .push(value);
    }
}

/// Reassembles one column's flattened level/value streams (already concatenated across
/// every page read for the request) into one [`RowValue`] per top-level record, via a
/// Dremel state machine generalized to an arbitrary number of repeated ancestors.
///
/// `open[d]` (0-indexed) tracks the list currently being built at repetition depth `d + 1`:
/// each entry's repetition level `r` tells us how many of those lists continue (`1..=r`)
/// versus close (`r+1..=max_rep_level`, finalized into their parent, deepest first) before
/// the entry's definition level `d` tells us how much deeper the new structure goes —
/// `d == max_def_level` reaches an actual leaf value, a threshold matched exactly means a
/// present-but-empty list at that depth, and anything short of a depth's threshold means
/// everything from there down is null.
pub fn assemble_column(
    schema_root: &ParquetType,
    descriptor: &ColumnDescriptor,
    array: &DecodedArray,
) -> Result<AssembledColumn> {
    let path = descriptor.path().to_vec();
    let max_def_level = descriptor.max_def_level();
    let max_rep_level = descriptor.max_rep_level();

    if max_rep_level == 0 {
        // No repeated ancestor: every slot is its own record.
        let rows = if max_def_level == 0 {
            array.values.iter().cloned().map(RowValue::from).collect()
        } else {
            let mut values = array.values.iter();
            array
                .def_levels
                .iter()
                .map(|&d| {
                    if d == max_def_level {
                        RowValue::from(values.next().cloned().expect(
                            "a fully-defined slot must have a corresponding materialized value",
                        ))
                    } else {
                        RowValue::Null
                    }
                })
                .collect()
        };
        return Ok(AssembledColumn { path, rows });
    }

    let steps = path_steps(schema_root, descriptor)?;
    let thresholds: Vec<i16> = steps
        .iter()
        .filter(|s| s.repetition == Repetition::Repeated)
        .map(|s| s.def_level)
        .collect();
    if thresholds.len() != max_rep_level as usize {
        return Err(ParquetError::CorruptMetadata(format!(
            "column '{}' declares max_rep_level={} but its path has {} repeated steps",
            path.join("."),
            max_rep_level,
            thresholds.len()
        )));
    }
    let k = max_rep_level as usize;

    let mut rows = Vec::new();
    let mut open: Vec<Option<Vec<RowValue>>> = vec![None; k];
    let mut values = array.values.iter();

    for (i, &d) in array.def_levels.iter().enumerate() {
        let r = array.rep_levels[i] as usize;

        // Close every list deeper than this entry continues, deepest first.
        for depth in (r + 1..=k).rev() {
            if let Some(list) = open[depth - 1].take() {
                push_into_parent(&mut rows, &mut open, depth - 1, RowValue::List(list));
            }
        }

        if r == 0 && d < thresholds[0] {
            // the whole record is absent: no ancestor list exists at all.
            rows.push(RowValue::Null);
            continue;
        }

        let mut appended = false;
        for depth in (r + 1)..=k {
            let threshold = thresholds[depth - 1];
            if d < threshold {
                // everything from `depth` down is null for this element.
                push_into_parent(&mut rows, &mut open, depth - 1, RowValue::Null);
                appended = true;
                break;
            }
            open[depth - 1] = Some(Vec::new());
            if d == threshold {
                // present but empty at `depth`; nothing to append below it yet.
                appended = true;
                break;
            }
        }
        if !appended {
            // walked past every threshold: this entry is an actual leaf slot.
            let value = if d == max_def_level {
                RowValue::from(
                    values.next().cloned().expect(
                        "a fully-defined slot must have a corresponding materialized value",
                    ),
                )
            } else {
                RowValue::Null
            };
            open[k - 1]
                .as_mut()
                .expect("the deepest list is open when appending a leaf value")
                .push(value);
        }
    }
    for depth in (1..=k).rev() {
        if let Some(list) = open[depth - 1].take() {
            push_into_parent(&mut rows, &mut open, depth - 1, RowValue::List(list));
        }
    }

    Ok(AssembledColumn { path, rows })
}

/// Combines already-assembled columns into full rows.
///
/// For [`RowFormat::Array`], each row is a positional [`RowValue::List`] over `columns` in
/// order. For [`RowFormat::Object`], columns are grouped by their shared path prefixes into
/// nested [`RowValue::Object`]s; two requested columns sharing a *repeated* group ancestor
/// are rejected, since merging them in lockstep is not supported (see `DESIGN.md`).
pub fn assemble_rows(columns: &[AssembledColumn]) -> Result<Vec<Vec<RowValue>>> {
    let num_rows = columns.first().map(|c| c.rows.len()).unwrap_or(0);
    for column in columns {
        if column.rows.len() != num_rows {
            return Err(ParquetError::CorruptMetadata(format!(
                "column '{}' produced {} rows but column '{}' produced {}",
                column.path.join("."),
                column.rows.len(),
                columns[0].path.join("."),
                num_rows
            )));
        }
    }
    Ok((0..num_rows)
        .map(|i| columns.iter().map(|c| c.rows[i].clone()).collect())
        .collect())
}

/// Nests `columns` (each a requested leaf's assembled rows) into one [`RowValue::Object`]
/// per row, keyed by the schema's field names along each column's path.
pub fn assemble_objects(
    schema_root: &ParquetType,
    columns: &[AssembledColumn],
) -> Result<Vec<RowValue>> {
    let num_rows = columns.first().map(|c| c.rows.len()).unwrap_or(0);
    reject_shared_repeated_ancestors(schema_root, columns)?;
    let mut rows = Vec::with_capacity(num_rows);
    for i in 0..num_rows {
        let entries: Vec<(Vec<String>, RowValue)> = columns
            .iter()
            .map(|c| (c.path.clone(), c.rows[i].clone()))
            .collect();
        rows.push(nest(&entries));
    }
    Ok(rows)
}

fn reject_shared_repeated_ancestors(
    schema_root: &ParquetType,
    columns: &[AssembledColumn],
) -> Result<()> {
    for a in columns {
        for b in columns {
            if a.path == b.path {
                continue;
            }
            let shared_len = a
                .path
                .iter()
                .zip(b.path.iter())
                .take_while(|(x, y)| x == y)
                .count();
            if shared_len == 0 {
                continue;
            }
            let mut node = schema_root;
            for name in &a.path[..shared_len] {
                node = match node {
                    ParquetType::GroupType { fields, .. } => {
                        fields.iter().find(|f| f.name() == name).unwrap()
                    }
                    ParquetType::PrimitiveType { .. } => break,
                };
                if *node.get_basic_info().repetition() == Repetition::Repeated {
                    return Err(ParquetError::UnsupportedFeature(format!(
                        "columns '{}' and '{}' share a repeated ancestor group '{}'; object assembly across a shared repeated group is not supported",
                        a.path.join("."),
                        b.path.join("."),
                        name
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Groups flat `(path, value)` entries that share a common leading path segment into
/// one nested [`RowValue::Object`], recursively.
fn nest(entries: &[(Vec<String>, RowValue)]) -> RowValue {
    let mut fields: Vec<(String, Vec<(Vec<String>, RowValue)>)> = Vec::new();
    for (path, value) in entries {
        if path.len() == 1 {
            fields.push((path[0].clone(), vec![(vec![], value.clone())]));
            continue;
        }
        let head = &path[0];
        let rest = path[1..].to_vec();
        if let Some((_, group)) = fields.iter_mut().find(|(name, _)| name == head) {
            group.push((rest, value.clone()));
        } else {
            fields.push((head.clone(), vec![(rest, value.clone())]));
        }
    }
    RowValue::Object(
        fields
            .into_iter()
            .map(|(name, group)| {
                let value = if group.len() == 1 && group[0].0.is_empty() {
                    group.into_iter().next().unwrap().1
                } else {
                    nest(&group)
                };
                (name, value)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::PhysicalType;

    fn leaf_descriptor(path: &[&str], max_def: i16, max_rep: i16) -> ColumnDescriptor {
        let primitive = ParquetType::from_physical(
            path.last().unwrap().to_string(),
            PhysicalType::Int32,
        );
        ColumnDescriptor::new(
            primitive,
            max_def,
            max_rep,
            path.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn assembles_required_scalar() {
        let descriptor = leaf_descriptor(&["a"], 0, 0);
        let array = DecodedArray {
            rep_levels: vec![],
            def_levels: vec![],
            values: vec![Value::Int32(1), Value::Int32(2)],
        };
        let root = ParquetType::new_root("root".to_string(), vec![]);
        let assembled = assemble_column(&root, &descriptor, &array).unwrap();
        assert_eq!(assembled.rows, vec![RowValue::Int32(1), RowValue::Int32(2)]);
    }

    #[test]
    fn assembles_optional_scalar_with_nulls() {
        let descriptor = leaf_descriptor(&["a"], 1, 0);
        let array = DecodedArray {
            rep_levels: vec![],
            def_levels: vec![1, 0, 1],
            values: vec![Value::Int32(1), Value::Int32(2)],
        };
        let root = ParquetType::new_root("root".to_string(), vec![]);
        let assembled = assemble_column(&root, &descriptor, &array).unwrap();
        assert_eq!(
            assembled.rows,
            vec![RowValue::Int32(1), RowValue::Null, RowValue::Int32(2)]
        );
    }

    /// `a` (repeated) -> `b` (repeated) -> `c` (optional Int32): a `LIST<LIST<INT32>>`.
    fn nested_list_schema_and_descriptor() -> (ParquetType, ColumnDescriptor) {
        let leaf = ParquetType::try_from_primitive(
            "c".to_string(),
            PhysicalType::Int32,
            Repetition::Optional,
            None,
            None,
            None,
        )
        .unwrap();
        let b = ParquetType::from_converted(
            "b".to_string(),
            vec![leaf],
            Some(Repetition::Repeated),
            None,
            None,
        );
        let a = ParquetType::from_converted(
            "a".to_string(),
            vec![b],
            Some(Repetition::Repeated),
            None,
            None,
        );
        let root = ParquetType::new_root("root".to_string(), vec![a]);
        let descriptor = ColumnDescriptor::new(
            ParquetType::from_physical("c".to_string(), PhysicalType::Int32),
            3,
            2,
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        );
        (root, descriptor)
    }

    #[test]
    fn assembles_doubly_nested_lists() {
        let (root, descriptor) = nested_list_schema_and_descriptor();
        // row0 = [[1, 2], [3]], row1 = [], row2 = [[], [4]]
        let array = DecodedArray {
            rep_levels: vec![0, 2, 1, 0, 0, 1],
            def_levels: vec![3, 3, 3, 1, 2, 3],
            values: vec![
                Value::Int32(1),
                Value::Int32(2),
                Value::Int32(3),
                Value::Int32(4),
            ],
        };
        let assembled = assemble_column(&root, &descriptor, &array).unwrap();
        assert_eq!(
            assembled.rows,
            vec![
                RowValue::List(vec![
                    RowValue::List(vec![RowValue::Int32(1), RowValue::Int32(2)]),
                    RowValue::List(vec![RowValue::Int32(3)]),
                ]),
                RowValue::List(vec![]),
                RowValue::List(vec![
                    RowValue::List(vec![]),
                    RowValue::List(vec![RowValue::Int32(4)]),
                ]),
            ]
        );
    }
}
