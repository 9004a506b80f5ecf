//! The top-level synchronous read API: plans which row groups and columns to visit,
//! drives page decompression and decoding, reassembles rows (§4.7) and applies
//! logical-type conversion (§4.5 of the design notes), and exposes the four facade
//! functions consumers are expected to call.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::sync::Arc;

use crate::assemble::{
    assemble_column, assemble_objects, assemble_rows, AssembledColumn, RowFormat, RowValue,
};
use crate::byte_source::{ByteSource, SyncByteSource};
use crate::compression::{Codec, Compression};
use crate::convert::{conversion_key, converter_for_leaf, default_converters, ConversionKey, LogicalConverter};
use crate::deserialize::{all_dictionary_values, decode_page, DecodedArray};
use crate::error::{ParquetError, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor, FileMetaData};
use crate::prefetch::PrefetchCache;
use crate::read::{read_dictionary_page_header, read_metadata, BasicDecompressor, PageReader};

/// Describes one read: which columns, which row span, and how to shape the result.
///
/// `Default` selects every column (an empty `columns` list is interpreted that way by
/// [`read`]), the full row span, `row_format: Array`, and the default converter table
/// (UTF-8 validated, everything else passed through — see [`crate::convert`]).
#[cfg_attr(
    feature = "serde_types",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct ReadRequest {
    /// First row to include, inclusive. `None` means the start of the file.
    pub row_start: Option<i64>,
    /// Last row to include, exclusive. `None` means the end of the file.
    pub row_end: Option<i64>,
    /// Dotted leaf column paths to read, in request order (e.g. `"a.b.c"`). Empty means
    /// every leaf column in the schema, in schema order.
    pub columns: Vec<String>,
    /// Shape of the assembled rows returned by [`read`] and [`read_column`].
    pub row_format: RowFormat,
    /// When set, dictionary-encoded values are left as raw indices instead of being
    /// resolved against the page dictionary.
    pub raw_dictionary: bool,
    /// When set (the default), `UTF8`/`STRING`-annotated columns are validated as text.
    pub utf8: bool,
    /// Per-[`ConversionKey`] logical-type converters, overriding [`default_converters`].
    #[cfg_attr(feature = "serde_types", serde(skip))]
    pub parsers: HashMap<ConversionKey, Box<dyn LogicalConverter>>,
    /// Per-codec decompressor overrides.
    ///
    /// Accepted and stored for forward compatibility with the request shape, but not
    /// yet consulted by the decode path, which always dispatches through
    /// [`crate::compression::create_codec`] (see `DESIGN.md`).
    #[cfg_attr(feature = "serde_types", serde(skip))]
    pub compressors: HashMap<Compression, Box<dyn Codec>>,
}

impl Default for ReadRequest {
    fn default() -> Self {
        Self {
            row_start: None,
            row_end: None,
            columns: Vec::new(),
            row_format: RowFormat::Array,
            raw_dictionary: false,
            utf8: true,
            parsers: HashMap::new(),
            compressors: HashMap::new(),
        }
    }
}

impl ReadRequest {
    /// Returns a request reading every column, in schema order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the read to `[row_start, row_end)`.
    pub fn with_row_range(mut self, row_start: i64, row_end: i64) -> Self {
        self.row_start = Some(row_start);
        self.row_end = Some(row_end);
        self
    }

    /// Restricts the read to the given dotted column paths.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Sets the shape of assembled rows.
    pub fn with_row_format(mut self, row_format: RowFormat) -> Self {
        self.row_format = row_format;
        self
    }

    /// Leaves dictionary-encoded values as raw indices rather than resolving them.
    pub fn with_raw_dictionary(mut self, raw_dictionary: bool) -> Self {
        self.raw_dictionary = raw_dictionary;
        self
    }

    /// Controls whether `UTF8`/`STRING` columns are validated as text.
    pub fn with_utf8(mut self, utf8: bool) -> Self {
        self.utf8 = utf8;
        self
    }
}

/// Identifies a single requested leaf column within the schema.
struct ResolvedColumn {
    index: usize,
    descriptor: ColumnDescriptor,
}

fn resolve_column(metadata: &FileMetaData, path: &str) -> Result<ResolvedColumn> {
    metadata
        .schema_descr()
        .columns()
        .iter()
        .enumerate()
        .find(|(_, d)| d.path().join(".") == path)
        .map(|(index, d)| ResolvedColumn {
            index,
            descriptor: d.clone(),
        })
        .ok_or_else(|| ParquetError::InvalidRequest(format!("no column named '{}' in schema", path)))
}

fn resolve_columns(metadata: &FileMetaData, request: &ReadRequest) -> Result<Vec<ResolvedColumn>> {
    if request.columns.is_empty() {
        return Ok(metadata
            .schema_descr()
            .columns()
            .iter()
            .enumerate()
            .map(|(index, d)| ResolvedColumn {
                index,
                descriptor: d.clone(),
            })
            .collect());
    }
    request
        .columns
        .iter()
        .map(|path| resolve_column(metadata, path))
        .collect()
}

/// The global row span actually covered, after clamping against `metadata.num_rows()`.
fn resolve_row_range(metadata: &FileMetaData, request: &ReadRequest) -> Result<(i64, i64)> {
    let num_rows = metadata.num_rows();
    let start = request.row_start.unwrap_or(0);
    let end = request.row_end.unwrap_or(num_rows);
    if start < 0 || end < start || end > num_rows {
        return Err(ParquetError::InvalidRequest(format!(
            "row range [{}, {}) is outside [0, {})",
            start, end, num_rows
        )));
    }
    Ok((start, end))
}

/// One selected row group, with its global row offset and the local slice of the
/// requested row range that falls inside it.
struct GroupPlan {
    row_group: usize,
    group_start: i64,
    local_start: usize,
    local_end: usize,
}

fn plan_groups(metadata: &FileMetaData, row_start: i64, row_end: i64) -> Vec<GroupPlan> {
    let mut plans = Vec::new();
    let mut group_start = 0i64;
    for (row_group, group) in metadata.row_groups.iter().enumerate() {
        let group_rows = group.num_rows();
        let group_end = group_start + group_rows;
        if group_end > row_start && group_start < row_end {
            let local_start = (row_start - group_start).max(0) as usize;
            let local_end = (row_end - group_start).min(group_rows) as usize;
            plans.push(GroupPlan {
                row_group,
                group_start,
                local_start,
                local_end,
            });
        }
        group_start = group_end;
    }
    plans
}

/// One selected column chunk's byte span within the file, computed from metadata alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRange {
    /// The requested column's dotted leaf path.
    pub path: String,
    /// Start offset of the chunk, inclusive.
    pub start_byte: u64,
    /// End offset of the chunk, exclusive.
    pub end_byte: u64,
}

/// The byte-range plan for one selected row group: one [`ColumnRange`] per requested
/// column's chunk within it.
#[derive(Debug, Clone)]
pub struct RowGroupPlan {
    pub row_group: usize,
    pub column_ranges: Vec<ColumnRange>,
}

/// The full byte-range read plan for a request: which row groups are touched, and which
/// byte ranges within them will be fetched.
///
/// Computed from `metadata` alone, without opening a reader, so a caller (or a test
/// checking plan minimality: that only bytes inside the requested row span's row groups
/// are ever planned) can inspect it ahead of any I/O.
#[derive(Debug, Clone)]
pub struct ReadPlan {
    pub groups: Vec<RowGroupPlan>,
}

/// Computes the byte-range read plan for `request` against `metadata`.
pub fn plan(metadata: &FileMetaData, request: &ReadRequest) -> Result<ReadPlan> {
    let columns = resolve_columns(metadata, request)?;
    let (row_start, row_end) = resolve_row_range(metadata, request)?;
    let groups = plan_groups(metadata, row_start, row_end)
        .into_iter()
        .map(|group_plan| {
            let group = &metadata.row_groups[group_plan.row_group];
            let column_ranges = columns
                .iter()
                .map(|c| {
                    let chunk = &group.columns()[c.index];
                    let (start, length) = chunk.byte_range();
                    ColumnRange {
                        path: c.descriptor.path().join("."),
                        start_byte: start,
                        end_byte: start + length,
                    }
                })
                .collect();
            RowGroupPlan {
                row_group: group_plan.row_group,
                column_ranges,
            }
        })
        .collect();
    Ok(ReadPlan { groups })
}

fn record_count(descriptor: &ColumnDescriptor, array: &DecodedArray) -> usize {
    if descriptor.max_rep_level() > 0 {
        array.rep_levels.iter().filter(|&&r| r == 0).count()
    } else if descriptor.max_def_level() > 0 {
        array.def_levels.len()
    } else {
        array.values.len()
    }
}

/// Reads and concatenates every page of one column chunk, invoking `on_chunk` once per
/// page with the page's global row span.
///
/// Fetches the chunk's bytes through `cache` (which plans and coalesces I/O across the
/// whole read, see [`crate::prefetch`]) rather than seeking a reader directly: the
/// resulting in-memory `Cursor` is already positioned at the chunk's own start, so
/// [`PageReader::new`] needs no further seek.
fn read_chunk<S: ByteSource>(
    cache: &PrefetchCache<S>,
    column: &ColumnChunkMetaData,
    descriptor: &ColumnDescriptor,
    raw_dictionary: bool,
    chunk_row_start: i64,
    mut on_chunk: impl FnMut(&str, &DecodedArray, i64, i64),
) -> Result<DecodedArray> {
    let path = descriptor.path().join(".");
    let (start, length) = column.byte_range();
    let bytes = cache.slice(start, start + length)?;
    let mut page_iter = PageReader::new(Cursor::new(bytes), column, Arc::new(|_, _| true), vec![]);
    let mut decompressor = BasicDecompressor::new(&mut page_iter, vec![]);
    let mut combined = DecodedArray::default();
    let mut row = chunk_row_start;
    while let Some(page) = decompressor.next()? {
        let decoded = decode_page(page, raw_dictionary)?;
        let n = record_count(descriptor, &decoded) as i64;
        on_chunk(&path, &decoded, row, row + n);
        row += n;
        combined.rep_levels.extend(decoded.rep_levels);
        combined.def_levels.extend(decoded.def_levels);
        combined.values.extend(decoded.values);
    }
    Ok(combined)
}

fn slice_rows(rows: Vec<RowValue>, local_start: usize, local_end: usize) -> Vec<RowValue> {
    rows.into_iter()
        .skip(local_start)
        .take(local_end - local_start)
        .collect()
}

/// Drives a full read: plans row groups, decodes and reassembles every requested column,
/// applies logical-type conversion, and delivers results through `on_chunk` (once per
/// decoded page) and `on_complete` (once, with the fully assembled rows in ascending
/// global row order).
///
/// `on_chunk` receives the requested column's dotted path, the page's physically-decoded
/// (pre-assembly, pre-conversion) values, and its global `[row_start, row_end)` span.
pub fn read<R: Read + Seek + Send>(
    reader: &mut R,
    request: &ReadRequest,
    on_chunk: impl FnMut(&str, &DecodedArray, i64, i64),
    mut on_complete: impl FnMut(&[Vec<RowValue>]),
) -> Result<()> {
    let metadata = read_metadata(reader)?;
    let per_column = read_assembled_columns(reader, &metadata, request, on_chunk)?;
    let schema_root = metadata.schema();

    let rows = match request.row_format {
        RowFormat::Array => assemble_rows(&per_column)?,
        RowFormat::Object => assemble_objects(schema_root, &per_column)?
            .into_iter()
            .map(|row| vec![row])
            .collect(),
    };
    on_complete(&rows);
    Ok(())
}

/// Decodes, reassembles and logically converts every requested column, trimmed to the
/// requested row span, without combining them into full rows.
fn read_assembled_columns<R: Read + Seek + Send>(
    reader: &mut R,
    metadata: &FileMetaData,
    request: &ReadRequest,
    mut on_chunk: impl FnMut(&str, &DecodedArray, i64, i64),
) -> Result<Vec<AssembledColumn>> {
    let columns = resolve_columns(metadata, request)?;
    let (row_start, row_end) = resolve_row_range(metadata, request)?;
    let groups = plan_groups(metadata, row_start, row_end);
    let default_converters = default_converters(request.utf8);
    let schema_root = metadata.schema();

    let source = SyncByteSource::new(&mut *reader)?;
    let cache = PrefetchCache::new(source);
    let ranges: Vec<(u64, u64)> = groups
        .iter()
        .flat_map(|plan| {
            let group = &metadata.row_groups[plan.row_group];
            columns.iter().map(move |c| group.columns()[c.index].byte_range())
        })
        .map(|(start, length)| (start, start + length))
        .collect();
    cache.plan(&ranges);

    let mut per_column: Vec<AssembledColumn> = columns
        .iter()
        .map(|c| AssembledColumn {
            path: c.descriptor.path().to_vec(),
            rows: Vec::new(),
        })
        .collect();

    for plan in &groups {
        let group = &metadata.row_groups[plan.row_group];
        for (i, column) in columns.iter().enumerate() {
            let chunk = &group.columns()[column.index];
            let array = read_chunk(
                &cache,
                chunk,
                &column.descriptor,
                request.raw_dictionary,
                plan.group_start,
                &mut on_chunk,
            )?;
            let assembled = assemble_column(schema_root, &column.descriptor, &array)?;
            let rows = match leaf_type(schema_root, &column.descriptor).and_then(|leaf| {
                conversion_key(leaf).map(|key| (leaf, key))
            }) {
                Some((leaf, key)) => {
                    match converter_for_leaf(leaf, key, &request.parsers, &default_converters) {
                        Some(converter) => crate::convert::apply(&converter, assembled.rows)?,
                        None => assembled.rows,
                    }
                }
                None => assembled.rows,
            };
            per_column[i]
                .rows
                .extend(slice_rows(rows, plan.local_start, plan.local_end));
        }
    }

    Ok(per_column)
}

fn leaf_type<'a>(
    schema_root: &'a crate::schema::types::ParquetType,
    descriptor: &ColumnDescriptor,
) -> Option<&'a crate::schema::types::ParquetType> {
    use crate::schema::types::ParquetType;

    let mut node = schema_root;
    for name in descriptor.path() {
        node = match node {
            ParquetType::GroupType { fields, .. } => fields.iter().find(|f| f.name() == name)?,
            ParquetType::PrimitiveType { .. } => return None,
        };
    }
    Some(node)
}

/// Reads a single column's flattened, assembled, converted values across every selected
/// row group. Fails with [`ParquetError::InvalidRequest`] unless `request.columns` names
/// exactly one column.
pub fn read_column<R: Read + Seek + Send>(reader: &mut R, request: &ReadRequest) -> Result<Vec<RowValue>> {
    if request.columns.len() != 1 {
        return Err(ParquetError::InvalidRequest(
            "read_column requires exactly one column".to_string(),
        ));
    }
    let metadata = read_metadata(reader)?;
    let mut per_column = read_assembled_columns(reader, &metadata, request, |_, _, _, _| {})?;
    Ok(per_column.remove(0).rows)
}

/// Scans row groups in order for the first chunk of `request.columns[0]` that declares a
/// dictionary page, and returns its materialized values. Returns `Ok(None)` if no row
/// group has a dictionary page for the column; fails with
/// [`ParquetError::InvalidRequest`] unless `request.columns` names exactly one column, or
/// if that column does not exist.
pub fn read_dictionary<R: Read + Seek + Send>(
    reader: &mut R,
    request: &ReadRequest,
) -> Result<Option<Vec<RowValue>>> {
    let column = single_requested_column(request)?;
    let metadata = read_metadata(reader)?;
    let resolved = resolve_column(&metadata, column)?;
    let source = SyncByteSource::new(&mut *reader)?;
    let cache = PrefetchCache::new(source);

    for group in metadata.row_groups.iter() {
        let chunk = &group.columns()[resolved.index];
        if chunk.dictionary_page_offset().is_none() {
            continue;
        }
        let (start, length) = chunk.byte_range();
        let bytes = cache.slice(start, start + length)?;
        let mut page_iter = PageReader::new(Cursor::new(bytes), chunk, Arc::new(|_, _| true), vec![]);
        let mut decompressor = BasicDecompressor::new(&mut page_iter, vec![]);
        if let Some(page) = decompressor.next()? {
            let dict = page.dictionary_page().ok_or_else(|| {
                ParquetError::CorruptPage(
                    "column chunk declares a dictionary page but no page attached one".to_string(),
                )
            })?;
            let values = all_dictionary_values(dict.as_ref(), resolved.descriptor.physical_type())?;
            return Ok(Some(values.into_iter().map(RowValue::from).collect()));
        }
    }
    Ok(None)
}

/// Dictionary-count fast path: a dictionary page header is a handful of thrift fields, so
/// a bounded prefix fetch almost always suffices to parse it. Retries with the whole
/// chunk if the header turns out to straddle the boundary.
const DICTIONARY_HEADER_FAST_PATH_BYTES: u64 = 256;

/// As [`read_dictionary`], but parses only the dictionary page header and returns its
/// declared `num_values` instead of decoding the page body.
pub fn read_dictionary_count<R: Read + Seek + Send>(
    reader: &mut R,
    request: &ReadRequest,
) -> Result<Option<usize>> {
    let column = single_requested_column(request)?;
    let metadata = read_metadata(reader)?;
    let resolved = resolve_column(&metadata, column)?;
    let source = SyncByteSource::new(&mut *reader)?;

    for group in metadata.row_groups.iter() {
        let chunk = &group.columns()[resolved.index];
        if chunk.dictionary_page_offset().is_none() {
            continue;
        }
        let (start, length) = chunk.byte_range();
        let window = DICTIONARY_HEADER_FAST_PATH_BYTES.min(length);
        let prefix = source.slice(start, start + window)?;
        let header = read_dictionary_page_header(&mut Cursor::new(prefix));
        let count = match header {
            Ok(count) => count,
            Err(_) if window < length => {
                log::debug!(
                    "dictionary header for '{}' did not fit in {} bytes, retrying with the full chunk",
                    resolved.descriptor.path().join("."),
                    window
                );
                let full = source.slice(start, start + length)?;
                read_dictionary_page_header(&mut Cursor::new(full))?
            }
            Err(e) => return Err(e),
        };
        if let Some(count) = count {
            return Ok(Some(count as usize));
        }
    }
    Ok(None)
}

fn single_requested_column(request: &ReadRequest) -> Result<&str> {
    if request.columns.len() != 1 {
        return Err(ParquetError::InvalidRequest(
            "this operation requires exactly one column".to_string(),
        ));
    }
    Ok(&request.columns[0])
}
