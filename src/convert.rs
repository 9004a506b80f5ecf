//! Converts physically-decoded [`RowValue`]s into their logical representation, keyed by
//! the leaf's converted/logical type. Mirrors the physical decoder's dispatch-by-enum
//! style (`deserialize::*`) rather than introducing an open visitor hierarchy.

use std::collections::HashMap;

use crate::assemble::{RowValue, TimeUnit};
use crate::error::Result;
use crate::schema::types::{ParquetType, PrimitiveConvertedType};

/// Identifies a logical conversion independently of whether the file annotated the
/// column via the legacy `ConvertedType` or the newer `LogicalType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKey {
    Utf8,
    Decimal,
    Date,
    TimestampMillis,
    TimestampMicros,
    Json,
    Bson,
    Interval,
}

/// Reads the conversion this leaf declares, if any.
pub fn conversion_key(leaf: &ParquetType) -> Option<ConversionKey> {
    match leaf.converted_type() {
        Some(PrimitiveConvertedType::Utf8) => Some(ConversionKey::Utf8),
        Some(PrimitiveConvertedType::Decimal(..)) => Some(ConversionKey::Decimal),
        Some(PrimitiveConvertedType::Date) => Some(ConversionKey::Date),
        Some(PrimitiveConvertedType::TimestampMillis) => Some(ConversionKey::TimestampMillis),
        Some(PrimitiveConvertedType::TimestampMicros) => Some(ConversionKey::TimestampMicros),
        Some(PrimitiveConvertedType::Json) => Some(ConversionKey::Json),
        Some(PrimitiveConvertedType::Bson) => Some(ConversionKey::Bson),
        Some(PrimitiveConvertedType::Interval) => Some(ConversionKey::Interval),
        _ => None,
    }
}

/// Converts a single physically-decoded value according to `key`.
pub trait LogicalConverter: Send + Sync {
    fn convert(&self, value: RowValue) -> Result<RowValue>;
}

/// `UTF8`/`STRING`-annotated `BYTE_ARRAY` columns are kept as raw bytes: validated UTF-8
/// text still round-trips as `RowValue::Bytes`, and the `utf8` flag only controls whether
/// this converter is installed at all. A caller that needs `&str` validates at the
/// boundary (see `ReadRequest::utf8` in `api.rs`).
struct Utf8Converter;

impl LogicalConverter for Utf8Converter {
    fn convert(&self, value: RowValue) -> Result<RowValue> {
        match &value {
            RowValue::Bytes(b) => {
                std::str::from_utf8(b).map_err(|e| {
                    crate::error::ParquetError::UnsupportedFeature(format!(
                        "invalid utf-8 in STRING column: {}",
                        e
                    ))
                })?;
                Ok(value)
            }
            _ => Ok(value),
        }
    }
}

/// Passed through unconverted: `JSON`/`BSON` stay raw bytes for a caller to parse, `DATE`
/// stays a plain `INT32` day count, and `INTERVAL` stays its raw 12-byte encoding, since
/// none of them need the leaf's schema metadata the way `DECIMAL`/`TIMESTAMP_*` do.
struct PassthroughConverter;

impl LogicalConverter for PassthroughConverter {
    fn convert(&self, value: RowValue) -> Result<RowValue> {
        Ok(value)
    }
}

/// Interprets a big-endian two's-complement `BYTE_ARRAY`/`FIXED_LEN_BYTE_ARRAY` (or a
/// plain `INT32`/`INT64`) as the unscaled integer of a `DECIMAL(precision, scale)` column.
///
/// Constructed per-column in `api.rs` rather than shared through [`default_converters`],
/// since `scale` is schema metadata, not something a single stateless converter can know.
pub(crate) struct DecimalConverter {
    scale: i32,
}

impl DecimalConverter {
    pub(crate) fn new(scale: i32) -> Self {
        Self { scale }
    }
}

fn decode_big_endian_signed(bytes: &[u8]) -> i128 {
    let mut value: i128 = if bytes.first().map_or(false, |b| b & 0x80 != 0) {
        -1
    } else {
        0
    };
    for &b in bytes {
        value = (value << 8) | b as i128;
    }
    value
}

impl LogicalConverter for DecimalConverter {
    fn convert(&self, value: RowValue) -> Result<RowValue> {
        let unscaled = match value {
            RowValue::Bytes(ref b) => decode_big_endian_signed(b),
            RowValue::Int32(i) => i as i128,
            RowValue::Int64(i) => i as i128,
            other => return Ok(other),
        };
        Ok(RowValue::Decimal(unscaled, self.scale))
    }
}

/// Reinterprets an `INT64` physical value as an epoch timestamp in `unit`.
struct TimestampConverter {
    unit: TimeUnit,
}

impl LogicalConverter for TimestampConverter {
    fn convert(&self, value: RowValue) -> Result<RowValue> {
        match value {
            RowValue::Int64(epoch) => Ok(RowValue::Timestamp(epoch, self.unit)),
            other => Ok(other),
        }
    }
}

/// Builds the default conversion table. `utf8` controls whether `UTF8`/`STRING`-annotated
/// columns are treated as text (mirroring `ReadRequest::utf8`, which defaults to `true`).
///
/// `DECIMAL` is deliberately absent here: its conversion needs the column's declared
/// scale, which this table has no way to carry, so `api.rs` builds a [`DecimalConverter`]
/// per column instead (see `converter_for_leaf`).
pub fn default_converters(utf8: bool) -> HashMap<ConversionKey, Box<dyn LogicalConverter>> {
    let mut table: HashMap<ConversionKey, Box<dyn LogicalConverter>> = HashMap::new();
    if utf8 {
        table.insert(ConversionKey::Utf8, Box::new(Utf8Converter));
    }
    table.insert(ConversionKey::Date, Box::new(PassthroughConverter));
    table.insert(
        ConversionKey::TimestampMillis,
        Box::new(TimestampConverter {
            unit: TimeUnit::Millis,
        }),
    );
    table.insert(
        ConversionKey::TimestampMicros,
        Box::new(TimestampConverter {
            unit: TimeUnit::Micros,
        }),
    );
    table.insert(ConversionKey::Json, Box::new(PassthroughConverter));
    table.insert(ConversionKey::Bson, Box::new(PassthroughConverter));
    table.insert(ConversionKey::Interval, Box::new(PassthroughConverter));
    table
}

/// Either a converter borrowed from a caller-owned table, or one built on the spot (the
/// `DECIMAL` case, whose scale is per-column). Lets `converter_for_leaf` return a uniform
/// handle without forcing every lookup through the static table to allocate.
pub(crate) enum ConverterHandle<'a> {
    Borrowed(&'a dyn LogicalConverter),
    Owned(Box<dyn LogicalConverter>),
}

impl LogicalConverter for ConverterHandle<'_> {
    fn convert(&self, value: RowValue) -> Result<RowValue> {
        match self {
            ConverterHandle::Borrowed(c) => c.convert(value),
            ConverterHandle::Owned(c) => c.convert(value),
        }
    }
}

/// Resolves the converter to apply for `leaf`/`key`: the request's overrides take
/// precedence, then `DECIMAL` is built dynamically from the leaf's declared scale, then
/// the static default table. Returns `None` for a column with no registered conversion.
pub(crate) fn converter_for_leaf<'a>(
    leaf: &ParquetType,
    key: ConversionKey,
    overrides: &'a HashMap<ConversionKey, Box<dyn LogicalConverter>>,
    defaults: &'a HashMap<ConversionKey, Box<dyn LogicalConverter>>,
) -> Option<ConverterHandle<'a>> {
    if let Some(converter) = overrides.get(&key) {
        return Some(ConverterHandle::Borrowed(converter.as_ref()));
    }
    if key == ConversionKey::Decimal {
        if let Some(PrimitiveConvertedType::Decimal(_, scale)) = leaf.converted_type() {
            return Some(ConverterHandle::Owned(Box::new(DecimalConverter::new(
                scale,
            ))));
        }
        return None;
    }
    defaults
        .get(&key)
        .map(|converter| ConverterHandle::Borrowed(converter.as_ref()))
}

/// Applies the converter registered for `key` (if any) to every row, recursing into
/// `List`/`Object` wrappers so a converter only ever sees the leaf value it was built for.
pub fn apply(converter: &dyn LogicalConverter, rows: Vec<RowValue>) -> Result<Vec<RowValue>> {
    rows.into_iter().map(|row| apply_one(converter, row)).collect()
}

fn apply_one(converter: &dyn LogicalConverter, value: RowValue) -> Result<RowValue> {
    match value {
        RowValue::List(items) => Ok(RowValue::List(
            items
                .into_iter()
                .map(|v| apply_one(converter, v))
                .collect::<Result<_>>()?,
        )),
        RowValue::Object(fields) => Ok(RowValue::Object(
            fields
                .into_iter()
                .map(|(k, v)| apply_one(converter, v).map(|v| (k, v)))
                .collect::<Result<_>>()?,
        )),
        other => converter.convert(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{PhysicalType, Repetition};

    fn decimal_leaf(precision: i32, scale: i32) -> ParquetType {
        ParquetType::try_from_primitive(
            "amount".to_string(),
            PhysicalType::FixedLenByteArray(16),
            Repetition::Required,
            Some(PrimitiveConvertedType::Decimal(precision, scale)),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn decimal_converter_decodes_big_endian_two_complement() {
        let converter = DecimalConverter::new(2);
        let positive = converter
            .convert(RowValue::Bytes(vec![0x00, 0x00, 0x01, 0x00]))
            .unwrap();
        assert_eq!(positive, RowValue::Decimal(256, 2));

        let negative = converter
            .convert(RowValue::Bytes(vec![0xff, 0xff, 0xff, 0xff]))
            .unwrap();
        assert_eq!(negative, RowValue::Decimal(-1, 2));
    }

    #[test]
    fn timestamp_converter_wraps_epoch() {
        let converter = TimestampConverter {
            unit: TimeUnit::Micros,
        };
        let converted = converter.convert(RowValue::Int64(1_700_000_000_000)).unwrap();
        assert_eq!(
            converted,
            RowValue::Timestamp(1_700_000_000_000, TimeUnit::Micros)
        );
    }

    #[test]
    fn converter_for_leaf_builds_decimal_dynamically_from_scale() {
        let leaf = decimal_leaf(10, 3);
        let overrides = HashMap::new();
        let defaults = default_converters(true);
        let handle = converter_for_leaf(&leaf, ConversionKey::Decimal, &overrides, &defaults)
            .expect("DECIMAL always resolves to a converter");
        let converted = handle.convert(RowValue::Int32(42)).unwrap();
        assert_eq!(converted, RowValue::Decimal(42, 3));
    }

    #[test]
    fn converter_for_leaf_prefers_request_override() {
        struct AlwaysNull;
        impl LogicalConverter for AlwaysNull {
            fn convert(&self, _value: RowValue) -> Result<RowValue> {
                Ok(RowValue::Null)
            }
        }
        let leaf = decimal_leaf(10, 3);
        let mut overrides: HashMap<ConversionKey, Box<dyn LogicalConverter>> = HashMap::new();
        overrides.insert(ConversionKey::Decimal, Box::new(AlwaysNull));
        let defaults = default_converters(true);
        let handle = converter_for_leaf(&leaf, ConversionKey::Decimal, &overrides, &defaults).unwrap();
        assert_eq!(handle.convert(RowValue::Int32(42)).unwrap(), RowValue::Null);
    }
}

