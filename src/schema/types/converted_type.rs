use crate::error::{ParquetError, Result};

use parquet_format_safe::ConvertedType as TConvertedType;

/// A converted type annotating a group (nested) field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupConvertedType {
    /// a map is converted as an optional field containing a repeated key/value pair
    Map,
    /// a key/value pair is converted into a group of two fields
    MapKeyValue,
    /// a list is converted into an optional field containing a repeated field for its
    /// values
    List,
}

/// A converted type annotating a primitive (leaf) field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrimitiveConvertedType {
    Utf8,
    /// an enum is converted into a binary field
    Enum,
    /// A decimal value.
    ///
    /// This may be used to annotate binary or fixed primitive types. The
    /// underlying byte array stores the unscaled value encoded as two's
    /// complement using big-endian byte order (the most significant byte is the
    /// zeroth element). The value of the decimal is the value * 10^{-scale}.
    ///
    /// This must be accompanied by a (maximum) precision and a scale in the
    /// SchemaElement. The precision specifies the number of digits in the decimal
    /// and the scale stores the location of the decimal point. For example 1.23
    /// would have precision 3 (3 total digits) and scale 2 (the decimal point is
    /// 2 digits over).
    // (precision, scale)
    Decimal(i32, i32),
    /// A Date
    ///
    /// Stored as days since Unix epoch, encoded as the INT32 physical type.
    Date,
    /// A time
    ///
    /// The total number of milliseconds since midnight. The value is stored
    /// as an INT32 physical type.
    TimeMillis,
    /// A time.
    ///
    /// The total number of microseconds since midnight. The value is stored as
    /// an INT64 physical type.
    TimeMicros,
    /// A date/time combination
    ///
    /// Date and time recorded as milliseconds since the Unix epoch. Recorded as
    /// a physical type of INT64.
    TimestampMillis,
    /// A date/time combination
    ///
    /// Date and time recorded as microseconds since the Unix epoch. The value is
    /// stored as an INT64 physical type.
    TimestampMicros,
    /// An unsigned integer value.
    ///
    /// The number describes the maximum number of meaningful data bits in
    /// the stored value. 8, 16 and 32 bit values are stored using the
    /// INT32 physical type. 64 bit values are stored using the INT64
    /// physical type.
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// A signed integer value.
    ///
    /// The number describes the maximum number of meaningful data bits in
    /// the stored value. 8, 16 and 32 bit values are stored using the
    /// INT32 physical type. 64 bit values are stored using the INT64
    /// physical type.
    Int8,
    Int16,
    Int32,
    Int64,
    /// An embedded JSON document
    ///
    /// A JSON document embedded within a single UTF8 column.
    Json,
    /// An embedded BSON document
    ///
    /// A BSON document embedded within a single BINARY column.
    Bson,
    /// An interval of time
    ///
    /// This type annotates data stored as a FIXED_LEN_BYTE_ARRAY of length 12.
    /// This data is composed of three separate little endian unsigned
    /// integers. Each stores a component of a duration of time. The first
    /// integer identifies the number of months associated with the duration,
    /// the second identifies the number of days associated with the duration
    /// and the third identifies the number of milliseconds associated with
    /// the provided duration. This duration of time is independent of any
    /// particular timezone or date.
    Interval,
}

/// Converts a Thrift `ConvertedType` found on a group node into a [`GroupConvertedType`].
pub fn converted_to_group_converted(ty: &TConvertedType) -> Result<GroupConvertedType> {
    Ok(match ty {
        TConvertedType::MAP => GroupConvertedType::Map,
        TConvertedType::MAP_KEY_VALUE => GroupConvertedType::MapKeyValue,
        TConvertedType::LIST => GroupConvertedType::List,
        other => {
            return Err(ParquetError::OutOfSpec(format!(
                "{:?} is not a valid converted type for a group node",
                other
            )))
        }
    })
}

/// Converts a Thrift `ConvertedType` found on a primitive node, together with an
/// optional `(precision, scale)` pair for `DECIMAL`, into a [`PrimitiveConvertedType`].
pub fn converted_to_primitive_converted(
    ty: &TConvertedType,
    maybe_decimal: Option<(i32, i32)>,
) -> Result<PrimitiveConvertedType> {
    Ok(match ty {
        TConvertedType::UTF8 => PrimitiveConvertedType::Utf8,
        TConvertedType::ENUM => PrimitiveConvertedType::Enum,
        TConvertedType::DECIMAL => {
            let (precision, scale) = maybe_decimal.ok_or_else(|| {
                ParquetError::OutOfSpec(
                    "DECIMAL converted type requires a precision and scale".to_string(),
                )
            })?;
            PrimitiveConvertedType::Decimal(precision, scale)
        }
        TConvertedType::DATE => PrimitiveConvertedType::Date,
        TConvertedType::TIME_MILLIS => PrimitiveConvertedType::TimeMillis,
        TConvertedType::TIME_MICROS => PrimitiveConvertedType::TimeMicros,
        TConvertedType::TIMESTAMP_MILLIS => PrimitiveConvertedType::TimestampMillis,
        TConvertedType::TIMESTAMP_MICROS => PrimitiveConvertedType::TimestampMicros,
        TConvertedType::UINT_8 => PrimitiveConvertedType::Uint8,
        TConvertedType::UINT_16 => PrimitiveConvertedType::Uint16,
        TConvertedType::UINT_32 => PrimitiveConvertedType::Uint32,
        TConvertedType::UINT_64 => PrimitiveConvertedType::Uint64,
        TConvertedType::INT_8 => PrimitiveConvertedType::Int8,
        TConvertedType::INT_16 => PrimitiveConvertedType::Int16,
        TConvertedType::INT_32 => PrimitiveConvertedType::Int32,
        TConvertedType::INT_64 => PrimitiveConvertedType::Int64,
        TConvertedType::JSON => PrimitiveConvertedType::Json,
        TConvertedType::BSON => PrimitiveConvertedType::Bson,
        TConvertedType::INTERVAL => PrimitiveConvertedType::Interval,
        other => {
            return Err(ParquetError::OutOfSpec(format!(
                "{:?} is not a valid converted type for a primitive node",
                other
            )))
        }
    })
}

/// Converts a [`GroupConvertedType`] back into its Thrift representation.
pub fn group_converted_converted_to(ty: &GroupConvertedType) -> TConvertedType {
    match ty {
        GroupConvertedType::Map => TConvertedType::MAP,
        GroupConvertedType::MapKeyValue => TConvertedType::MAP_KEY_VALUE,
        GroupConvertedType::List => TConvertedType::LIST,
    }
}

/// Converts a [`PrimitiveConvertedType`] back into its Thrift representation,
/// returning the `(precision, scale)` pair for `DECIMAL` alongside it.
pub fn primitive_converted_to_converted(
    ty: &PrimitiveConvertedType,
) -> (TConvertedType, Option<(i32, i32)>) {
    use PrimitiveConvertedType::*;
    match ty {
        Utf8 => (TConvertedType::UTF8, None),
        Enum => (TConvertedType::ENUM, None),
        Decimal(precision, scale) => (TConvertedType::DECIMAL, Some((*precision, *scale))),
        Date => (TConvertedType::DATE, None),
        TimeMillis => (TConvertedType::TIME_MILLIS, None),
        TimeMicros => (TConvertedType::TIME_MICROS, None),
        TimestampMillis => (TConvertedType::TIMESTAMP_MILLIS, None),
        TimestampMicros => (TConvertedType::TIMESTAMP_MICROS, None),
        Uint8 => (TConvertedType::UINT_8, None),
        Uint16 => (TConvertedType::UINT_16, None),
        Uint32 => (TConvertedType::UINT_32, None),
        Uint64 => (TConvertedType::UINT_64, None),
        Int8 => (TConvertedType::INT_8, None),
        Int16 => (TConvertedType::INT_16, None),
        Int32 => (TConvertedType::INT_32, None),
        Int64 => (TConvertedType::INT_64, None),
        Json => (TConvertedType::JSON, None),
        Bson => (TConvertedType::BSON, None),
        Interval => (TConvertedType::INTERVAL, None),
    }
}
