use crate::encoding::byte_stream_split;
use crate::error::{ParquetError, Result};
use crate::schema::types::PhysicalType;
use crate::types::NativeType;

use super::Value;

/// Decodes a `BYTE_STREAM_SPLIT` stream for a fixed-width physical type.
pub fn decode(values: &[u8], physical_type: PhysicalType, num_values: usize) -> Result<Vec<Value>> {
    match physical_type {
        PhysicalType::Int32 => decode_typed::<i32>(values, num_values, Value::Int32),
        PhysicalType::Int64 => decode_typed::<i64>(values, num_values, Value::Int64),
        PhysicalType::Int96 => decode_typed::<[u32; 3]>(values, num_values, Value::Int96),
        PhysicalType::Float => decode_typed::<f32>(values, num_values, Value::Float),
        PhysicalType::Double => decode_typed::<f64>(values, num_values, Value::Double),
        other => Err(ParquetError::UnsupportedFeature(format!(
            "BYTE_STREAM_SPLIT is not valid for physical type {:?}",
            other
        ))),
    }
}

fn decode_typed<T: NativeType>(
    values: &[u8],
    num_values: usize,
    wrap: fn(T) -> Value,
) -> Result<Vec<Value>> {
    let decoder = byte_stream_split::Decoder::<T>::try_new(values)?;
    let decoded = decoder.take(num_values).collect::<Result<Vec<_>>>()?;
    if decoded.len() != num_values {
        return Err(ParquetError::CorruptPage(
            "BYTE_STREAM_SPLIT stream is shorter than the declared number of values".to_string(),
        ));
    }
    Ok(decoded.into_iter().map(wrap).collect())
}
