use crate::encoding::bitpacked;
use crate::encoding::plain_byte_array::BinaryIter;
use crate::error::{ParquetError, Result};
use crate::schema::types::PhysicalType;
use crate::types;

use super::Value;

/// Decodes `num_values` PLAIN-encoded values of `physical_type` from `values`.
pub fn decode(values: &[u8], physical_type: PhysicalType, num_values: usize) -> Result<Vec<Value>> {
    match physical_type {
        PhysicalType::Boolean => Ok(bitpacked::Decoder::<u8>::new(values, 1, num_values)
            .map(|b| Value::Boolean(b != 0))
            .collect()),
        PhysicalType::Int32 => decode_native::<i32>(values, num_values, Value::Int32),
        PhysicalType::Int64 => decode_native::<i64>(values, num_values, Value::Int64),
        PhysicalType::Int96 => decode_native::<[u32; 3]>(values, num_values, Value::Int96),
        PhysicalType::Float => decode_native::<f32>(values, num_values, Value::Float),
        PhysicalType::Double => decode_native::<f64>(values, num_values, Value::Double),
        PhysicalType::ByteArray => {
            let iter = BinaryIter::new(values, Some(num_values));
            Ok(iter.take(num_values).map(|v| Value::ByteArray(v.to_vec())).collect())
        }
        PhysicalType::FixedLenByteArray(size) => {
            let size = size as usize;
            let needed = size * num_values;
            if values.len() < needed {
                return Err(ParquetError::CorruptPage(
                    "not enough bytes for FIXED_LEN_BYTE_ARRAY PLAIN values".to_string(),
                ));
            }
            Ok(values[..needed]
                .chunks_exact(size)
                .map(|chunk| Value::FixedLenByteArray(chunk.to_vec()))
                .collect())
        }
    }
}

fn decode_native<T: types::NativeType>(
    values: &[u8],
    num_values: usize,
    wrap: fn(T) -> Value,
) -> Result<Vec<Value>> {
    let size = std::mem::size_of::<T>();
    let needed = size * num_values;
    if values.len() < needed {
        return Err(ParquetError::CorruptPage(
            "not enough bytes for PLAIN-encoded values".to_string(),
        ));
    }
    Ok(values[..needed]
        .chunks_exact(size)
        .map(|chunk| wrap(types::decode::<T>(chunk)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_int32() {
        let data = 7i32.to_le_bytes();
        let values = decode(&data, PhysicalType::Int32, 1).unwrap();
        assert_eq!(values, vec![Value::Int32(7)]);
    }

    #[test]
    fn decodes_booleans() {
        let data = [0b0000_0101u8];
        let values = decode(&data, PhysicalType::Boolean, 3).unwrap();
        assert_eq!(
            values,
            vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(true)]
        );
    }
}
