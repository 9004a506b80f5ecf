use crate::encoding::{bitpacked, hybrid_rle};
use crate::error::{ParquetError, Result};
use crate::page::{BinaryPageDict, DictPage, FixedLenByteArrayPageDict, PrimitivePageDict};
use crate::schema::types::PhysicalType;

use super::Value;

/// Decodes `num_values` dictionary indices from an RLE_DICTIONARY / PLAIN_DICTIONARY page body.
/// The first byte is the bit width; the remainder is the RLE/bit-packed hybrid index stream.
pub fn decode_indices(values: &[u8], num_values: usize) -> Result<Vec<u32>> {
    if num_values == 0 {
        return Ok(vec![]);
    }
    let bit_width = *values.first().ok_or_else(|| {
        ParquetError::CorruptPage("dictionary-indexed page is missing its bit-width byte".to_string())
    })?;
    if bit_width == 0 {
        return Ok(vec![0u32; num_values]);
    }
    let rest = &values[1..];
    let mut out = Vec::with_capacity(num_values);
    for run in hybrid_rle::Decoder::new(rest, bit_width as u32) {
        if out.len() >= num_values {
            break;
        }
        match run {
            hybrid_rle::HybridEncoded::Bitpacked(packed) => {
                let available = (packed.len() * 8) / bit_width as usize;
                let take = std::cmp::min(available, num_values - out.len());
                out.extend(bitpacked::Decoder::<u32>::new(packed, bit_width as usize, take));
            }
            hybrid_rle::HybridEncoded::Rle(pack, items) => {
                let mut bytes = [0u8; 4];
                pack.iter().enumerate().for_each(|(i, b)| bytes[i] = *b);
                let value = u32::from_le_bytes(bytes);
                let take = std::cmp::min(items, num_values - out.len());
                out.extend(std::iter::repeat(value).take(take));
            }
        }
    }
    if out.len() != num_values {
        return Err(ParquetError::CorruptPage(
            "dictionary index stream ended before producing the declared number of values".to_string(),
        ));
    }
    Ok(out)
}

/// Resolves a dictionary index into a materialized [`Value`], downcasting the type-erased
/// [`DictPage`] according to the column's physical type.
pub fn resolve(dict: &dyn DictPage, physical_type: PhysicalType, index: u32) -> Result<Value> {
    let index = index as usize;
    let out_of_range = || {
        ParquetError::CorruptPage("dictionary index is out of range for the dictionary page".to_string())
    };
    match physical_type {
        PhysicalType::Boolean => Err(ParquetError::UnsupportedFeature(
            "BOOLEAN columns cannot be dictionary-encoded".to_string(),
        )),
        PhysicalType::Int32 => {
            let dict = downcast::<PrimitivePageDict<i32>>(dict)?;
            dict.values().get(index).copied().map(Value::Int32).ok_or_else(out_of_range)
        }
        PhysicalType::Int64 => {
            let dict = downcast::<PrimitivePageDict<i64>>(dict)?;
            dict.values().get(index).copied().map(Value::Int64).ok_or_else(out_of_range)
        }
        PhysicalType::Int96 => {
            let dict = downcast::<PrimitivePageDict<[u32; 3]>>(dict)?;
            dict.values().get(index).copied().map(Value::Int96).ok_or_else(out_of_range)
        }
        PhysicalType::Float => {
            let dict = downcast::<PrimitivePageDict<f32>>(dict)?;
            dict.values().get(index).copied().map(Value::Float).ok_or_else(out_of_range)
        }
        PhysicalType::Double => {
            let dict = downcast::<PrimitivePageDict<f64>>(dict)?;
            dict.values().get(index).copied().map(Value::Double).ok_or_else(out_of_range)
        }
        PhysicalType::ByteArray => {
            let dict = downcast::<BinaryPageDict>(dict)?;
            dict.value(index).map(|v| Value::ByteArray(v.to_vec()))
        }
        PhysicalType::FixedLenByteArray(_) => {
            let dict = downcast::<FixedLenByteArrayPageDict>(dict)?;
            let size = dict.size();
            let start = index * size;
            let end = start + size;
            dict.values()
                .get(start..end)
                .map(|v| Value::FixedLenByteArray(v.to_vec()))
                .ok_or_else(out_of_range)
        }
    }
}

/// Returns the number of entries in `dict`.
pub fn len(dict: &dyn DictPage, physical_type: PhysicalType) -> Result<usize> {
    Ok(match physical_type {
        PhysicalType::Boolean => {
            return Err(ParquetError::UnsupportedFeature(
                "BOOLEAN columns cannot be dictionary-encoded".to_string(),
            ))
        }
        PhysicalType::Int32 => downcast::<PrimitivePageDict<i32>>(dict)?.values().len(),
        PhysicalType::Int64 => downcast::<PrimitivePageDict<i64>>(dict)?.values().len(),
        PhysicalType::Int96 => downcast::<PrimitivePageDict<[u32; 3]>>(dict)?.values().len(),
        PhysicalType::Float => downcast::<PrimitivePageDict<f32>>(dict)?.values().len(),
        PhysicalType::Double => downcast::<PrimitivePageDict<f64>>(dict)?.values().len(),
        PhysicalType::ByteArray => downcast::<BinaryPageDict>(dict)?.offsets().len() - 1,
        PhysicalType::FixedLenByteArray(_) => {
            let dict = downcast::<FixedLenByteArrayPageDict>(dict)?;
            dict.values().len() / dict.size()
        }
    })
}

/// Materializes every entry of `dict`, in dictionary order.
pub fn all_values(dict: &dyn DictPage, physical_type: PhysicalType) -> Result<Vec<Value>> {
    (0..len(dict, physical_type)? as u32)
        .map(|i| resolve(dict, physical_type, i))
        .collect()
}

fn downcast<T: 'static>(dict: &dyn DictPage) -> Result<&T> {
    dict.as_any().downcast_ref::<T>().ok_or_else(|| {
        ParquetError::CorruptPage(
            "dictionary page type does not match the column's physical type".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rle_run() {
        // bit_width=2, one RLE run of value 3, repeated 4 times.
        let data = [2u8, (4 << 1), 0b11];
        let indices = decode_indices(&data, 4).unwrap();
        assert_eq!(indices, vec![3, 3, 3, 3]);
    }
}
