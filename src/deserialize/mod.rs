//! Turns a decompressed [`DataPage`] into parallel repetition-level, definition-level and
//! value streams, dispatching on the page's declared [`Encoding`].

mod byte_stream_split;
mod delta;
mod dictionary;
mod plain;

pub use dictionary::all_values as all_dictionary_values;
pub use dictionary::resolve as resolve_dictionary_value;

use crate::encoding::{hybrid_rle, Encoding};
use crate::error::{ParquetError, Result};
use crate::page::{DataPage, DataPageHeader};
use crate::read::levels::{get_bit_width, split_buffer_v1, split_buffer_v2, RLEDecoder};
use crate::schema::types::PhysicalType;

/// A physical value decoded out of a page, prior to logical-type conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96([u32; 3]),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

/// A decoded page: parallel level streams plus the materialized values.
///
/// `values[i]` corresponds to the `i`-th position whose `def_levels` entry equals the
/// column's maximum definition level; positions below that level carry no value, only a
/// level pair recording how far down the schema tree the record is defined.
#[derive(Debug, Clone, Default)]
pub struct DecodedArray {
    pub rep_levels: Vec<i16>,
    pub def_levels: Vec<i16>,
    pub values: Vec<Value>,
}

/// Decodes a page's levels and values. Indices into the dictionary (for `PLAIN_DICTIONARY` /
/// `RLE_DICTIONARY` pages) are resolved through `page.dictionary_page()` unless
/// `raw_dictionary` is set, in which case the dictionary index itself is returned as an
/// [`Value::Int32`].
pub fn decode_page(page: &DataPage, raw_dictionary: bool) -> Result<DecodedArray> {
    let descriptor = page.descriptor();
    let max_rep_level = descriptor.max_rep_level();
    let max_def_level = descriptor.max_def_level();
    let has_rep = max_rep_level > 0;
    let has_def = max_def_level > 0;
    let num_values = page.num_values();
    let physical_type = descriptor.physical_type();

    let (rep_bytes, def_bytes, values_buffer) = match page.header() {
        DataPageHeader::V1(_) => split_buffer_v1(page.buffer(), has_rep, has_def),
        DataPageHeader::V2(header) => {
            let rep_len = header.repetition_levels_byte_length.max(0) as usize;
            let def_len = header.definition_levels_byte_length.max(0) as usize;
            split_buffer_v2(page.buffer(), rep_len, def_len)
        }
    };

    let rep_levels = decode_levels(rep_bytes, max_rep_level, num_values)?;
    let def_levels = decode_levels(def_bytes, max_def_level, num_values)?;

    let num_defined = if has_def {
        def_levels.iter().filter(|&&l| l == max_def_level).count()
    } else {
        num_values
    };

    let decoded_values = decode_values(values_buffer, page.encoding(), physical_type, num_defined)?;

    let values = if let Encoding::PlainDictionary | Encoding::RleDictionary = page.encoding() {
        if raw_dictionary {
            decoded_values
        } else {
            let dict = page.dictionary_page().ok_or_else(|| {
                ParquetError::CorruptPage(
                    "dictionary-encoded page has no preceding dictionary page".to_string(),
                )
            })?;
            decoded_values
                .into_iter()
                .map(|v| match v {
                    Value::Int32(index) => {
                        dictionary::resolve(dict.as_ref(), physical_type, index as u32)
                    }
                    _ => unreachable!("dictionary indices are always decoded as Value::Int32"),
                })
                .collect::<Result<Vec<_>>>()?
        }
    } else {
        decoded_values
    };

    Ok(DecodedArray {
        rep_levels,
        def_levels,
        values,
    })
}

fn decode_levels(bytes: &[u8], max_level: i16, num_values: usize) -> Result<Vec<i16>> {
    if max_level == 0 {
        return Ok(vec![]);
    }
    let num_bits = get_bit_width(max_level);
    let decoder = RLEDecoder::new(bytes, num_bits, num_values as u32);
    Ok(decoder.map(|v| v as i16).collect())
}

fn decode_values(
    values: &[u8],
    encoding: Encoding,
    physical_type: PhysicalType,
    num_values: usize,
) -> Result<Vec<Value>> {
    match encoding {
        Encoding::Plain => plain::decode(values, physical_type, num_values),
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            let indices = dictionary::decode_indices(values, num_values)?;
            Ok(indices.into_iter().map(|i| Value::Int32(i as i32)).collect())
        }
        Encoding::Rle => {
            if physical_type != PhysicalType::Boolean {
                return Err(ParquetError::UnsupportedFeature(
                    "RLE value encoding is only valid for BOOLEAN columns".to_string(),
                ));
            }
            let mut out = Vec::with_capacity(num_values);
            for run in hybrid_rle::Decoder::new(values, 1) {
                if out.len() >= num_values {
                    break;
                }
                match run {
                    hybrid_rle::HybridEncoded::Bitpacked(packed) => {
                        let available = packed.len() * 8;
                        let take = std::cmp::min(available, num_values - out.len());
                        out.extend(
                            crate::encoding::bitpacked::Decoder::<u8>::new(packed, 1, take)
                                .map(|b| Value::Boolean(b != 0)),
                        );
                    }
                    hybrid_rle::HybridEncoded::Rle(pack, items) => {
                        let value = pack.first().copied().unwrap_or(0) != 0;
                        let take = std::cmp::min(items, num_values - out.len());
                        out.extend(std::iter::repeat(Value::Boolean(value)).take(take));
                    }
                }
            }
            Ok(out)
        }
        Encoding::DeltaBinaryPacked => delta::decode_binary_packed(values, physical_type, num_values),
        Encoding::DeltaLengthByteArray => delta::decode_length_byte_array(values, num_values),
        Encoding::DeltaByteArray => delta::decode_byte_array(values, num_values),
        Encoding::ByteStreamSplit => byte_stream_split::decode(values, physical_type, num_values),
        Encoding::BitPacked => Err(ParquetError::UnsupportedFeature(
            "the deprecated standalone BIT_PACKED encoding is not supported".to_string(),
        )),
    }
}
