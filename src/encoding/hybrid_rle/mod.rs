// See https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
mod bitmap;
mod decoder;
mod encoder;
pub use bitmap::encode as bitpacked_encode;
pub use decoder::Decoder;
pub use encoder::encode;

#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bitpacked slice of `num_bits`-wide values, raw (not yet unpacked).
    Bitpacked(&'a [u8]),
    /// A RLE run: the little-endian encoded repeated value plus its run length.
    Rle(&'a [u8], usize),
}

impl<'a> HybridEncoded<'a> {
    /// Expands this run into an iterator of `u32`, given the bit width it was encoded with.
    pub fn decode(self, num_bits: u8) -> RunIterator<'a> {
        match self {
            HybridEncoded::Bitpacked(compressed) => {
                let run_length = (compressed.len() * 8) / num_bits as usize;
                RunIterator::Bitpacked(super::bitpacking::Decoder::new(
                    compressed, num_bits, run_length,
                ))
            }
            HybridEncoded::Rle(pack, run_length) => {
                let mut bytes = [0u8; std::mem::size_of::<u32>()];
                pack.iter().enumerate().for_each(|(i, b)| bytes[i] = *b);
                let value = u32::from_le_bytes(bytes);
                RunIterator::Rle(std::iter::repeat(value).take(run_length))
            }
        }
    }
}

pub enum RunIterator<'a> {
    Bitpacked(super::bitpacking::Decoder<'a>),
    Rle(std::iter::Take<std::iter::Repeat<u32>>),
}

impl<'a> Iterator for RunIterator<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RunIterator::Bitpacked(delegate) => delegate.next(),
            RunIterator::Rle(delegate) => delegate.next(),
        }
    }
}
