//! A `u32`-specialized facade over [`super::bitpacked`], used by the encodings that only
//! ever bit-pack 32-bit values (RLE/bit-packing hybrid, delta binary packed).

use super::bitpacked;

pub const BLOCK_LEN: usize = bitpacked::BLOCK_LEN;

/// Decodes a bit-packed run of `u32` values of a given bit width.
#[derive(Debug, Clone)]
pub struct Decoder<'a>(bitpacked::Decoder<'a, u32>);

impl<'a> Decoder<'a> {
    pub fn new(compressed: &'a [u8], num_bits: u8, length: usize) -> Self {
        Self(bitpacked::Decoder::new(compressed, num_bits as usize, length))
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Bit-packs `decompressed` into `compressed` using `num_bits`, in chunks of [`BLOCK_LEN`].
pub fn encode(decompressed: &[u32], num_bits: u8, compressed: &mut [u8]) -> usize {
    bitpacked::encode(decompressed, num_bits as usize, compressed)
}

/// Bit-packs a single block of [`BLOCK_LEN`] `u32` values.
pub fn encode_pack(decompressed: [u32; BLOCK_LEN], num_bits: u8, compressed: &mut [u8]) -> usize {
    bitpacked::encode_pack(decompressed, num_bits as usize, compressed)
}
