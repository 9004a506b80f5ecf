use std::convert::TryInto;

use super::super::ceil8;
use super::pack;

pub const BLOCK_LEN: usize = 32;

/// Encodes `u32` values into a buffer using `num_bits`.
pub fn encode(decompressed: &[u32], num_bits: usize, compressed: &mut [u8]) -> usize {
    let chunks = decompressed.chunks_exact(BLOCK_LEN);
    let remainder = chunks.remainder();

    let size = ceil8(BLOCK_LEN * num_bits);

    let mut compressed_len = 0;
    chunks.for_each(|chunk| {
        let chunk_compressed = &mut compressed[compressed_len..compressed_len + size];
        compressed_len += encode_pack(chunk.try_into().unwrap(), num_bits, chunk_compressed);
    });

    if !remainder.is_empty() {
        let mut last_chunk = [0u32; BLOCK_LEN];
        last_chunk[..remainder.len()].copy_from_slice(remainder);
        let chunk_compressed = &mut compressed[compressed_len..compressed_len + size];
        compressed_len += encode_pack(last_chunk, num_bits, chunk_compressed);
    }
    let _ = compressed_len;

    ceil8(decompressed.len() * num_bits)
}

/// Encodes a single block of [`BLOCK_LEN`] `u32` values into `compressed` using `num_bits`.
#[inline]
pub fn encode_pack(decompressed: [u32; BLOCK_LEN], num_bits: usize, compressed: &mut [u8]) -> usize {
    let size = ceil8(BLOCK_LEN * num_bits);
    compressed[..size].iter_mut().for_each(|v| *v = 0);
    pack::pack32(&decompressed, compressed, num_bits);
    size
}
