//! Bit-unpacking of fixed-width values from a tightly packed, LSB-first bitstream,
//! as used by Parquet's RLE/bit-packing hybrid encoding.

macro_rules! unpack_impl {
    ($name:ident, $t:ty, $len:literal) => {
        pub fn $name(packed: &[u8], unpacked: &mut [$t; $len], num_bits: usize) {
            if num_bits == 0 {
                *unpacked = [0; $len];
                return;
            }
            let mask: u64 = if num_bits == 64 {
                u64::MAX
            } else {
                (1u64 << num_bits) - 1
            };

            let mut bit_offset = 0usize;
            for out in unpacked.iter_mut() {
                let mut value = 0u64;
                let mut shift = 0u32;
                let mut remaining = num_bits;
                let mut byte_idx = bit_offset / 8;
                let mut bit_in_byte = bit_offset % 8;
                while remaining > 0 {
                    let byte = *packed.get(byte_idx).unwrap_or(&0) as u64;
                    let available = 8 - bit_in_byte;
                    let take = remaining.min(available);
                    let chunk = (byte >> bit_in_byte) & ((1u64 << take) - 1);
                    value |= chunk << shift;
                    shift += take as u32;
                    remaining -= take;
                    byte_idx += 1;
                    bit_in_byte = 0;
                }
                *out = (value & mask) as $t;
                bit_offset += num_bits;
            }
        }
    };
}

unpack_impl!(unpack8, u8, 8);
unpack_impl!(unpack16, u16, 16);
unpack_impl!(unpack32, u32, 32);
unpack_impl!(unpack64, u64, 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack32_basic() {
        // 8 values of 3 bits each: 0..7, matching the RLE spec example.
        let data = [0b10001000u8, 0b11000110, 0b11111010];
        let mut unpacked = [0u32; 32];
        unpack32(&data, &mut unpacked, 3);
        assert_eq!(&unpacked[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unpack8_bool() {
        let data = [0b10101010u8];
        let mut unpacked = [0u8; 8];
        unpack8(&data, &mut unpacked, 1);
        assert_eq!(unpacked, [0, 1, 0, 1, 0, 1, 0, 1]);
    }
}
