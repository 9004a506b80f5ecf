use crate::schema::types::PhysicalType;

/// A physical native representation of a Parquet fixed-sized type.
pub trait NativeType: Sized + Copy + std::fmt::Debug {
    /// The `PhysicalType` this native type corresponds to on disk.
    const TYPE: PhysicalType;

    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    fn to_le_bytes(&self) -> Self::Bytes;

    fn to_be_bytes(&self) -> Self::Bytes;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native {
    ($type:ty, $physical_type:expr) => {
        impl NativeType for $type {
            const TYPE: PhysicalType = $physical_type;

            type Bytes = [u8; std::mem::size_of::<Self>()];
            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn to_be_bytes(&self) -> Self::Bytes {
                Self::to_be_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }

            #[inline]
            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                Self::from_be_bytes(bytes)
            }
        }
    };
}

native!(i32, PhysicalType::Int32);
native!(i64, PhysicalType::Int64);
native!(f32, PhysicalType::Float);
native!(f64, PhysicalType::Double);

/// INT96 is stored on disk as three little-endian `u32` words.
impl NativeType for [u32; 3] {
    const TYPE: PhysicalType = PhysicalType::Int96;

    type Bytes = [u8; 12];

    #[inline]
    fn to_le_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; 12];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    #[inline]
    fn to_be_bytes(&self) -> Self::Bytes {
        let mut bytes = [0u8; 12];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    #[inline]
    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        let mut words = [0u32; 3];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        words
    }

    #[inline]
    fn from_be_bytes(bytes: Self::Bytes) -> Self {
        let mut words = [0u32; 3];
        for (word, chunk) in words.iter_mut().rev().zip(bytes.chunks_exact(4)) {
            *word = u32::from_be_bytes(chunk.try_into().unwrap());
        }
        words
    }
}

/// Decodes a single little-endian encoded native value, as stored by the PLAIN encoding.
/// # Panics
/// Panics if `chunk.len() != std::mem::size_of::<T>()`.
#[inline]
pub fn decode<T: NativeType>(chunk: &[u8]) -> T {
    T::from_le_bytes(match chunk.try_into() {
        Ok(bytes) => bytes,
        Err(_) => panic!("chunk length does not match the size of the native type"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int96_roundtrip() {
        let value = [1u32, 2, 3];
        let bytes = value.to_le_bytes();
        assert_eq!(<[u32; 3]>::from_le_bytes(bytes), value);
    }

    #[test]
    fn decode_i32() {
        let value = 42i32;
        let bytes = value.to_le_bytes();
        assert_eq!(decode::<i32>(&bytes), value);
    }
}
