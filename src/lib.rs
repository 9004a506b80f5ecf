#![forbid(unsafe_code)]
//! An async, byte-range-driven reader for Apache Parquet files.

#[macro_use]
pub mod error;
pub mod api;
pub mod assemble;
pub mod byte_source;
pub mod compression;
pub mod convert;
pub mod deserialize;
pub mod encoding;
pub mod metadata;
pub mod page;
mod parquet_bridge;
pub mod prefetch;
pub mod read;
pub mod schema;
pub mod types;

pub use api::{read, read_column, read_dictionary, read_dictionary_count, ReadRequest};

const FOOTER_SIZE: u64 = 8;
const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];

/// The number of bytes read at the end of the parquet file on first read
const DEFAULT_FOOTER_READ_SIZE: u64 = 64 * 1024;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    pub fn get_path() -> PathBuf {
        let dir = env!("CARGO_MANIFEST_DIR");

        PathBuf::from(dir).join("testing/parquet-testing/data")
    }
}
