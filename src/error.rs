//! Error kinds surfaced by the read pipeline.
//!
//! Every fallible entry point in this crate returns [`Result`]. The variants
//! below line up with the error taxonomy consumers are expected to match on:
//! a bad [`ParquetError::InvalidRequest`] never touches the byte source, while
//! the others are only raised once bytes have actually been fetched.

/// A specialized error for the Parquet read pipeline.
#[derive(Debug, PartialEq)]
pub enum ParquetError {
    /// The request was invalid independently of the file's contents: a
    /// single-column operation given many columns, a missing column, or a
    /// row span outside `[0, num_rows)`.
    InvalidRequest(String),
    /// The footer could not be parsed, or the schema tree it describes is
    /// malformed.
    CorruptMetadata(String),
    /// A page header could not be parsed, a decompressed page size did not
    /// match the header's declared size, a level stream overran the page
    /// body, or an encoding id is unrecognized.
    CorruptPage(String),
    /// Encryption, a codec with no configured decompressor, or a logical
    /// type with no configured converter.
    UnsupportedFeature(String),
    /// Propagated from the underlying byte source.
    ByteSourceError(String),
    /// A Thrift-bridged enum (`Encoding`, `Compression`, `PageType`, ...)
    /// carried a value outside the range this crate knows about. Callers at
    /// the metadata/page boundary re-classify this as `CorruptMetadata` or
    /// `CorruptPage` before it reaches `onComplete`.
    OutOfSpec(String),
}

impl std::error::Error for ParquetError {}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParquetError::InvalidRequest(message) => write!(fmt, "{}", message),
            ParquetError::CorruptMetadata(message) => write!(fmt, "{}", message),
            ParquetError::CorruptPage(message) => write!(fmt, "{}", message),
            ParquetError::UnsupportedFeature(message) => write!(fmt, "{}", message),
            ParquetError::ByteSourceError(message) => write!(fmt, "{}", message),
            ParquetError::OutOfSpec(message) => write!(fmt, "{}", message),
        }
    }
}

impl ParquetError {
    /// Reclassifies a Thrift-bridging [`ParquetError::OutOfSpec`] as a metadata error.
    /// Other variants pass through unchanged.
    pub fn into_metadata_error(self) -> Self {
        match self {
            ParquetError::OutOfSpec(m) => ParquetError::CorruptMetadata(m),
            other => other,
        }
    }

    /// Reclassifies a Thrift-bridging [`ParquetError::OutOfSpec`] as a page error.
    /// Other variants pass through unchanged.
    pub fn into_page_error(self) -> Self {
        match self {
            ParquetError::OutOfSpec(m) => ParquetError::CorruptPage(m),
            other => other,
        }
    }
}

#[cfg(feature = "snappy")]
impl From<snap::Error> for ParquetError {
    fn from(e: snap::Error) -> ParquetError {
        ParquetError::CorruptPage(format!("underlying snap error: {}", e))
    }
}

impl From<parquet_format_safe::thrift::Error> for ParquetError {
    fn from(e: parquet_format_safe::thrift::Error) -> ParquetError {
        ParquetError::CorruptMetadata(format!("underlying thrift error: {}", e))
    }
}

impl From<std::io::Error> for ParquetError {
    fn from(e: std::io::Error) -> ParquetError {
        ParquetError::ByteSourceError(format!("underlying IO error: {}", e))
    }
}

impl From<std::num::TryFromIntError> for ParquetError {
    fn from(e: std::num::TryFromIntError) -> ParquetError {
        ParquetError::CorruptMetadata(format!("integer out of range: {}", e))
    }
}

impl From<std::string::FromUtf8Error> for ParquetError {
    fn from(e: std::string::FromUtf8Error) -> ParquetError {
        ParquetError::UnsupportedFeature(format!("invalid utf-8 in STRING column: {}", e))
    }
}

impl From<std::collections::TryReserveError> for ParquetError {
    fn from(e: std::collections::TryReserveError) -> ParquetError {
        ParquetError::CorruptMetadata(format!(
            "column chunk declares a size that cannot be allocated: {}",
            e
        ))
    }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T> = std::result::Result<T, ParquetError>;

macro_rules! general_err {
    ($fmt:expr) => (ParquetError::CorruptMetadata($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::CorruptMetadata(format!($fmt, $($args),*)));
}

macro_rules! page_err {
    ($fmt:expr) => (ParquetError::CorruptPage($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (ParquetError::CorruptPage(format!($fmt, $($args),*)));
}
