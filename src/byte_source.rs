//! A minimal byte-addressable source abstraction (§6 of the design notes): the unit the
//! Prefetch Cache (`crate::prefetch`) plans and coalesces reads against, instead of the
//! read path coupling directly to `Read + Seek` everywhere.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Mutex;

use crate::error::{ParquetError, Result};

/// A byte-addressable source: a file, a memory buffer, or (behind the `async` feature) a
/// remote object reached over `AsyncRead + AsyncSeek`.
///
/// `slice` may be called with overlapping or repeated ranges and, per the concurrency
/// model, may be called from multiple threads at once: implementations only need to
/// return the same bytes each time, not avoid re-fetching them. Avoiding repeat I/O is
/// [`crate::prefetch::PrefetchCache`]'s job, layered on top of a `ByteSource`.
pub trait ByteSource: Send + Sync {
    /// Total length of the source, in bytes.
    fn byte_len(&self) -> u64;

    /// Returns the bytes in `[start, end)`. `end` is exclusive and must not exceed
    /// `byte_len()`.
    fn slice(&self, start: u64, end: u64) -> Result<Vec<u8>>;
}

fn stream_len<R: Seek>(reader: &mut R) -> Result<u64> {
    let old_pos = reader.seek(SeekFrom::Current(0))?;
    let len = reader.seek(SeekFrom::End(0))?;
    if old_pos != len {
        reader.seek(SeekFrom::Start(old_pos))?;
    }
    Ok(len)
}

/// Adapts any `Read + Seek` into a [`ByteSource`]. A single `R` can only serve one
/// seek-then-read at a time, so concurrent `slice` calls are serialised behind a
/// [`Mutex`] rather than rejected.
pub struct SyncByteSource<R> {
    inner: Mutex<R>,
    len: u64,
}

impl<R: Read + Seek> SyncByteSource<R> {
    /// Wraps `reader`, measuring its length with a pair of seeks (restoring the original
    /// position) the same way `read::stream::read_metadata` measures its async reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let len = stream_len(&mut reader)?;
        Ok(Self {
            inner: Mutex::new(reader),
            len,
        })
    }
}

impl<R: Read + Seek + Send> ByteSource for SyncByteSource<R> {
    fn byte_len(&self) -> u64 {
        self.len
    }

    fn slice(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        if end < start || end > self.len {
            return Err(ParquetError::InvalidRequest(format!(
                "byte range [{}, {}) is outside [0, {})",
                start, end, self.len
            )));
        }
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ParquetError::InvalidRequest("byte source lock poisoned".to_string()))?;
        guard.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; (end - start) as usize];
        guard.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// The async-feature counterpart of [`ByteSource`], bridging `AsyncRead + AsyncSeek`
/// sources (e.g. the teacher's `examples/s3` `RangedStreamer`) the same way `read::stream`
/// bridges async metadata reading: a concrete generic bound and inline `.await`, not a
/// boxed trait-object future.
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod stream {
    use futures::lock::Mutex;
    use futures::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
    use std::io::SeekFrom;

    use crate::error::{ParquetError, Result};

    async fn stream_len<R: AsyncSeek + Unpin>(reader: &mut R) -> Result<u64> {
        let old_pos = reader.seek(SeekFrom::Current(0)).await?;
        let len = reader.seek(SeekFrom::End(0)).await?;
        if old_pos != len {
            reader.seek(SeekFrom::Start(old_pos)).await?;
        }
        Ok(len)
    }

    /// Adapts an `AsyncRead + AsyncSeek` reader into a byte source. `slice` takes `&self`
    /// (matching the sync [`super::ByteSource`] contract) by serialising access behind a
    /// [`futures::lock::Mutex`], so callers may hold several `Arc<AsyncByteSource<R>>`
    /// clones and call `slice` from concurrent tasks.
    pub struct AsyncByteSource<R> {
        inner: Mutex<R>,
        len: u64,
    }

    impl<R: AsyncRead + AsyncSeek + Unpin> AsyncByteSource<R> {
        pub async fn new(mut reader: R) -> Result<Self> {
            let len = stream_len(&mut reader).await?;
            Ok(Self {
                inner: Mutex::new(reader),
                len,
            })
        }

        pub fn byte_len(&self) -> u64 {
            self.len
        }

        pub async fn slice(&self, start: u64, end: u64) -> Result<Vec<u8>> {
            if end < start || end > self.len {
                return Err(ParquetError::InvalidRequest(format!(
                    "byte range [{}, {}) is outside [0, {})",
                    start, end, self.len
                )));
            }
            let mut guard = self.inner.lock().await;
            guard.seek(SeekFrom::Start(start)).await?;
            let mut buf = vec![0u8; (end - start) as usize];
            guard.read_exact(&mut buf).await?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn slices_within_bounds() {
        let source = SyncByteSource::new(Cursor::new(b"hello world".to_vec())).unwrap();
        assert_eq!(source.byte_len(), 11);
        assert_eq!(source.slice(0, 5).unwrap(), b"hello");
        assert_eq!(source.slice(6, 11).unwrap(), b"world");
    }

    #[test]
    fn rejects_out_of_bounds_ranges() {
        let source = SyncByteSource::new(Cursor::new(b"hello".to_vec())).unwrap();
        assert!(source.slice(0, 6).is_err());
        assert!(source.slice(6, 7).is_err());
    }
}
