use crate::compression::{create_codec, Compression};
use crate::error::{ParquetError, Result};
use crate::page::{CompressedDataPage, CompressedPage, DataPage, DataPageHeader};

use super::page::PageIterator;

/// Decompresses an entire V1 page in one shot: the whole body is compressed.
fn decompress_v1(
    compressed: &[u8],
    compression: Compression,
    uncompressed_page_size: usize,
    buffer: &mut Vec<u8>,
) -> Result<()> {
    buffer.clear();
    buffer.resize(uncompressed_page_size, 0);
    if let Some(mut codec) = create_codec(&compression)? {
        codec.decompress(compressed, buffer)?;
    } else {
        buffer.copy_from_slice(compressed);
    }
    Ok(())
}

/// Decompresses a V2 page: the repetition/definition level streams are never compressed,
/// only the bytes after `levels_byte_length` are.
fn decompress_v2(
    compressed: &[u8],
    levels_byte_length: usize,
    compression: Compression,
    uncompressed_page_size: usize,
    buffer: &mut Vec<u8>,
) -> Result<()> {
    if levels_byte_length > compressed.len() || levels_byte_length > uncompressed_page_size {
        return Err(ParquetError::CorruptPage(
            "V2 page levels_byte_length is larger than the page itself".to_string(),
        ));
    }
    buffer.clear();
    buffer.extend_from_slice(&compressed[..levels_byte_length]);
    buffer.resize(uncompressed_page_size, 0);
    if let Some(mut codec) = create_codec(&compression)? {
        codec.decompress(
            &compressed[levels_byte_length..],
            &mut buffer[levels_byte_length..],
        )?;
    } else {
        buffer[levels_byte_length..].copy_from_slice(&compressed[levels_byte_length..]);
    }
    Ok(())
}

/// Decompresses a [`CompressedDataPage`] into a [`DataPage`], reusing `buffer`'s allocation.
pub fn decompress(page: CompressedDataPage, buffer: &mut Vec<u8>) -> Result<DataPage> {
    let uncompressed_page_size = page.uncompressed_size();
    let compression = page.compression();
    let skip_decompression = compression == Compression::Uncompressed;

    match page.header() {
        DataPageHeader::V1(_) => {
            if skip_decompression {
                buffer.clear();
                buffer.extend_from_slice(&page.buffer);
            } else {
                decompress_v1(&page.buffer, compression, uncompressed_page_size, buffer)?;
            }
        }
        DataPageHeader::V2(header) => {
            let levels_byte_length = (header.definition_levels_byte_length
                + header.repetition_levels_byte_length)
                .max(0) as usize;
            if skip_decompression || !header.is_compressed.unwrap_or(true) {
                buffer.clear();
                buffer.extend_from_slice(&page.buffer);
            } else {
                decompress_v2(
                    &page.buffer,
                    levels_byte_length,
                    compression,
                    uncompressed_page_size,
                    buffer,
                )?;
            }
        }
    }

    if buffer.len() != uncompressed_page_size {
        return Err(ParquetError::CorruptPage(format!(
            "page declared {} uncompressed bytes but produced {}",
            uncompressed_page_size,
            buffer.len()
        )));
    }

    let buffer = std::mem::take(buffer);
    Ok(page.into_data_page(buffer))
}

fn unwrap_data_page(page: CompressedPage) -> Result<CompressedDataPage> {
    match page {
        CompressedPage::Data(page) => Ok(page),
        CompressedPage::Dict(_) => Err(ParquetError::CorruptPage(
            "did not expect a dictionary page outside of the page reader".to_string(),
        )),
    }
}

/// Decompresses the pages read by `iter` one at a time, keeping at most one decoded
/// [`DataPage`] alive so the decompression buffer can be recycled across calls.
///
/// Unlike [`Decompressor`], this does not require the wrapped iterator to support
/// buffer recycling of its own; it borrows it instead of taking ownership.
pub struct BasicDecompressor<'a, I: Iterator<Item = Result<CompressedPage>>> {
    iter: &'a mut I,
    buffer: Vec<u8>,
    current: Option<DataPage>,
}

impl<'a, I: Iterator<Item = Result<CompressedPage>>> BasicDecompressor<'a, I> {
    /// Returns a new [`BasicDecompressor`].
    pub fn new(iter: &'a mut I, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            buffer,
            current: None,
        }
    }

    /// Advances to the next page, returning the decompressed [`DataPage`] if any remain.
    pub fn next(&mut self) -> Result<Option<&DataPage>> {
        let compressed = match self.iter.next() {
            Some(page) => unwrap_data_page(page?)?,
            None => {
                self.current = None;
                return Ok(None);
            }
        };

        let mut scratch = self
            .current
            .take()
            .map(|mut page| page.take_buffer())
            .unwrap_or_else(|| std::mem::take(&mut self.buffer));

        let page = decompress(compressed, &mut scratch)?;
        self.current = Some(page);
        Ok(self.current.as_ref())
    }

    /// Consumes `self`, returning the decompression buffer for reuse.
    pub fn into_inner(mut self) -> Vec<u8> {
        self.current
            .take()
            .map(|mut page| page.take_buffer())
            .unwrap_or(self.buffer)
    }
}

/// Decompresses the pages read by a [`PageIterator`], one at a time, reusing both the
/// reader's raw-page buffer and this decompressor's decoded-page buffer across calls.
pub struct Decompressor<I: Iterator<Item = Result<CompressedPage>> + PageIterator> {
    iter: I,
    buffer: Vec<u8>,
    current: Option<DataPage>,
}

impl<I: Iterator<Item = Result<CompressedPage>> + PageIterator> Decompressor<I> {
    /// Returns a new [`Decompressor`].
    pub fn new(iter: I, buffer: Vec<u8>) -> Self {
        Self {
            iter,
            buffer,
            current: None,
        }
    }

    /// Advances to the next page, returning the decompressed [`DataPage`] if any remain.
    pub fn next(&mut self) -> Result<Option<&DataPage>> {
        let compressed = match self.iter.next() {
            Some(page) => unwrap_data_page(page?)?,
            None => {
                self.current = None;
                return Ok(None);
            }
        };

        let mut scratch = self
            .current
            .take()
            .map(|mut page| page.take_buffer())
            .unwrap_or_else(|| std::mem::take(&mut self.buffer));

        let page = decompress(compressed, &mut scratch)?;
        self.current = Some(page);
        Ok(self.current.as_ref())
    }

    /// Consumes `self`, returning the reader's raw-page buffer and the decoded-page buffer.
    pub fn into_buffers(mut self) -> (Vec<u8>, Vec<u8>) {
        let mut raw_buffer = vec![];
        self.iter.swap_buffer(&mut raw_buffer);
        let decompressed = self
            .current
            .take()
            .map(|mut page| page.take_buffer())
            .unwrap_or(self.buffer);
        (raw_buffer, decompressed)
    }
}
