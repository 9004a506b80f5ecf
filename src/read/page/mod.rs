mod reader;
#[cfg(feature = "async")]
mod stream;

use crate::{error::ParquetError, page::CompressedPage};

pub use reader::{read_dictionary_page_header, PageFilter, PageMetaData, PageReader};

pub trait PageIterator: Iterator<Item = Result<CompressedPage, ParquetError>> {
    fn swap_buffer(&mut self, buffer: &mut Vec<u8>);
}

#[cfg(feature = "async")]
pub use stream::get_page_stream;
