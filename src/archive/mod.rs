mod format;
mod reader;
mod writer;

pub use format::{CompressionMethod, WriteOptions, ENTRY_SEPARATOR, MIN_COMPRESSION_SIZE};
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;
