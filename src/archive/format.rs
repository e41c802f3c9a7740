use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;

/// Separator used in entry names, regardless of platform
pub const ENTRY_SEPARATOR: char = '/';

/// Entries smaller than this are always stored
pub const MIN_COMPRESSION_SIZE: usize = 64;

/// Compression methods supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    Stored,
    #[default]
    Deflated,
}

impl CompressionMethod {
    /// Choose compression for a single entry.
    ///
    /// Already compressed formats and tiny entries are stored even when
    /// deflate is requested.
    pub fn choose_for_file(self, path: &str, size: usize) -> Self {
        if self == Self::Stored || size < MIN_COMPRESSION_SIZE {
            return Self::Stored;
        }

        let path_lower = path.to_lowercase();
        let already_compressed = [
            ".png", ".jpg", ".jpeg", ".gif", ".zip", ".jar", ".war", ".gz", ".7z",
        ]
        .iter()
        .any(|ext| path_lower.ends_with(ext));

        if already_compressed {
            Self::Stored
        } else {
            Self::Deflated
        }
    }

    fn to_zip(self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Options applied to every entry an [`ArchiveWriter`](super::ArchiveWriter) writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub compression: CompressionMethod,
    pub unix_permissions: Option<u32>,
}

impl WriteOptions {
    pub(crate) fn for_entry(&self, path: &str, size: usize) -> SimpleFileOptions {
        let method = self.compression.choose_for_file(path, size);
        let options = SimpleFileOptions::default().compression_method(method.to_zip());
        match self.unix_permissions {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        }
    }

    pub(crate) fn for_directory(&self) -> SimpleFileOptions {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        match self.unix_permissions {
            Some(mode) => options.unix_permissions(mode | 0o111),
            None => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_for_file() {
        let deflated = CompressionMethod::Deflated;
        assert_eq!(deflated.choose_for_file("a.txt", 10), CompressionMethod::Stored);
        assert_eq!(deflated.choose_for_file("a.txt", 4096), CompressionMethod::Deflated);
        assert_eq!(deflated.choose_for_file("lib.JAR", 4096), CompressionMethod::Stored);
        assert_eq!(
            CompressionMethod::Stored.choose_for_file("a.txt", 4096),
            CompressionMethod::Stored
        );
    }
}
