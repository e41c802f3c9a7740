//! Entry descriptors and content blobs
//!
//! An [`EntryDescriptor`] names one slot in an archive. Its identity is the
//! entry name alone: the directory flag is carried for validation but never
//! participates in equality or hashing.

use crate::error::{ArchiveError, Result};
use crate::names::DIRECTORY_SUFFIX;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalize path to forward slashes (cross-platform compatibility)
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// Identifies one logical item in an archive
#[derive(Debug, Clone, Eq)]
pub struct EntryDescriptor {
    name: String,
    is_directory: bool,
}

impl EntryDescriptor {
    /// Create a descriptor whose directory flag is derived from a trailing `/`
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = normalize_name(name.as_ref());
        let is_directory = name.ends_with(DIRECTORY_SUFFIX);
        Self { name, is_directory }
    }

    /// Create a directory descriptor, appending the trailing `/` if missing
    pub fn directory(name: impl AsRef<str>) -> Self {
        let mut name = normalize_name(name.as_ref());
        if !name.ends_with(DIRECTORY_SUFFIX) {
            name.push_str(DIRECTORY_SUFFIX);
        }
        Self {
            name,
            is_directory: true,
        }
    }

    /// Create a descriptor with an explicit directory flag.
    ///
    /// The flag is not reconciled with the name; archives reject descriptors
    /// where the two disagree.
    pub fn with_flag(name: impl AsRef<str>, is_directory: bool) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            is_directory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Check the name/flag pair before the descriptor enters an archive
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name == DIRECTORY_SUFFIX {
            return Err(ArchiveError::malformed(&self.name, "entry name is empty"));
        }
        if self.is_directory != self.name.ends_with(DIRECTORY_SUFFIX) {
            let reason = if self.is_directory {
                "directory entry name must end with '/'"
            } else {
                "content entry name must not end with '/'"
            };
            return Err(ArchiveError::malformed(&self.name, reason));
        }
        Ok(())
    }
}

impl PartialEq for EntryDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for EntryDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for EntryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Immutable byte content of an entry, compared by value
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("len", &self.bytes.len()).finish()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for Blob {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_directory_flag() {
        let a = EntryDescriptor::with_flag("dir/", true);
        let b = EntryDescriptor::with_flag("dir/", false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flag_derived_from_name() {
        assert!(EntryDescriptor::new("a/b/").is_directory());
        assert!(!EntryDescriptor::new("a/b.txt").is_directory());
        assert_eq!(EntryDescriptor::directory("pkg").name(), "pkg/");
    }

    #[test]
    fn test_backslashes_normalized() {
        let entry = EntryDescriptor::new("a\\b\\c.txt");
        assert_eq!(entry.name(), "a/b/c.txt");
    }

    #[test]
    fn test_validate_rejects_inconsistent_flag() {
        let bad_dir = EntryDescriptor::with_flag("file.txt", true);
        assert!(matches!(
            bad_dir.validate(),
            Err(ArchiveError::MalformedEntry { .. })
        ));

        let bad_file = EntryDescriptor::with_flag("dir/", false);
        assert!(matches!(
            bad_file.validate(),
            Err(ArchiveError::MalformedEntry { .. })
        ));

        assert!(EntryDescriptor::new("").validate().is_err());
        assert!(EntryDescriptor::new("ok/").validate().is_ok());
    }

    #[test]
    fn test_blob_value_equality() {
        let a = Blob::from("content");
        let b = Blob::new(b"content".to_vec());
        assert_eq!(a, b);
        assert_ne!(a, Blob::from("other"));
        assert_eq!(format!("{:?}", a), "Blob { len: 7 }");
    }
}
