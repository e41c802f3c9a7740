use crate::archive::format::{WriteOptions, ENTRY_SEPARATOR};
use crate::entry::{Blob, EntryDescriptor};
use crate::error::Result;
use crate::manifest::{Manifest, MANIFEST_NAME};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::ZipWriter;

/// Normalize path to forward slashes (cross-platform compatibility)
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Archive writer producing ZIP containers with an optional leading manifest
pub struct ArchiveWriter {
    zip: ZipWriter<BufWriter<File>>,
    options: WriteOptions,
    entry_count: usize,
}

impl ArchiveWriter {
    /// Create (or truncate) an archive file.
    ///
    /// When a manifest is given it is written as the first entry.
    pub fn create<P: AsRef<Path>>(
        path: P,
        options: WriteOptions,
        manifest: Option<&Manifest>,
    ) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = Self {
            zip: ZipWriter::new(BufWriter::new(file)),
            options,
            entry_count: 0,
        };

        if let Some(manifest) = manifest {
            writer.add_file(MANIFEST_NAME, &manifest.to_bytes())?;
        }

        Ok(writer)
    }

    /// Add a directory marker entry
    pub fn add_directory(&mut self, path: &str) -> Result<()> {
        let mut normalized_path = normalize_path(path);
        if !normalized_path.ends_with(ENTRY_SEPARATOR) {
            normalized_path.push(ENTRY_SEPARATOR);
        }

        self.zip
            .add_directory(normalized_path, self.options.for_directory())?;
        self.entry_count += 1;
        Ok(())
    }

    /// Add a file with content
    pub fn add_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let normalized_path = normalize_path(path);
        let options = self.options.for_entry(&normalized_path, data.len());

        self.zip.start_file(normalized_path, options)?;
        self.zip.write_all(data)?;
        self.entry_count += 1;
        Ok(())
    }

    /// Add one virtual archive entry; absent content on a non-directory writes an empty file
    pub fn add_entry(&mut self, entry: &EntryDescriptor, content: Option<&Blob>) -> Result<()> {
        if entry.is_directory() {
            self.add_directory(entry.name())
        } else {
            self.add_file(entry.name(), content.map(Blob::as_bytes).unwrap_or_default())
        }
    }

    /// Number of entries written so far, manifest included
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Write the central directory and flush everything to disk
    pub fn finalize(self) -> Result<()> {
        let mut inner = self.zip.finish()?;
        inner.flush()?;
        Ok(())
    }
}
