use crate::entry::{Blob, EntryDescriptor};
use crate::error::Result;
use crate::manifest::{Manifest, MANIFEST_NAME};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

/// Normalize path to forward slashes (cross-platform compatibility)
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Archive reader over a ZIP container
pub struct ArchiveReader {
    zip: ZipArchive<BufReader<File>>,
    entry_list: Vec<String>,
    entry_set: HashSet<String>,
}

impl ArchiveReader {
    /// Open an archive file and read its central directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;

        let mut entry_list = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip.by_index(index)?;
            entry_list.push(file.name().to_string());
        }
        let entry_set = entry_list.iter().cloned().collect();

        Ok(Self {
            zip,
            entry_list,
            entry_set,
        })
    }

    /// Get number of entries in archive, manifest included
    pub fn entry_count(&self) -> usize {
        self.entry_list.len()
    }

    /// List all entry names in archive order
    pub fn list_files(&self) -> &[String] {
        &self.entry_list
    }

    /// Check if an entry exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.entry_set.contains(&normalize_path(path))
    }

    /// Read an entry's content
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.zip.by_name(&normalize_path(path))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read and parse the manifest resource, if present
    pub fn manifest(&mut self) -> Result<Option<Manifest>> {
        if !self.contains(MANIFEST_NAME) {
            return Ok(None);
        }

        let data = self.read_file(MANIFEST_NAME)?;
        Manifest::parse(&data).map(Some)
    }

    /// Read every entry with its content, skipping the manifest resource.
    ///
    /// Directory entries come back with absent content.
    pub fn load_entries(&mut self) -> Result<Vec<(EntryDescriptor, Option<Blob>)>> {
        let mut entries = Vec::with_capacity(self.entry_list.len());

        for index in 0..self.zip.len() {
            let mut file = self.zip.by_index(index)?;
            let name = file.name().to_string();
            if name.eq_ignore_ascii_case(MANIFEST_NAME) {
                continue;
            }

            if file.is_dir() {
                entries.push((EntryDescriptor::new(&name), None));
            } else {
                let mut data = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut data)?;
                entries.push((EntryDescriptor::new(&name), Some(Blob::new(data))));
            }
        }

        Ok(entries)
    }
}
