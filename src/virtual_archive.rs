//! In-memory archive under construction
//!
//! A [`VirtualArchive`] maps entry names to descriptors and optional content.
//! Nothing here touches durable storage except reading the sources that get
//! added. Use [`FileArchive`](crate::FileArchive) to persist.

use crate::archive::ArchiveReader;
use crate::classpath::ClassResolver;
use crate::entry::{self, Blob, EntryDescriptor};
use crate::error::{ArchiveError, Result};
use crate::manager::ArchiveManager;
use crate::manifest::{Attributes, Manifest, MANIFEST_NAME};
use crate::names;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error};
use walkdir::WalkDir;

/// In-memory archive: entries keyed by name plus a manifest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualArchive {
    entries: BTreeMap<String, (EntryDescriptor, Option<Blob>)>,
    manifest: Manifest,
}

impl VirtualArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every entry of an existing archive. Its manifest is not copied.
    pub fn from_reader(reader: &mut ArchiveReader) -> Result<Self> {
        let mut archive = Self::new();
        for (entry, content) in reader.load_entries()? {
            match content {
                Some(content) => archive.add_content(entry, content)?,
                None => archive.add_entry(entry)?,
            }
        }
        Ok(archive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&entry::normalize_name(name))
    }

    /// The manifest resource is written by `save`, never stored as an entry
    fn check_not_reserved(entry: &EntryDescriptor) -> Result<()> {
        if entry.name().eq_ignore_ascii_case(MANIFEST_NAME) {
            return Err(ArchiveError::ReservedEntry(entry.name().to_string()));
        }
        Ok(())
    }

    fn check_not_duplicated(&self, entry: &EntryDescriptor) -> Result<()> {
        if self.entries.contains_key(entry.name()) {
            return Err(ArchiveError::DuplicateEntry(entry.name().to_string()));
        }
        Ok(())
    }

    fn check_is_content(entry: &EntryDescriptor) -> Result<()> {
        if entry.is_directory() {
            return Err(ArchiveError::InvalidTarget(entry.name().to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, entry: EntryDescriptor, content: Option<Blob>) {
        debug!(
            entry = entry.name(),
            size = content.as_ref().map(Blob::len),
            "Added entry"
        );
        self.entries
            .insert(entry.name().to_string(), (entry, content));
    }

    /// Add a namespace directory entry, tolerating one that already exists
    fn add_namespace_entry(&mut self, name: &str) -> Result<()> {
        if self.entries.contains_key(name) {
            debug!(entry = name, "Namespace directory already present");
            return Ok(());
        }
        self.add_entry(EntryDescriptor::directory(name))
    }
}

/// Map a walk failure to an I/O error, keeping it apart from unreadable sources
fn walk_error(err: walkdir::Error) -> ArchiveError {
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    ArchiveError::Io(source)
}

impl ArchiveManager for VirtualArchive {
    fn add_entry(&mut self, entry: EntryDescriptor) -> Result<()> {
        Self::check_not_reserved(&entry)?;
        self.check_not_duplicated(&entry)?;
        entry.validate()?;
        self.insert(entry, None);
        Ok(())
    }

    fn add_content(&mut self, entry: EntryDescriptor, content: Blob) -> Result<()> {
        Self::check_not_reserved(&entry)?;
        self.check_not_duplicated(&entry)?;
        Self::check_is_content(&entry)?;
        entry.validate()?;
        self.insert(entry, Some(content));
        Ok(())
    }

    fn add_file(&mut self, path: &Path, entry: EntryDescriptor) -> Result<()> {
        Self::check_not_reserved(&entry)?;
        self.check_not_duplicated(&entry)?;
        Self::check_is_content(&entry)?;
        entry.validate()?;

        let content = fs::read(path).map_err(|source| ArchiveError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        self.insert(entry, Some(Blob::new(content)));
        Ok(())
    }

    fn add_directory(&mut self, root: &Path) -> Result<()> {
        if !root.is_dir() {
            return Err(ArchiveError::SourceNotFound {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            });
        }

        // Sorted walk visits each directory before anything inside it
        for item in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let item = item.map_err(walk_error)?;
            let relative = item.path().strip_prefix(root).unwrap_or(item.path());
            let name = names::path_to_entry_name(relative);

            let result = if item.file_type().is_dir() {
                self.add_entry(EntryDescriptor::directory(&name))
            } else {
                self.add_file(item.path(), EntryDescriptor::new(&name))
            };

            if let Err(err) = result {
                error!(
                    root = %root.display(),
                    path = %item.path().display(),
                    error = %err,
                    "Cannot add directory content"
                );
                return Err(err);
            }
        }

        Ok(())
    }

    fn add_class(&mut self, resolver: &dyn ClassResolver, type_name: &str) -> Result<()> {
        let artifact = resolver.locate(type_name)?;

        if let Some(dir) = names::namespace_entry_name(names::namespace_of(type_name)) {
            self.add_namespace_entry(&dir)?;
        }
        self.add_file(&artifact, EntryDescriptor::new(names::class_entry_name(type_name)))
    }

    fn add_package(&mut self, resolver: &dyn ClassResolver, representative: &str) -> Result<()> {
        let artifacts = resolver.siblings(representative)?;
        let dir = names::namespace_entry_name(names::namespace_of(representative));

        for artifact in artifacts {
            let file_name = match artifact.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let entry_name = match &dir {
                Some(dir) => {
                    self.add_namespace_entry(dir)?;
                    format!("{}{}", dir, file_name)
                }
                None => file_name,
            };
            self.add_file(&artifact, EntryDescriptor::new(entry_name))?;
        }

        Ok(())
    }

    fn add_manifest(&mut self, manifest: Manifest) {
        self.manifest = manifest;
    }

    fn add_properties_to_manifest(&mut self, properties: &BTreeMap<String, String>) -> Result<()> {
        // Validate everything before touching the manifest
        let mut validated = Attributes::new();
        for (key, value) in properties {
            validated.insert(key.as_str(), value.as_str())?;
        }
        self.manifest.main.merge(&validated);
        Ok(())
    }

    fn entries(&self) -> Vec<&EntryDescriptor> {
        self.entries.values().map(|(entry, _)| entry).collect()
    }

    fn entries_with_content(&self) -> Vec<(&EntryDescriptor, Option<&Blob>)> {
        self.entries
            .values()
            .map(|(entry, content)| (entry, content.as_ref()))
            .collect()
    }

    fn find_entry_by_name(&self, name: &str) -> Option<(&EntryDescriptor, Option<&Blob>)> {
        self.entries
            .get(&entry::normalize_name(name))
            .map(|(entry, content)| (entry, content.as_ref()))
    }

    fn remove_entry_by_name(&mut self, name: &str) -> bool {
        let name = entry::normalize_name(name);
        let removed = self.entries.remove(&name).is_some();
        if removed {
            debug!(entry = %name, "Removed entry");
        }
        removed
    }

    fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn set_generate_manifest(&mut self, _generate: bool) {}

    fn save(&mut self) -> Result<()> {
        Err(ArchiveError::NotSupported(
            "save is not available on an in-memory archive",
        ))
    }

    fn extract(&self, _target: &Path) -> Result<()> {
        Err(ArchiveError::NotSupported(
            "extract is not available on an in-memory archive",
        ))
    }
}
