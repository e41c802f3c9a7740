use crate::classpath::ClassResolver;
use crate::entry::{Blob, EntryDescriptor};
use crate::error::Result;
use crate::manifest::Manifest;
use std::collections::BTreeMap;
use std::path::Path;

/// Operations shared by the in-memory and the file-backed archive.
///
/// Every mutation fails fast: the failing entry is never inserted, but
/// multi-entry operations ([`add_directory`](Self::add_directory),
/// [`add_package`](Self::add_package)) keep the entries added before the
/// failure.
pub trait ArchiveManager {
    /// Insert an entry without content.
    ///
    /// Fails with `DuplicateEntry` if the name exists and `MalformedEntry` if
    /// the directory flag disagrees with the trailing `/` of the name.
    fn add_entry(&mut self, entry: EntryDescriptor) -> Result<()>;

    /// Insert a content entry. Directory descriptors fail with `InvalidTarget`.
    fn add_content(&mut self, entry: EntryDescriptor, content: Blob) -> Result<()>;

    /// Read `path` fully and insert it as a content entry
    fn add_file(&mut self, path: &Path, entry: EntryDescriptor) -> Result<()>;

    /// Mirror the subtree below `root`, one entry per descendant directory and file
    fn add_directory(&mut self, root: &Path) -> Result<()>;

    /// Add the compiled artifact of one type plus its namespace directory
    fn add_class(&mut self, resolver: &dyn ClassResolver, type_name: &str) -> Result<()>;

    /// Add every compiled artifact sharing the namespace of `representative`
    fn add_package(&mut self, resolver: &dyn ClassResolver, representative: &str) -> Result<()>;

    /// Replace the manifest wholesale
    fn add_manifest(&mut self, manifest: Manifest);

    /// Merge attributes into the main section, overwriting on collision
    fn add_properties_to_manifest(&mut self, properties: &BTreeMap<String, String>) -> Result<()>;

    fn entries(&self) -> Vec<&EntryDescriptor>;

    fn entries_with_content(&self) -> Vec<(&EntryDescriptor, Option<&Blob>)>;

    /// `None` when no entry has this name
    fn find_entry_by_name(&self, name: &str) -> Option<(&EntryDescriptor, Option<&Blob>)>;

    /// Remove by exact name; returns whether something was removed
    fn remove_entry_by_name(&mut self, name: &str) -> bool;

    fn remove_entry(&mut self, entry: &EntryDescriptor) -> bool {
        self.remove_entry_by_name(entry.name())
    }

    fn manifest(&self) -> &Manifest;

    /// Whether `save` embeds a synthesized manifest
    fn set_generate_manifest(&mut self, generate: bool);

    /// Persist the archive
    fn save(&mut self) -> Result<()>;

    /// Write every entry below `target`
    fn extract(&self, target: &Path) -> Result<()>;
}
