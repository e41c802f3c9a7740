//! Replay archive entries onto the file system

use crate::entry::{Blob, EntryDescriptor};
use crate::error::{ArchiveError, Result};
use crate::manager::ArchiveManager;
use crate::names;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Extract every entry of an archive below `target`.
///
/// Returns the number of entries written. The first failure aborts the
/// extraction; entries written before it stay on disk.
pub fn extract<A: ArchiveManager + ?Sized>(archive: &A, target: &Path) -> Result<usize> {
    extract_entries(archive.entries_with_content(), target)
}

/// Extract `(descriptor, content)` pairs below `target`
pub fn extract_entries<'a, I>(entries: I, target: &Path) -> Result<usize>
where
    I: IntoIterator<Item = (&'a EntryDescriptor, Option<&'a Blob>)>,
{
    info!(target = %target.display(), "Extracting archive");

    let mut count = 0;
    for (entry, content) in entries {
        extract_entry(entry, content, target).map_err(|source| {
            ArchiveError::ExtractionFailure {
                entry: entry.name().to_string(),
                source,
            }
        })?;
        count += 1;
    }

    info!(target = %target.display(), entries = count, "Extraction complete");
    Ok(count)
}

fn extract_entry(entry: &EntryDescriptor, content: Option<&Blob>, target: &Path) -> io::Result<()> {
    let relative = names::entry_name_to_relative_path(entry.name());
    if !names::is_contained(&relative) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "entry path escapes the target directory",
        ));
    }

    let destination = target.join(&relative);
    debug!(entry = entry.name(), path = %destination.display(), "Extracting entry");

    if entry.is_directory() {
        return fs::create_dir_all(&destination);
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&destination, content.map(Blob::as_bytes).unwrap_or_default())
}
