//! Lookup of compiled type artifacts
//!
//! Archives never search for compiled artifacts themselves. They ask a
//! [`ClassResolver`], so callers can plug in whatever lookup their build uses.
//! [`ClassPath`] is the plain directory-based one.

use crate::error::{ArchiveError, Result};
use crate::names::{self, CLASS_FILE_EXTENSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves qualified type names to the files holding their compiled artifacts
pub trait ClassResolver {
    /// Locate the compiled artifact of `type_name` (e.g. `org.example.Type`)
    fn locate(&self, type_name: &str) -> Result<PathBuf>;

    /// Every compiled artifact in the same namespace as `type_name`, itself included.
    ///
    /// The default lists the directory that holds the located artifact.
    fn siblings(&self, type_name: &str) -> Result<Vec<PathBuf>> {
        let artifact = self.locate(type_name)?;
        let dir = artifact.parent().unwrap_or_else(|| Path::new("."));

        let not_found = |source: io::Error| ArchiveError::SourceNotFound {
            path: dir.to_path_buf(),
            source,
        };

        let mut found = Vec::new();
        for item in fs::read_dir(dir).map_err(not_found)? {
            let path = item.map_err(not_found)?.path();
            let is_artifact = path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(CLASS_FILE_EXTENSION))
                .unwrap_or(false);
            if is_artifact && path.is_file() {
                found.push(path);
            }
        }

        found.sort();
        Ok(found)
    }
}

/// Directory-based class path: each root holds artifacts laid out by namespace
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    roots: Vec<PathBuf>,
}

impl ClassPath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ClassResolver for ClassPath {
    fn locate(&self, type_name: &str) -> Result<PathBuf> {
        let entry_name = names::class_entry_name(type_name);

        if !type_name.is_empty() {
            let relative = names::entry_name_to_relative_path(&entry_name);
            if let Some(found) = self
                .roots
                .iter()
                .map(|root| root.join(&relative))
                .find(|candidate| candidate.is_file())
            {
                return Ok(found);
            }
        }

        Err(ArchiveError::SourceNotFound {
            path: PathBuf::from(entry_name),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                format!("type '{}' not found on class path", type_name),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn class_tree() -> TempDir {
        let root = TempDir::new().unwrap();
        let pkg = root.path().join("org").join("example");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("A.class"), b"A").unwrap();
        fs::write(pkg.join("B.class"), b"B").unwrap();
        fs::write(pkg.join("notes.txt"), b"not an artifact").unwrap();
        root
    }

    #[test]
    fn test_locate_searches_roots_in_order() {
        let empty = TempDir::new().unwrap();
        let tree = class_tree();
        let class_path = ClassPath::new([empty.path(), tree.path()]);

        let found = class_path.locate("org.example.A").unwrap();
        assert_eq!(found, tree.path().join("org").join("example").join("A.class"));
    }

    #[test]
    fn test_locate_missing_type() {
        let tree = class_tree();
        let class_path = ClassPath::new([tree.path()]);

        assert!(matches!(
            class_path.locate("org.example.Missing"),
            Err(ArchiveError::SourceNotFound { .. })
        ));
        assert!(class_path.locate("").is_err());
    }

    #[test]
    fn test_siblings_only_artifacts() {
        let tree = class_tree();
        let class_path = ClassPath::new([tree.path()]);

        let siblings = class_path.siblings("org.example.A").unwrap();
        let names: Vec<_> = siblings
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.class", "B.class"]);
    }
}
