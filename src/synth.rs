//! Manifest synthesis from a written archive
//!
//! A synthesizer receives the archive as it was written by the first save
//! pass (no manifest resource) and the attributes the caller supplied, and
//! returns the manifest to embed in the final archive.

use crate::archive::ArchiveReader;
use crate::error::Result;
use crate::manifest::{Manifest, CREATED_BY, EXPORT_PACKAGE, MANIFEST_VERSION};
use crate::names::{self, CLASS_FILE_EXTENSION, DIRECTORY_SUFFIX};
use std::collections::BTreeSet;

/// Computes a manifest from archive contents plus the caller-supplied attributes
pub trait ManifestSynthesizer {
    fn synthesize(&self, archive: &mut ArchiveReader, properties: &Manifest) -> Result<Manifest>;
}

impl<F> ManifestSynthesizer for F
where
    F: Fn(&mut ArchiveReader, &Manifest) -> Result<Manifest>,
{
    fn synthesize(&self, archive: &mut ArchiveReader, properties: &Manifest) -> Result<Manifest> {
        self(archive, properties)
    }
}

/// Default synthesizer: version and origin attributes plus exported namespaces
#[derive(Debug, Clone)]
pub struct PackageAnalyzer {
    created_by: String,
}

impl PackageAnalyzer {
    pub fn new() -> Self {
        Self {
            created_by: format!("jarsmith {}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }
}

impl Default for PackageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestSynthesizer for PackageAnalyzer {
    fn synthesize(&self, archive: &mut ArchiveReader, properties: &Manifest) -> Result<Manifest> {
        let mut manifest = Manifest::new();
        manifest.insert(MANIFEST_VERSION, "1.0")?;
        manifest.insert(CREATED_BY, self.created_by.as_str())?;

        // Caller-supplied attributes win over the defaults above
        manifest.main.merge(&properties.main);
        manifest.sections = properties.sections.clone();

        if !manifest.main.contains_key(EXPORT_PACKAGE) {
            let packages = exported_packages(archive.list_files());
            if !packages.is_empty() {
                manifest.insert(EXPORT_PACKAGE, packages.join(","))?;
            }
        }

        Ok(manifest)
    }
}

/// Dotted namespaces of every directory holding a compiled artifact, sorted
fn exported_packages(entry_names: &[String]) -> Vec<String> {
    entry_names
        .iter()
        .filter(|name| name.ends_with(CLASS_FILE_EXTENSION))
        .filter_map(|name| name.rsplit_once(DIRECTORY_SUFFIX))
        .map(|(dir, _)| names::entry_name_to_qualified(dir))
        .filter(|package| !package.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveWriter, WriteOptions};
    use tempfile::NamedTempFile;

    fn archive_with(names: &[&str]) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        let mut writer =
            ArchiveWriter::create(temp_file.path(), WriteOptions::default(), None).unwrap();
        for name in names {
            if name.ends_with('/') {
                writer.add_directory(name).unwrap();
            } else {
                writer.add_file(name, b"data").unwrap();
            }
        }
        writer.finalize().unwrap();
        temp_file
    }

    #[test]
    fn test_exported_packages() {
        let names: Vec<String> = [
            "org/example/b/B.class",
            "org/example/a/A.class",
            "org/example/a/A2.class",
            "Root.class",
            "org/example/c/readme.txt",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            exported_packages(&names),
            vec!["org.example.a".to_string(), "org.example.b".to_string()]
        );
    }

    #[test]
    fn test_analyzer_defaults_and_exports() {
        let temp_file = archive_with(&["org/", "org/example/", "org/example/A.class"]);
        let mut reader = ArchiveReader::open(temp_file.path()).unwrap();

        let manifest = PackageAnalyzer::new()
            .with_created_by("tests")
            .synthesize(&mut reader, &Manifest::new())
            .unwrap();

        assert_eq!(manifest.get(MANIFEST_VERSION), Some("1.0"));
        assert_eq!(manifest.get(CREATED_BY), Some("tests"));
        assert_eq!(manifest.get(EXPORT_PACKAGE), Some("org.example"));
    }

    #[test]
    fn test_analyzer_keeps_caller_properties() {
        let temp_file = archive_with(&["pkg/A.class"]);
        let mut reader = ArchiveReader::open(temp_file.path()).unwrap();
        let properties =
            Manifest::from_pairs([("Export-Package", "custom"), ("Bundle-Name", "demo")]).unwrap();

        let manifest = PackageAnalyzer::new()
            .synthesize(&mut reader, &properties)
            .unwrap();

        assert_eq!(manifest.get(EXPORT_PACKAGE), Some("custom"));
        assert_eq!(manifest.get("Bundle-Name"), Some("demo"));
    }

    #[test]
    fn test_closure_synthesizer() {
        let temp_file = archive_with(&["a.txt"]);
        let mut reader = ArchiveReader::open(temp_file.path()).unwrap();

        let synth = |reader: &mut ArchiveReader, _: &Manifest| {
            Manifest::from_pairs([("Entries", reader.entry_count().to_string())])
        };
        let manifest = synth.synthesize(&mut reader, &Manifest::new()).unwrap();
        assert_eq!(manifest.get("Entries"), Some("1"));
    }
}
