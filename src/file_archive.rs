//! File-backed archive with two-pass persistence
//!
//! # Save protocol
//!
//! Manifest synthesis inspects the archive's own contents, so the manifest
//! cannot exist before the body has been written. [`FileArchive::save`]
//! therefore:
//!
//! 1. writes every entry without a manifest and closes the file,
//! 2. runs the [`ManifestSynthesizer`] over that file unless a manifest was
//!    supplied through [`ArchiveManager::add_manifest`],
//! 3. rewrites the file with a manifest as its first entry: the synthesized one,
//!    or the caller's attributes when generation is off.
//!
//! The synthesizer always receives the caller's attributes, never the output
//! of an earlier save, so inferred attributes are recomputed every time.
//!
//! The output handle is released on every path out of `save`. Faults while
//! releasing it are logged and never replace the primary error.

use crate::archive::{ArchiveReader, ArchiveWriter, WriteOptions};
use crate::classpath::ClassResolver;
use crate::config::ArchiveConfig;
use crate::entry::{Blob, EntryDescriptor};
use crate::error::{ArchiveError, Result};
use crate::extract;
use crate::manager::ArchiveManager;
use crate::manifest::Manifest;
use crate::synth::{ManifestSynthesizer, PackageAnalyzer};
use crate::virtual_archive::VirtualArchive;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle of the durable output handle
enum OutputState {
    Unopened,
    Open(ArchiveWriter),
    Closed,
}

impl OutputState {
    fn name(&self) -> &'static str {
        match self {
            OutputState::Unopened => "unopened",
            OutputState::Open(_) => "open",
            OutputState::Closed => "closed",
        }
    }
}

/// Archive persisted to a file on [`save`](ArchiveManager::save)
pub struct FileArchive {
    path: PathBuf,
    archive: VirtualArchive,
    output: OutputState,
    options: WriteOptions,
    synthesizer: Box<dyn ManifestSynthesizer>,
    /// Attributes supplied by the caller, kept apart from synthesized ones
    properties: Manifest,
    manifest_explicit: bool,
    generate_manifest: bool,
}

impl FileArchive {
    /// Open an archive at `path`.
    ///
    /// An existing file is copied into memory (entries only; the manifest is
    /// regenerated or re-supplied on save). Otherwise the archive starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, &ArchiveConfig::default())
    }

    /// Open an archive with explicit configuration
    pub fn with_config<P: AsRef<Path>>(path: P, config: &ArchiveConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let archive = if path.exists() {
            let mut reader = ArchiveReader::open(&path)?;
            let archive = VirtualArchive::from_reader(&mut reader)?;
            debug!(path = %path.display(), entries = archive.len(), "Loaded existing archive");
            archive
        } else {
            VirtualArchive::new()
        };

        let mut analyzer = PackageAnalyzer::new();
        if let Some(created_by) = &config.created_by {
            analyzer = analyzer.with_created_by(created_by.as_str());
        }

        let mut file_archive = Self {
            path,
            archive,
            output: OutputState::Unopened,
            options: config.write_options(),
            synthesizer: Box::new(analyzer),
            properties: Manifest::new(),
            manifest_explicit: false,
            generate_manifest: config.generate_manifest,
        };
        file_archive.add_properties_to_manifest(&config.properties)?;

        Ok(file_archive)
    }

    /// Replace the manifest synthesizer
    pub fn with_synthesizer(mut self, synthesizer: impl ManifestSynthesizer + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the caller supplied the manifest through `add_manifest`
    pub fn is_manifest_explicit(&self) -> bool {
        self.manifest_explicit
    }

    pub fn generates_manifest(&self) -> bool {
        self.generate_manifest
    }

    /// Attributes supplied by the caller, without anything synthesized
    pub fn properties(&self) -> &Manifest {
        &self.properties
    }

    /// The in-memory state that `save` persists
    pub fn virtual_archive(&self) -> &VirtualArchive {
        &self.archive
    }

    pub fn into_virtual_archive(self) -> VirtualArchive {
        self.archive
    }

    /// Open a fresh output handle and write every entry through it.
    ///
    /// The handle stays open (and owned by `self.output`) even if writing fails.
    fn write_pass(&mut self, manifest: Option<&Manifest>) -> Result<()> {
        self.close_output()?;
        info!(
            path = %self.path.display(),
            with_manifest = manifest.is_some(),
            "Writing archive pass"
        );

        let mut writer = ArchiveWriter::create(&self.path, self.options, manifest)?;
        let written = self
            .archive
            .entries_with_content()
            .into_iter()
            .try_for_each(|(entry, content)| writer.add_entry(entry, content));
        self.output = OutputState::Open(writer);
        written
    }

    fn close_output(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.output, OutputState::Closed) {
            OutputState::Open(writer) => {
                let entries = writer.entry_count();
                writer.finalize()?;
                debug!(path = %self.path.display(), entries, "Closed archive output");
                Ok(())
            }
            previous => {
                self.output = previous;
                Ok(())
            }
        }
    }

    fn close_output_quietly(&mut self) {
        if let Err(err) = self.close_output() {
            warn!(path = %self.path.display(), error = %err, "Failed to close archive output");
        }
    }

    fn save_passes(&mut self) -> Result<()> {
        // First pass: body only, so the synthesizer sees a complete archive
        self.write_pass(None)?;
        self.close_output()?;

        if !self.manifest_explicit {
            let mut reader = ArchiveReader::open(&self.path)?;
            let synthesized = self.synthesizer.synthesize(&mut reader, &self.properties)?;
            debug!(attributes = synthesized.main.len(), "Synthesized manifest");
            // Stored without marking it explicit: the next save synthesizes again
            self.archive.add_manifest(synthesized);
        }

        let manifest = if self.generate_manifest {
            self.archive.manifest().clone()
        } else {
            self.properties.clone()
        };
        self.write_pass(Some(&manifest))?;
        self.close_output()
    }
}

impl ArchiveManager for FileArchive {
    fn add_entry(&mut self, entry: EntryDescriptor) -> Result<()> {
        self.archive.add_entry(entry)
    }

    fn add_content(&mut self, entry: EntryDescriptor, content: Blob) -> Result<()> {
        self.archive.add_content(entry, content)
    }

    fn add_file(&mut self, path: &Path, entry: EntryDescriptor) -> Result<()> {
        self.archive.add_file(path, entry)
    }

    fn add_directory(&mut self, root: &Path) -> Result<()> {
        self.archive.add_directory(root)
    }

    fn add_class(&mut self, resolver: &dyn ClassResolver, type_name: &str) -> Result<()> {
        self.archive.add_class(resolver, type_name)
    }

    fn add_package(&mut self, resolver: &dyn ClassResolver, representative: &str) -> Result<()> {
        self.archive.add_package(resolver, representative)
    }

    fn add_manifest(&mut self, manifest: Manifest) {
        self.manifest_explicit = true;
        self.properties = manifest.clone();
        self.archive.add_manifest(manifest);
    }

    fn add_properties_to_manifest(&mut self, properties: &BTreeMap<String, String>) -> Result<()> {
        // Validates every pair before either manifest changes
        self.archive.add_properties_to_manifest(properties)?;
        for (key, value) in properties {
            self.properties.insert(key.as_str(), value.as_str())?;
        }
        Ok(())
    }

    fn entries(&self) -> Vec<&EntryDescriptor> {
        self.archive.entries()
    }

    fn entries_with_content(&self) -> Vec<(&EntryDescriptor, Option<&Blob>)> {
        self.archive.entries_with_content()
    }

    fn find_entry_by_name(&self, name: &str) -> Option<(&EntryDescriptor, Option<&Blob>)> {
        self.archive.find_entry_by_name(name)
    }

    fn remove_entry_by_name(&mut self, name: &str) -> bool {
        self.archive.remove_entry_by_name(name)
    }

    fn manifest(&self) -> &Manifest {
        self.archive.manifest()
    }

    fn set_generate_manifest(&mut self, generate: bool) {
        self.generate_manifest = generate;
    }

    fn save(&mut self) -> Result<()> {
        info!(
            path = %self.path.display(),
            entries = self.archive.len(),
            output = self.output.name(),
            "Saving archive"
        );

        let result = self.save_passes();
        self.close_output_quietly();

        match result {
            Ok(()) => {
                info!(path = %self.path.display(), "Archive saved");
                Ok(())
            }
            Err(source) => Err(ArchiveError::PersistenceFailure {
                path: self.path.clone(),
                source: Box::new(source),
            }),
        }
    }

    fn extract(&self, target: &Path) -> Result<()> {
        extract::extract(&self.archive, target).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn test_output_state_transitions() {
        let dir = TempDir::new().unwrap();
        let mut archive = FileArchive::open(dir.path().join("state.jar")).unwrap();
        assert_eq!(archive.output.name(), "unopened");

        archive.write_pass(None).unwrap();
        assert_eq!(archive.output.name(), "open");

        archive.close_output().unwrap();
        assert_eq!(archive.output.name(), "closed");

        // Closing twice is harmless
        archive.close_output().unwrap();
        assert_eq!(archive.output.name(), "closed");
    }

    #[test]
    fn test_synthesized_manifest_is_not_explicit() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let mut archive = FileArchive::open(dir.path().join("twice.jar"))
            .unwrap()
            .with_synthesizer(move |_: &mut ArchiveReader, _: &Manifest| -> Result<Manifest> {
                counter.set(counter.get() + 1);
                Manifest::from_pairs([("Manifest-Version", "1.0")])
            });
        archive
            .add_content(EntryDescriptor::new("a.txt"), Blob::from("x"))
            .unwrap();

        archive.save().unwrap();
        assert!(!archive.is_manifest_explicit());
        archive.save().unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_explicit_manifest_skips_synthesis() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let mut archive = FileArchive::open(dir.path().join("explicit.jar"))
            .unwrap()
            .with_synthesizer(move |_: &mut ArchiveReader, _: &Manifest| -> Result<Manifest> {
                counter.set(counter.get() + 1);
                Ok(Manifest::new())
            });
        archive.add_manifest(Manifest::from_pairs([("K", "V")]).unwrap());
        archive.save().unwrap();

        assert!(archive.is_manifest_explicit());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_config_properties_seed_manifest() {
        let dir = TempDir::new().unwrap();
        let mut config = ArchiveConfig::default();
        config
            .properties
            .insert("Bundle-Name".to_string(), "Seeded".to_string());

        let archive = FileArchive::with_config(dir.path().join("seeded.jar"), &config).unwrap();
        assert_eq!(archive.manifest().get("Bundle-Name"), Some("Seeded"));
        assert_eq!(archive.properties().get("Bundle-Name"), Some("Seeded"));
        assert!(!archive.is_manifest_explicit());
    }

    #[test]
    fn test_synthesizer_sees_caller_properties_only() {
        let dir = TempDir::new().unwrap();
        let mut archive = FileArchive::open(dir.path().join("props.jar"))
            .unwrap()
            .with_synthesizer(|_: &mut ArchiveReader, properties: &Manifest| -> Result<Manifest> {
                // Fails if an earlier synthesized manifest leaked back in
                assert!(properties.get("Synthesized").is_none());
                let mut manifest = properties.clone();
                manifest.insert("Synthesized", "true")?;
                Ok(manifest)
            });

        archive.save().unwrap();
        assert_eq!(archive.manifest().get("Synthesized"), Some("true"));
        assert!(archive.properties().is_empty());

        archive.save().unwrap();
    }
}
