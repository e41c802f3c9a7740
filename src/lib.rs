//! jarsmith: build, persist and extract Java-style archives
//!
//! This library assembles JAR archives in memory and writes them as ZIP files:
//! - In-memory archive model with name-keyed entries ([`VirtualArchive`])
//! - File-backed archive with two-pass save and manifest synthesis ([`FileArchive`])
//! - JAR manifest model with the 72-byte line wrapping wire format
//! - Class and package import through a pluggable [`ClassResolver`]
//!
//! # Example
//!
//! ```no_run
//! use jarsmith::{ArchiveManager, Blob, EntryDescriptor, FileArchive};
//!
//! // Build and persist an archive
//! let mut archive = FileArchive::open("example.jar")?;
//! archive.add_content(EntryDescriptor::new("data.txt"), Blob::from("Hello, World!"))?;
//! archive.save()?;
//!
//! // Replay it onto disk
//! archive.extract(std::path::Path::new("out"))?;
//! # Ok::<(), jarsmith::error::ArchiveError>(())
//! ```

// Core modules
pub mod archive;
pub mod classpath;
pub mod config;
pub mod entry;
pub mod error;
pub mod extract;
pub mod file_archive;
pub mod manager;
pub mod manifest;
pub mod names;
pub mod synth;
pub mod virtual_archive;

// Re-export commonly used types
pub use archive::{ArchiveReader, ArchiveWriter, CompressionMethod, WriteOptions};
pub use classpath::{ClassPath, ClassResolver};
pub use config::ArchiveConfig;
pub use entry::{Blob, EntryDescriptor};
pub use error::{ArchiveError, Result};
pub use file_archive::FileArchive;
pub use manager::ArchiveManager;
pub use manifest::{Attributes, Manifest, MANIFEST_NAME};
pub use synth::{ManifestSynthesizer, PackageAnalyzer};
pub use virtual_archive::VirtualArchive;
