//! Archive configuration loaded from TOML
//!
//! ```toml
//! generate_manifest = true
//! compression = "deflated"
//! unix_permissions = 0o644
//! created_by = "my-build"
//!
//! [properties]
//! Bundle-Name = "Example"
//! ```

use crate::archive::{CompressionMethod, WriteOptions};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings applied when a [`FileArchive`](crate::FileArchive) is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Synthesize a manifest on save unless one was supplied explicitly
    pub generate_manifest: bool,

    /// Compression for written entries
    pub compression: CompressionMethod,

    /// Unix mode bits stored on written entries
    pub unix_permissions: Option<u32>,

    /// `Created-By` value used by the default synthesizer
    pub created_by: Option<String>,

    /// Attributes merged into the manifest before the first save
    pub properties: BTreeMap<String, String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            generate_manifest: true,
            compression: CompressionMethod::default(),
            unix_permissions: None,
            created_by: None,
            properties: BTreeMap::new(),
        }
    }
}

impl ArchiveConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            compression: self.compression,
            unix_permissions: self.unix_permissions,
        }
    }
}
