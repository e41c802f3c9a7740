//! Manifest support for archives
//!
//! # Manifest Scope
//!
//! The manifest (`META-INF/MANIFEST.MF`) is an ordered set of textual
//! attributes describing the archive as a whole (the *main* attributes) plus
//! optional per-entry sections introduced by a `Name:` attribute.
//!
//! # Wire Format
//!
//! ```text
//! Manifest-Version: 1.0
//! Created-By: jarsmith
//! Export-Package: org.example.api,org.example.util
//!
//! Name: org/example/api/Service.class
//! Sealed: true
//!
//! ```
//!
//! - Lines end with CRLF; LF and CR alone are accepted when parsing
//! - A line holds at most 72 bytes; longer attributes continue on lines that
//!   start with a single space
//! - An empty line terminates every section, including the main one
//!
//! # Usage
//!
//! ```
//! use jarsmith::Manifest;
//! # use jarsmith::error::Result;
//!
//! # fn main() -> Result<()> {
//! let mut manifest = Manifest::new();
//! manifest.insert("Manifest-Version", "1.0")?;
//! manifest.insert("Main-Class", "org.example.App")?;
//!
//! let bytes = manifest.to_bytes();
//! assert_eq!(Manifest::parse(&bytes)?, manifest);
//! # Ok(())
//! # }
//! ```

use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry name of the manifest resource inside an archive
pub const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";

pub const MANIFEST_VERSION: &str = "Manifest-Version";
pub const CREATED_BY: &str = "Created-By";
pub const EXPORT_PACKAGE: &str = "Export-Package";

/// Attribute that opens a per-entry section
const SECTION_NAME: &str = "Name";

/// Maximum bytes per physical line, excluding the line terminator
const MAX_LINE_LENGTH: usize = 72;

/// Maximum length of an attribute name
const MAX_KEY_LENGTH: usize = 70;

const LINE_END: &str = "\r\n";

/// Ordered attribute map with case-insensitive keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, validating each one. Later keys overwrite earlier ones.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut attributes = Attributes::new();
        for (key, value) in pairs {
            attributes.insert(key, value)?;
        }
        Ok(attributes)
    }

    /// Insert or overwrite an attribute, keeping the original position on overwrite
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Option<String>> {
        let key = key.into();
        let value = value.into();
        validate_key(&key)?;
        validate_value(&key, &value)?;

        match self.position(&key) {
            Some(idx) => Ok(Some(std::mem::replace(&mut self.entries[idx].1, value))),
            None => {
                self.entries.push((key, value));
                Ok(None)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge every attribute of `other` into `self`, overwriting on collision
    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in &other.entries {
            match self.position(key) {
                Some(idx) => self.entries[idx].1 = value.clone(),
                None => self.entries.push((key.clone(), value.clone())),
            }
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }

    fn write_to(&self, out: &mut String) {
        // Version attribute always leads its section
        if let Some(version) = self.get(MANIFEST_VERSION) {
            write_wrapped(out, &format!("{}: {}", MANIFEST_VERSION, version));
        }
        for (key, value) in &self.entries {
            if key.eq_ignore_ascii_case(MANIFEST_VERSION) {
                continue;
            }
            write_wrapped(out, &format!("{}: {}", key, value));
        }
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value.as_str()))
    }
}

impl Eq for Attributes {}

/// Archive manifest: main attributes plus named per-entry sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Attributes describing the whole archive
    #[serde(default)]
    pub main: Attributes,

    /// Per-entry sections keyed by entry name
    #[serde(default)]
    pub sections: BTreeMap<String, Attributes>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest whose main section holds the given pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Manifest {
            main: Attributes::from_pairs(pairs)?,
            sections: BTreeMap::new(),
        })
    }

    /// Insert a main attribute
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Option<String>> {
        self.main.insert(key, value)
    }

    /// Look up a main attribute
    pub fn get(&self, key: &str) -> Option<&str> {
        self.main.get(key)
    }

    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    pub fn section(&self, name: &str) -> Option<&Attributes> {
        self.sections.get(name)
    }

    /// Get or create the section for an entry
    pub fn section_mut(&mut self, name: &str) -> &mut Attributes {
        self.sections.entry(name.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.sections.is_empty()
    }

    /// Serialize to the textual manifest format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        self.main.write_to(&mut out);
        out.push_str(LINE_END);

        for (name, attributes) in &self.sections {
            write_wrapped(&mut out, &format!("{}: {}", SECTION_NAME, name));
            attributes.write_to(&mut out);
            out.push_str(LINE_END);
        }

        out.into_bytes()
    }

    /// Parse the textual manifest format
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| ArchiveError::InvalidManifest(format!("not valid UTF-8: {}", e)))?;

        let mut blocks = split_blocks(text)?.into_iter();
        let mut manifest = Manifest::new();

        if let Some(main) = blocks.next() {
            for line in &main {
                let (key, value) = parse_attribute(line)?;
                manifest.main.insert(key, value)?;
            }
        }

        for block in blocks.filter(|b| !b.is_empty()) {
            let mut lines = block.iter();
            let (key, name) = match lines.next() {
                Some(first) => parse_attribute(first)?,
                None => continue,
            };
            if !key.eq_ignore_ascii_case(SECTION_NAME) {
                return Err(ArchiveError::InvalidManifest(format!(
                    "section must start with '{}:', found '{}'",
                    SECTION_NAME, key
                )));
            }

            let mut attributes = Attributes::new();
            for line in lines {
                let (key, value) = parse_attribute(line)?;
                attributes.insert(key, value)?;
            }
            manifest.sections.insert(name.to_string(), attributes);
        }

        Ok(manifest)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(ArchiveError::from)
    }

    /// Parse from JSON, applying the same key and value rules as [`insert`](Self::insert)
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Manifest = serde_json::from_slice(data)?;

        let mut manifest = Manifest {
            main: Attributes::from_pairs(raw.main.entries)?,
            sections: BTreeMap::new(),
        };
        for (name, attributes) in raw.sections {
            validate_value(SECTION_NAME, &name)?;
            manifest
                .sections
                .insert(name, Attributes::from_pairs(attributes.entries)?);
        }
        Ok(manifest)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid_chars = key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if key.is_empty() || key.len() > MAX_KEY_LENGTH || !valid_chars {
        return Err(ArchiveError::InvalidManifest(format!(
            "invalid attribute name '{}'",
            key
        )));
    }
    Ok(())
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n', '\0']) {
        return Err(ArchiveError::InvalidManifest(format!(
            "value of '{}' contains a line break or NUL",
            key
        )));
    }
    Ok(())
}

/// Write one logical line, wrapping at [`MAX_LINE_LENGTH`] bytes on char boundaries
fn write_wrapped(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_LENGTH;
    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str(LINE_END);
            return;
        }
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str(LINE_END);
        out.push(' ');
        rest = &rest[cut..];
        // Continuation lines spend one byte on the leading space
        limit = MAX_LINE_LENGTH - 1;
    }
}

/// Split text into physical lines on CRLF, LF or CR
fn physical_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Join continuation lines and group logical lines into blank-line separated blocks.
///
/// The first block is always the main section, even when empty.
fn split_blocks(text: &str) -> Result<Vec<Vec<String>>> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in physical_lines(text) {
        if line.is_empty() {
            blocks.push(std::mem::take(&mut current));
        } else if let Some(continued) = line.strip_prefix(' ') {
            let previous = current.last_mut().ok_or_else(|| {
                ArchiveError::InvalidManifest("continuation line without attribute".into())
            })?;
            previous.push_str(continued);
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() || blocks.is_empty() {
        blocks.push(current);
    }
    Ok(blocks)
}

fn parse_attribute(line: &str) -> Result<(&str, &str)> {
    line.split_once(": ").ok_or_else(|| {
        ArchiveError::InvalidManifest(format!("expected 'Name: value', found '{}'", line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manifest_roundtrip() {
        let manifest = Manifest::new();
        assert_eq!(manifest.to_bytes(), b"\r\n");
        assert_eq!(Manifest::parse(&manifest.to_bytes()).unwrap(), manifest);
        assert_eq!(Manifest::parse(b"").unwrap(), manifest);
    }

    #[test]
    fn test_version_written_first() {
        let mut manifest = Manifest::new();
        manifest.insert("Created-By", "test").unwrap();
        manifest.insert("Manifest-Version", "1.0").unwrap();

        let text = String::from_utf8(manifest.to_bytes()).unwrap();
        assert!(text.starts_with("Manifest-Version: 1.0\r\nCreated-By: test\r\n"));
    }

    #[test]
    fn test_keys_case_insensitive() {
        let mut attributes = Attributes::new();
        attributes.insert("Main-Class", "a.B").unwrap();
        let previous = attributes.insert("main-class", "c.D").unwrap();

        assert_eq!(previous.as_deref(), Some("a.B"));
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("MAIN-CLASS"), Some("c.D"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Manifest::from_pairs([("A", "1"), ("B", "2")]).unwrap();
        let b = Manifest::from_pairs([("B", "2"), ("a", "1")]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_long_values_wrap() {
        let value = "x".repeat(200);
        let manifest = Manifest::from_pairs([("Long-Value", value.as_str())]).unwrap();
        let bytes = manifest.to_bytes();

        let text = String::from_utf8(bytes.clone()).unwrap();
        for line in text.split("\r\n") {
            assert!(line.len() <= 72, "line too long: {}", line.len());
        }
        assert_eq!(Manifest::parse(&bytes).unwrap().get("Long-Value"), Some(value.as_str()));
    }

    #[test]
    fn test_wrap_respects_char_boundaries() {
        let value = "ü".repeat(80);
        let manifest = Manifest::from_pairs([("Umlauts", value.as_str())]).unwrap();
        let parsed = Manifest::parse(&manifest.to_bytes()).unwrap();
        assert_eq!(parsed.get("Umlauts"), Some(value.as_str()));
    }

    #[test]
    fn test_sections_roundtrip() {
        let mut manifest = Manifest::from_pairs([("Manifest-Version", "1.0")]).unwrap();
        manifest
            .section_mut("org/example/A.class")
            .insert("Sealed", "true")
            .unwrap();

        let parsed = Manifest::parse(&manifest.to_bytes()).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(
            parsed.section("org/example/A.class").unwrap().get("Sealed"),
            Some("true")
        );
    }

    #[test]
    fn test_parse_accepts_bare_newlines() {
        let parsed = Manifest::parse(b"Manifest-Version: 1.0\nK: V\n\n").unwrap();
        assert_eq!(parsed.get("K"), Some("V"));
        assert_eq!(parsed.main.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Manifest::parse(b"no separator here\r\n"),
            Err(ArchiveError::InvalidManifest(_))
        ));
        assert!(matches!(
            Manifest::parse(b" continuation first\r\n"),
            Err(ArchiveError::InvalidManifest(_))
        ));
        assert!(matches!(
            Manifest::parse(b"A: 1\r\n\r\nSealed: true\r\n"),
            Err(ArchiveError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_invalid_keys_and_values_rejected() {
        let mut attributes = Attributes::new();
        assert!(attributes.insert("", "v").is_err());
        assert!(attributes.insert("Has Space", "v").is_err());
        assert!(attributes.insert("K".repeat(71), "v").is_err());
        assert!(attributes.insert("K", "line\nbreak").is_err());
    }

    #[test]
    fn test_merge_overwrites() {
        let mut base = Manifest::from_pairs([("A", "1"), ("B", "2")]).unwrap();
        let extra = Attributes::from_pairs([("b", "20"), ("C", "3")]).unwrap();
        base.main.merge(&extra);

        assert_eq!(base.get("B"), Some("20"));
        assert_eq!(base.get("C"), Some("3"));
        assert_eq!(base.main.len(), 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut manifest = Manifest::from_pairs([("Manifest-Version", "1.0")]).unwrap();
        manifest.section_mut("a.txt").insert("K", "V").unwrap();

        let json = manifest.to_json().unwrap();
        let parsed = Manifest::from_json(&json).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_json_rejects_invalid_attributes() {
        let bad_key = br#"{"main":[["Has Space","v"]],"sections":{}}"#;
        assert!(matches!(
            Manifest::from_json(bad_key),
            Err(ArchiveError::InvalidManifest(_))
        ));

        let bad_value = br#"{"main":[["K","line\nbreak"]]}"#;
        assert!(matches!(
            Manifest::from_json(bad_value),
            Err(ArchiveError::InvalidManifest(_))
        ));

        let bad_section = br#"{"main":[],"sections":{"a.txt":[["K V","x"]]}}"#;
        assert!(Manifest::from_json(bad_section).is_err());
    }

    #[test]
    fn test_attributes_from_pairs_validates() {
        assert!(Attributes::from_pairs([("Good-Key", "v"), ("bad key", "v")]).is_err());

        let attributes = Attributes::from_pairs([("K", "1"), ("k", "2")]).unwrap();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("K"), Some("2"));
    }
}
