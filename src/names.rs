//! Conversions between entry names, qualified type names and native paths
//!
//! Entry names always use `/` as separator. Qualified type names use `.`.
//! None of these functions touch the file system.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

/// Separator between entry name segments; also marks directory entries
pub const DIRECTORY_SUFFIX: &str = "/";

/// Separator between namespace segments of a qualified type name
pub const NAMESPACE_SEPARATOR: &str = ".";

/// Extension of compiled type artifacts
pub const CLASS_FILE_EXTENSION: &str = ".class";

/// `a.b.C` -> `a/b/C`
pub fn qualified_to_entry_name(qualified: &str) -> String {
    qualified.replace(NAMESPACE_SEPARATOR, DIRECTORY_SUFFIX)
}

/// `a/b/C` -> `a.b.C`
pub fn entry_name_to_qualified(entry_name: &str) -> String {
    entry_name.replace(DIRECTORY_SUFFIX, NAMESPACE_SEPARATOR)
}

/// Split an entry name on `/` and fold the segments into a relative path.
///
/// Empty segments (from a leading, doubled or trailing `/`) are pushed as
/// empty components. An empty push adds nothing to the component list, but a
/// trailing one leaves a trailing separator on the path: `dir/` maps to `dir/`
/// and `/a/b` maps to `a/b`.
pub fn entry_name_to_relative_path(entry_name: &str) -> PathBuf {
    entry_name
        .split(DIRECTORY_SUFFIX)
        .fold(PathBuf::new(), |mut path, segment| {
            path.push(segment);
            path
        })
}

/// Same as [`entry_name_to_relative_path`] but rooted at `root`
pub fn entry_name_to_path(entry_name: &str, root: &Path) -> PathBuf {
    root.join(entry_name_to_relative_path(entry_name))
}

/// Replace the platform separator with `/`
pub fn path_to_entry_name(path: &Path) -> String {
    path.to_string_lossy().replace(MAIN_SEPARATOR_STR, DIRECTORY_SUFFIX)
}

/// Whether a relative path stays below the directory it is joined onto
pub fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Namespace part of a qualified name (`a.b` for `a.b.C`), empty for the default namespace
pub fn namespace_of(qualified: &str) -> &str {
    qualified
        .rfind(NAMESPACE_SEPARATOR)
        .map(|idx| &qualified[..idx])
        .unwrap_or("")
}

/// Directory entry name of a namespace (`a/b/` for `a.b`), `None` for the default namespace
pub fn namespace_entry_name(namespace: &str) -> Option<String> {
    if namespace.is_empty() {
        None
    } else {
        Some(qualified_to_entry_name(namespace) + DIRECTORY_SUFFIX)
    }
}

/// Entry name of the compiled artifact for a qualified type name
pub fn class_entry_name(qualified: &str) -> String {
    qualified_to_entry_name(qualified) + CLASS_FILE_EXTENSION
}
