#![no_main]

use jarsmith::{ArchiveManager, ArchiveReader, FileArchive};
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fuzz_target!(|data: &[u8]| {
    // Skip inputs shorter than an end-of-central-directory record
    if data.len() < 22 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };
    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    // Raw reader access - should never panic
    if let Ok(mut reader) = ArchiveReader::open(temp_file.path()) {
        let _ = reader.manifest();
        let _ = reader.load_entries();
        let _ = reader.contains("../../../etc/passwd");
    }

    // Loading and extracting - should never panic or escape the target
    let archive = match FileArchive::open(temp_file.path()) {
        Ok(a) => a,
        Err(_) => return,
    };
    if let Ok(target) = TempDir::new() {
        let _ = archive.extract(&target.path().join("out"));
    }
});
