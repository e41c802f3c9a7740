#![no_main]

use jarsmith::Manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing must never panic
    let manifest = match Manifest::parse(data) {
        Ok(m) => m,
        Err(_) => return,
    };

    // Anything that parsed must survive a write and re-parse unchanged
    let bytes = manifest.to_bytes();
    let reparsed = Manifest::parse(&bytes).expect("serialized manifest must parse");
    assert_eq!(manifest, reparsed);
});
