//! Fuzz target for document decoding.
//!
//! This fuzzer feeds arbitrary byte sequences through JSON parsing and
//! entity decoding, checking for panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use soundevent::document::{decode_any, from_json_slice};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(document) = from_json_slice(data) {
        let _ = decode_any(&document);
    }
});
