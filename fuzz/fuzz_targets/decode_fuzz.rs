#![no_main]
use libfuzzer_sys::fuzz_target;
use oxibps::bps::{self, PatchInfo};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let _ = bps::apply(&[], data, true);

    // Skip checksums so malformed operation streams reach the replay loop.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (source, patch) = data.split_at(split);
        let _ = bps::apply(source, patch, false);
    }

    if let Ok(info) = PatchInfo::parse(data) {
        for op in info.operations(data) {
            if op.is_err() {
                break;
            }
        }
    }
});
