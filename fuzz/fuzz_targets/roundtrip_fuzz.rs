#![no_main]
use libfuzzer_sys::fuzz_target;
use oxibps::engine;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the split between source and target.
    let payload = &data[1..];
    let split = data[0] as usize * payload.len() / 255;
    let (source, target) = payload.split_at(split.min(payload.len()));

    let patch = engine::encode(source, target);
    let decoded = engine::decode(source, &patch).unwrap();
    assert_eq!(decoded, target);
});
