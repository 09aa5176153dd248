#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // One argument per NUL-separated chunk, so arguments may contain spaces.
    let args: Vec<String> = data
        .split(|&b| b == 0)
        .take(16)
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    oxibps::cli::fuzz_try_parse_args(&args);
});
