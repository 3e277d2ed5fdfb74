#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlarbor::parser::{parse_bytes_with_options, ParseOptions};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes go through encoding detection first; none may panic.
    let _ = parse_bytes_with_options(data, &ParseOptions::default());
    let _ = parse_bytes_with_options(data, &ParseOptions::default().no_blanks(true).max_depth(16));
});
