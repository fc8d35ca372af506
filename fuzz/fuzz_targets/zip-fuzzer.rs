#![no_main]

use classgraph_zip::ZipArchive;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = data.to_vec();
    let _ = ZipArchive::new(input);
});
