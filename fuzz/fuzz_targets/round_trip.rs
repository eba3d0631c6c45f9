#![no_main]

use libfuzzer_sys::fuzz_target;

// Anything that parses must marshal, and the marshalled text must parse
// again without a fatal error.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else { return };
    let Ok((doc, _)) = swagger_saphyr::unmarshal(input) else { return };
    let Ok(output) = swagger_saphyr::marshal(&doc) else { return };
    let _ = swagger_saphyr::unmarshal(&output);
});
