#![no_main]

use libfuzzer_sys::fuzz_target;

// Validation must never panic, and sorting must be total on whatever the
// document produced.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else { return };
    let Ok((doc, mut errors)) = swagger_saphyr::unmarshal(input) else { return };
    errors.extend(doc.validate());
    swagger_saphyr::sort_validation_errors(&mut errors);
    for error in &errors {
        let _ = error.to_string();
    }
});
