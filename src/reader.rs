//! Reader ingestion: decode caller-provided `io::Read` input to UTF-8.
//!
//! API descriptions arrive from disk and over the wire in UTF-8, UTF-16 and
//! BOM-prefixed variants; `encoding_rs_io` sniffs the BOM and transcodes so
//! the parser always sees clean UTF-8. The reader is drained eagerly and
//! not held open afterwards.

use std::io::Read;

use encoding_rs_io::DecodeReaderBytes;

use crate::error::Error;

/// Read everything from `reader`, transcoding to UTF-8.
pub(crate) fn decode_to_string<R: Read>(reader: R) -> Result<String, Error> {
    let mut decoder = DecodeReaderBytes::new(reader);
    let mut out = String::new();
    decoder.read_to_string(&mut out)?;
    Ok(out)
}
