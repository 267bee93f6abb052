// src/ingest/decode.rs
use encoding_rs::Encoding;
use tracing::{debug, trace};

use crate::error::{PipelineError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode `bytes` with the first encoding in `encodings` that accepts them without
/// replacement characters. A leading UTF-8 byte-order mark is dropped first.
pub fn decode_bytes(
    file: &str,
    bytes: &[u8],
    encodings: &[&'static Encoding],
) -> Result<(String, &'static Encoding)> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    for &enc in encodings {
        match enc.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => {
                debug!(file, encoding = enc.name(), "decoded");
                return Ok((text.into_owned(), enc));
            }
            None => trace!(file, encoding = enc.name(), "decode failed, trying next"),
        }
    }

    Err(PipelineError::Decoding {
        file: file.to_string(),
        tried: encodings.iter().map(|e| e.name().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn utf8_wins_when_valid() {
        let (text, enc) = decode_bytes("a.csv", "Café".as_bytes(), &[UTF_8, WINDOWS_1252]).unwrap();
        assert_eq!(text, "Café");
        assert_eq!(enc, UTF_8);
    }

    #[test]
    fn falls_back_to_legacy_single_byte() {
        let (text, enc) = decode_bytes("a.csv", b"Caf\xe9", &[UTF_8, WINDOWS_1252]).unwrap();
        assert_eq!(text, "Café");
        assert_eq!(enc, WINDOWS_1252);
    }

    #[test]
    fn bom_is_stripped() {
        let (text, _) = decode_bytes("a.csv", b"\xEF\xBB\xBFName,Phone", &[UTF_8]).unwrap();
        assert_eq!(text, "Name,Phone");
    }

    #[test]
    fn no_candidate_is_a_decoding_error() {
        let err = decode_bytes("bad.csv", b"\xff\xfe\xfd", &[UTF_8]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Decoding {
                file: "bad.csv".into(),
                tried: vec!["UTF-8".into()],
            }
        );
    }
}
