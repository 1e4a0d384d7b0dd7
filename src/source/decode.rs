use flate2::read::MultiGzDecoder;
use serde_json::Value;
use std::io::Read;

use crate::constants::source::GZIP_MAGIC;
use crate::errors::LoadError;

/// True when `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Turn raw resource bytes into UTF-8 text, inflating gzip payloads first.
pub fn decode_payload(resource: &str, bytes: &[u8]) -> Result<String, LoadError> {
    let text = if is_gzip(bytes) {
        let mut text = String::new();
        MultiGzDecoder::new(bytes)
            .read_to_string(&mut text)
            .map_err(|err| LoadError::Decompress {
                resource: resource.to_string(),
                reason: err.to_string(),
            })?;
        text
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|err| LoadError::Parse {
            resource: resource.to_string(),
            reason: format!("payload is not UTF-8: {err}"),
        })?
    };
    Ok(text)
}

/// Parse decoded text as a JSON document.
///
/// Numbers outside the `f64` range (for example `1e400`) are rejected by the
/// JSON parser itself, so such a value fails the whole document with
/// `LoadError::Parse` rather than a single record.
pub fn parse_json(resource: &str, text: &str) -> Result<Value, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(|err| LoadError::Parse {
        resource: resource.to_string(),
        reason: err.to_string(),
    })
}

/// Decode and parse in one step.
pub fn decode_json(resource: &str, bytes: &[u8]) -> Result<Value, LoadError> {
    let text = decode_payload(resource, bytes)?;
    parse_json(resource, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn plain_and_gzip_payloads_decode_identically() {
        let body = br#"[{"tokens":["a"]}]"#;
        let plain = decode_json("d.json", body).unwrap();
        let packed = decode_json("d.json.gz", &gzip(body)).unwrap();
        assert_eq!(plain, packed);
        assert!(is_gzip(&gzip(body)));
        assert!(!is_gzip(body));
    }

    #[test]
    fn truncated_gzip_is_a_decompress_error() {
        let packed = gzip(br#"[{"tokens":["a","b","c"]}]"#);
        let err = decode_payload("d.json.gz", &packed[..packed.len() / 2]).unwrap_err();
        assert!(matches!(err, LoadError::Decompress { .. }));
        assert_eq!(err.resource(), "d.json.gz");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = decode_json("d.json", b"[{\"tokens\": [").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        let err = decode_json("d.json", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn out_of_range_number_fails_the_document() {
        let err = decode_json("d.json", br#"[{"tokens":["a"],"activations":[1e400]}]"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let value = parse_json("d.json", "\u{feff}[1]").unwrap();
        assert_eq!(value, serde_json::json!([1]));
    }
}
