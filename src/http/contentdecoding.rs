//! Content-Encoding handling.

use crate::base::neterror::NetError;
use bytes::Bytes;
use flate2::read::GzDecoder;
use http::header::CONTENT_ENCODING;
use http::HeaderMap;
use std::io::Read;

/// Undo the response's `Content-Encoding`. Only gzip is understood; any other
/// coding is returned as received.
pub fn decode_content(headers: &HeaderMap, body: Bytes) -> Result<Bytes, NetError> {
    let Some(coding) = headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok()) else {
        return Ok(body);
    };
    let coding = coding.trim();

    if coding.eq_ignore_ascii_case("gzip") {
        gunzip(&body)
    } else if coding.is_empty() || coding.eq_ignore_ascii_case("identity") {
        Ok(body)
    } else {
        tracing::warn!(coding, "unsupported content coding, passing body through");
        Ok(body)
    }
}

fn gunzip(data: &[u8]) -> Result<Bytes, NetError> {
    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).map_err(|e| NetError::ContentDecodingFailed {
        coding: "gzip".to_string(),
        reason: e.to_string(),
    })?;
    Ok(Bytes::from(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use http::HeaderValue;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn encoded_as(coding: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(coding));
        headers
    }

    #[test]
    fn test_gzip_decoded() {
        let body = Bytes::from(gzip(b"<p>compressed</p>"));
        let decoded = decode_content(&encoded_as("gzip"), body).unwrap();
        assert_eq!(&decoded[..], b"<p>compressed</p>");
    }

    #[test]
    fn test_no_encoding_passthrough() {
        let decoded = decode_content(&HeaderMap::new(), Bytes::from_static(b"plain")).unwrap();
        assert_eq!(&decoded[..], b"plain");
    }

    #[test]
    fn test_unknown_encoding_passthrough() {
        let decoded = decode_content(&encoded_as("br"), Bytes::from_static(b"opaque")).unwrap();
        assert_eq!(&decoded[..], b"opaque");
    }

    #[test]
    fn test_corrupt_gzip() {
        let err = decode_content(&encoded_as("gzip"), Bytes::from_static(b"not gzip")).unwrap_err();
        assert!(matches!(err, NetError::ContentDecodingFailed { .. }));
    }
}
