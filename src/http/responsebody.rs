//! Response body framing.
//! Mirrors Chromium's HttpStreamParser body states: chunked, fixed length,
//! or read until the server closes the connection.

use crate::base::neterror::NetError;
use crate::http::parser::{is_blank_line, read_line};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::HeaderMap;
use tokio::io::{AsyncBufRead, AsyncReadExt};

/// How the end of a response body is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    Chunked,
    ContentLength(usize),
    /// The body ends when the peer closes the connection.
    UntilClose,
}

impl BodyFraming {
    /// Pick the framing from response headers. Chunked wins over
    /// Content-Length.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, NetError> {
        let chunked = headers
            .get(TRANSFER_ENCODING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("chunked"));
        if chunked {
            return Ok(BodyFraming::Chunked);
        }

        if let Some(value) = headers.get(CONTENT_LENGTH) {
            let raw = String::from_utf8_lossy(value.as_bytes()).into_owned();
            let length = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| NetError::InvalidContentLength(raw.clone()))?;
            return Ok(BodyFraming::ContentLength(length));
        }

        Ok(BodyFraming::UntilClose)
    }

    pub fn is_close_delimited(self) -> bool {
        self == BodyFraming::UntilClose
    }
}

/// Read a whole body with the given framing.
pub async fn read_body<R>(reader: &mut R, framing: BodyFraming) -> Result<Bytes, NetError>
where
    R: AsyncBufRead + Unpin,
{
    match framing {
        BodyFraming::Chunked => read_chunked(reader).await,
        BodyFraming::ContentLength(expected) => {
            let mut body = Vec::with_capacity(expected.min(64 * 1024));
            let received = (&mut *reader).take(expected as u64).read_to_end(&mut body).await?;
            if received != expected {
                return Err(NetError::ContentLengthMismatch { expected, received });
            }
            Ok(Bytes::from(body))
        }
        BodyFraming::UntilClose => {
            let mut body = Vec::new();
            reader.read_to_end(&mut body).await?;
            Ok(Bytes::from(body))
        }
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, NetError> {
    let text = String::from_utf8_lossy(line);
    let size = text.trim_end_matches(['\r', '\n']);
    // Chunk extensions are ignored.
    let size = size.split(';').next().unwrap_or_default().trim();
    usize::from_str_radix(size, 16).map_err(|_| NetError::InvalidChunkedEncoding(text.into_owned()))
}

async fn read_chunked<R>(reader: &mut R) -> Result<Bytes, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let mut body = Vec::new();

    loop {
        let line = read_line(reader).await?.ok_or(NetError::IncompleteChunkedEncoding)?;
        let size = parse_chunk_size(&line)?;

        if size == 0 {
            // Trailers, up to and including the terminating blank line.
            loop {
                let line = read_line(reader).await?.ok_or(NetError::IncompleteChunkedEncoding)?;
                if is_blank_line(&line) {
                    break;
                }
            }
            return Ok(Bytes::from(body));
        }

        // The advertised size is untrusted; only what actually arrives is buffered.
        let received = (&mut *reader).take(size as u64).read_to_end(&mut body).await?;
        if received != size {
            return Err(NetError::IncompleteChunkedEncoding);
        }

        let crlf = read_line(reader).await?.ok_or(NetError::IncompleteChunkedEncoding)?;
        if !is_blank_line(&crlf) {
            return Err(NetError::InvalidChunkedEncoding(
                String::from_utf8_lossy(&crlf).into_owned(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_framing_precedence() {
        let both = headers(&[("transfer-encoding", "chunked"), ("content-length", "5")]);
        assert_eq!(BodyFraming::from_headers(&both).unwrap(), BodyFraming::Chunked);

        let length = headers(&[("content-length", " 5 ")]);
        assert_eq!(BodyFraming::from_headers(&length).unwrap(), BodyFraming::ContentLength(5));

        let none = HeaderMap::new();
        assert!(BodyFraming::from_headers(&none).unwrap().is_close_delimited());
    }

    #[test]
    fn test_invalid_content_length() {
        let bad = headers(&[("content-length", "five")]);
        assert_eq!(
            BodyFraming::from_headers(&bad),
            Err(NetError::InvalidContentLength("five".to_string()))
        );
    }

    #[tokio::test]
    async fn test_content_length_body() {
        let mut reader: &[u8] = b"HelloTRAILING";
        let body = read_body(&mut reader, BodyFraming::ContentLength(5)).await.unwrap();
        assert_eq!(&body[..], b"Hello");
        assert_eq!(reader, b"TRAILING");
    }

    #[tokio::test]
    async fn test_content_length_short_read() {
        let mut reader: &[u8] = b"Hel";
        assert_eq!(
            read_body(&mut reader, BodyFraming::ContentLength(5)).await,
            Err(NetError::ContentLengthMismatch { expected: 5, received: 3 })
        );
    }

    #[tokio::test]
    async fn test_chunked_body() {
        let mut reader: &[u8] = b"5\r\nHello\r\n6;ext=1\r\n World\r\n0\r\n\r\nNEXT";
        let body = read_body(&mut reader, BodyFraming::Chunked).await.unwrap();
        assert_eq!(&body[..], b"Hello World");
        assert_eq!(reader, b"NEXT");
    }

    #[tokio::test]
    async fn test_chunked_with_trailers() {
        let mut reader: &[u8] = b"3\r\nabc\r\n0\r\nX-Trailer: yes\r\n\r\n";
        let body = read_body(&mut reader, BodyFraming::Chunked).await.unwrap();
        assert_eq!(&body[..], b"abc");
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn test_chunked_bad_size() {
        let mut reader: &[u8] = b"zz\r\nHello\r\n0\r\n\r\n";
        assert!(matches!(
            read_body(&mut reader, BodyFraming::Chunked).await,
            Err(NetError::InvalidChunkedEncoding(_))
        ));
    }

    #[tokio::test]
    async fn test_chunked_missing_crlf() {
        let mut reader: &[u8] = b"5\r\nHelloXX\r\n0\r\n\r\n";
        assert!(matches!(
            read_body(&mut reader, BodyFraming::Chunked).await,
            Err(NetError::InvalidChunkedEncoding(_))
        ));
    }

    #[tokio::test]
    async fn test_chunked_truncated() {
        let mut reader: &[u8] = b"a\r\nHel";
        assert_eq!(
            read_body(&mut reader, BodyFraming::Chunked).await,
            Err(NetError::IncompleteChunkedEncoding)
        );
    }

    #[tokio::test]
    async fn test_chunk_size_larger_than_stream() {
        for size in ["ffffffffffffffff", "7fffffffffffffff"] {
            let input = format!("{size}\r\nonly a few bytes");
            let mut reader = input.as_bytes();
            assert_eq!(
                read_body(&mut reader, BodyFraming::Chunked).await,
                Err(NetError::IncompleteChunkedEncoding)
            );
        }
    }

    #[tokio::test]
    async fn test_until_close() {
        let mut reader: &[u8] = b"everything left";
        let body = read_body(&mut reader, BodyFraming::UntilClose).await.unwrap();
        assert_eq!(&body[..], b"everything left");
    }
}
