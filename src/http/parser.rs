//! HTTP response head parsing: status line and header block.
//!
//! Accepts HTTP/1.0 and HTTP/1.1 shaped responses. The version token is kept
//! but never checked against the request's version.

use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Status line and headers of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub version: String,
    pub status: StatusCode,
    pub reason: String,
    pub headers: HeaderMap,
}

/// Read one `\n`-terminated line, terminator included. `None` at EOF.
pub(crate) async fn read_line<R>(reader: &mut R) -> Result<Option<Vec<u8>>, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line).await?;
    if n == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

pub(crate) fn is_blank_line(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse `VERSION CODE REASON`. The reason may contain spaces or be empty,
/// but the separator after the code must be there.
pub fn parse_status_line(line: &str) -> Result<(String, StatusCode, String), NetError> {
    let mut fields = line.splitn(3, ' ');
    let (Some(version), Some(code), Some(reason)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(NetError::InvalidStatusLine(line.to_string()));
    };

    let status = code
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| NetError::InvalidStatusLine(line.to_string()))?;

    Ok((version.to_string(), status, reason.to_string()))
}

/// Parse one `Name: value` line into a case-folded name and trimmed value.
pub fn parse_header_line(line: &[u8]) -> Result<(HeaderName, HeaderValue), NetError> {
    let malformed = || NetError::MalformedHeader(String::from_utf8_lossy(line).into_owned());

    let colon = line.iter().position(|&b| b == b':').ok_or_else(malformed)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    let name = HeaderName::from_bytes(name.trim_ascii()).map_err(|_| malformed())?;
    let value = HeaderValue::from_bytes(value.trim_ascii()).map_err(|_| malformed())?;
    Ok((name, value))
}

/// Read and parse the status line. EOF before any byte is `EmptyResponse`.
pub async fn read_status_line<R>(reader: &mut R) -> Result<(String, StatusCode, String), NetError>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader).await?.ok_or(NetError::EmptyResponse)?;
    parse_status_line(&String::from_utf8_lossy(trim_line_ending(&line)))
}

/// Read header lines up to and including the blank line.
pub async fn read_headers<R>(reader: &mut R) -> Result<HeaderMap, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = HeaderMap::new();
    loop {
        let line = read_line(reader).await?.ok_or(NetError::ConnectionClosed)?;
        if is_blank_line(&line) {
            return Ok(headers);
        }
        let (name, value) = parse_header_line(trim_line_ending(&line))?;
        // Last occurrence wins.
        headers.insert(name, value);
    }
}

/// Read the status line and headers, stopping after the blank line.
pub async fn read_response_head<R>(reader: &mut R) -> Result<ResponseHead, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let (version, status, reason) = read_status_line(reader).await?;
    let headers = read_headers(reader).await?;

    tracing::trace!(%status, headers = headers.len(), "parsed response head");
    Ok(ResponseHead { version, status, reason, headers })
}
