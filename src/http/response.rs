//! HTTP response read off the wire.

use crate::base::neterror::NetError;
use crate::http::contentdecoding::decode_content;
use crate::http::parser::{read_response_head, ResponseHead};
use crate::http::responsebody::{read_body, BodyFraming};
use bytes::Bytes;
use http::header::{CONNECTION, LOCATION};
use http::{HeaderMap, StatusCode};
use tokio::io::AsyncBufRead;

/// A fully read response with its content coding removed.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    version: String,
    reason: String,
    headers: HeaderMap,
    body: Bytes,
    close_delimited: bool,
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Version token exactly as the server sent it.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn is_redirection(&self) -> bool {
        self.status.is_redirection()
    }

    /// The body ran until the server closed the stream.
    pub fn is_close_delimited(&self) -> bool {
        self.close_delimited
    }

    /// Whether the connection can carry another request after this one.
    pub fn is_reusable(&self) -> bool {
        let close_requested = self
            .headers
            .get(CONNECTION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("close"));
        !self.close_delimited && !close_requested
    }
}

/// Read a complete response: head, framed body, then content decoding.
pub async fn read_response<R>(reader: &mut R) -> Result<HttpResponse, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let head = read_response_head(reader).await?;
    read_response_body(head, reader).await
}

/// Read the body that follows an already parsed head.
pub async fn read_response_body<R>(
    head: ResponseHead,
    reader: &mut R,
) -> Result<HttpResponse, NetError>
where
    R: AsyncBufRead + Unpin,
{
    let framing = BodyFraming::from_headers(&head.headers)?;
    let raw = read_body(reader, framing).await?;
    let body = decode_content(&head.headers, raw)?;

    Ok(HttpResponse {
        status: head.status,
        version: head.version,
        reason: head.reason,
        headers: head.headers,
        body,
        close_delimited: framing.is_close_delimited(),
    })
}
