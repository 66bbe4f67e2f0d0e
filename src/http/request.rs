//! HTTP/1.0 request serialization.

use crate::base::neterror::NetError;
use crate::http::orderedheaders::OrderedHeaderMap;
use bytes::{BufMut, Bytes, BytesMut};
use http::Method;

/// Build a body-less HTTP/1.0 request.
///
/// The header block is fixed: `Host`, `Connection: keep-alive`, `User-Agent`,
/// `Accept-Encoding: gzip`, in that order, CRLF terminated.
pub fn format_request(
    method: &Method,
    path: &str,
    host: &str,
    user_agent: &str,
) -> Result<Bytes, NetError> {
    let mut headers = OrderedHeaderMap::new();
    headers.insert("Host", host)?;
    headers.insert("Connection", "keep-alive")?;
    headers.insert("User-Agent", user_agent)?;
    headers.insert("Accept-Encoding", "gzip")?;

    if path.contains(['\r', '\n', ' ']) {
        return Err(NetError::InvalidUrl(path.to_string()));
    }

    let mut buf = BytesMut::with_capacity(128 + path.len() + user_agent.len());
    buf.put_slice(method.as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(path.as_bytes());
    buf.put_slice(b" HTTP/1.0\r\n");
    headers.write_to(&mut buf);
    buf.put_slice(b"\r\n");

    Ok(buf.freeze())
}
