use crate::base::neterror::NetError;
use bytes::{BufMut, BytesMut};
use http::header::{HeaderName, HeaderValue};
use std::str::FromStr;

/// A request header list that strictly preserves insertion order and the
/// caller's spelling of each name. Names compare case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct OrderedHeaderMap {
    headers: Vec<(String, String)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self { headers: Vec::new() }
    }

    /// Append a header, or update it in place when the name is already present.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader(name.to_string()))?;
        HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader(value.to_string()))?;

        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            *v = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
        Ok(())
    }

    /// Serialize as `Name: value\r\n` lines in insertion order.
    pub fn write_to(&self, buf: &mut BytesMut) {
        for (name, value) in &self.headers {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
    }
}
