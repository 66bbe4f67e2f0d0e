//! HTTP/1.0 over pooled connections.
//!
//! Mirrors Chromium's `net/http/`:
//! - [`request`]: Request serialization
//! - [`parser`], [`responsebody`], [`contentdecoding`]: Response head, body framing and gzip
//! - [`httpcache`]: In-memory freshness cache
//! - [`transaction`]: One exchange over a pooled connection

pub mod contentdecoding;
pub mod httpcache;
pub mod orderedheaders;
pub mod parser;
pub mod request;
pub mod response;
pub mod responsebody;
pub mod transaction;

// Re-exports for convenience
pub use httpcache::{CacheLookup, CacheMode, HttpCache};
pub use response::HttpResponse;
pub use transaction::HttpNetworkTransaction;
