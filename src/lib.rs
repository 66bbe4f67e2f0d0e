//! # textnet
//!
//! A minimal user-agent network stack modeled on Chromium's `net/` layout.
//!
//! `textnet` turns a URL string into displayable text: it parses the URL,
//! reads local files and inline `data:` payloads, talks HTTP/1.0 over pooled
//! TCP/TLS connections, follows redirects, caches fresh responses and strips
//! markup from the result.
//!
//! ## Features
//!
//! - **Connection Pooling**: One kept-alive connection per (host, port)
//! - **HTTP/1.0**: Chunked, Content-Length and close-delimited bodies, gzip
//! - **TLS**: BoringSSL with SNI and hostname verification
//! - **Caching**: `Cache-Control: max-age` freshness, keyed by URL
//! - **Redirects**: Followed up to a configurable limit (5 by default)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use textnet::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new();
//!     let text = client.load("https://example.org/").await.unwrap();
//!     println!("{text}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - URL parsing, error definitions and load states
//! - [`socket`] - Connection pooling, connect jobs and TLS
//! - [`http`] - Request formatting, response parsing and the cache
//! - [`urlrequest`] - Scheme dispatch and redirect handling
//! - [`textextract`] - Markup to text

pub mod base;
pub mod client;
pub mod http;
pub mod socket;
pub mod textextract;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use base::urlref::UrlRef;
pub use client::{Client, ClientBuilder};
