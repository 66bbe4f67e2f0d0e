//! Socket and connection management.
//!
//! Provides connection pooling and socket handling mirroring Chromium's `net/socket/`:
//! - [`pool`]: One persistent connection per (host, port)
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`stream`]: Polymorphic TCP / TLS / in-memory streams
//! - [`tls`]: TLS configuration with BoringSSL

pub mod connectjob;
pub mod pool;
pub mod stream;
pub mod tls;
