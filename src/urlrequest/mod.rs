//! Request orchestration.
//!
//! - [`context`]: Shared pool, cache and configuration
//! - [`job`]: Scheme dispatch and the redirect loop

pub mod context;
pub mod job;

pub use context::{URLRequestContext, URLRequestContextConfig, REDIRECT_LIMIT};
pub use job::{FetchOutcome, URLRequestJob};
