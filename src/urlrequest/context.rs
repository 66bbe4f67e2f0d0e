//! URL Request Context - Central configuration for network requests.
//!
//! Based on Chromium's net::URLRequestContext: one place that owns the
//! connection pool and the response cache shared by every request.

use crate::http::httpcache::{CacheMode, HttpCache};
use crate::socket::connectjob::{Connect, ConnectJob};
use crate::socket::pool::ClientSocketPool;
use crate::socket::tls::TlsConfig;
use std::sync::Arc;
use std::time::Duration;

/// Default number of redirects followed before giving up.
pub const REDIRECT_LIMIT: usize = 5;

/// Configuration options for URLRequestContext.
#[derive(Debug, Clone)]
pub struct URLRequestContextConfig {
    /// User-Agent string to use for requests.
    pub user_agent: String,

    /// Redirects followed for one fetch.
    pub redirect_limit: usize,

    /// Limit on DNS + TCP + TLS for a new connection.
    pub connect_timeout: Option<Duration>,

    /// Limit on each write or read of an exchange.
    pub read_timeout: Option<Duration>,

    /// TLS settings for `https` connections.
    pub tls: TlsConfig,

    pub cache_mode: CacheMode,
}

impl Default for URLRequestContextConfig {
    fn default() -> Self {
        Self {
            user_agent: "textnet/0.1".to_string(),
            redirect_limit: REDIRECT_LIMIT,
            connect_timeout: None,
            read_timeout: None,
            tls: TlsConfig::default(),
            cache_mode: CacheMode::Normal,
        }
    }
}

/// Central state for network requests.
///
/// Bundles together:
/// - Socket pool
/// - Response cache
/// - User-Agent and timeouts
#[derive(Debug)]
pub struct URLRequestContext {
    /// Socket pool for connection reuse.
    socket_pool: ClientSocketPool,

    cache: HttpCache,

    /// Configuration options.
    config: URLRequestContextConfig,
}

impl URLRequestContext {
    /// Create a new URLRequestContext with default configuration.
    pub fn new() -> Self {
        Self::with_config(URLRequestContextConfig::default())
    }

    /// Create a new URLRequestContext that dials through [`ConnectJob`].
    pub fn with_config(config: URLRequestContextConfig) -> Self {
        let connector = Arc::new(ConnectJob::new(config.tls.clone()));
        Self::with_connector(config, connector)
    }

    /// Create a new URLRequestContext with a custom connector.
    pub fn with_connector(config: URLRequestContextConfig, connector: Arc<dyn Connect>) -> Self {
        let socket_pool =
            ClientSocketPool::new(connector).with_connect_timeout(config.connect_timeout);
        let cache = HttpCache::with_mode(config.cache_mode);
        Self { socket_pool, cache, config }
    }

    /// Get the socket pool.
    pub fn socket_pool(&self) -> &ClientSocketPool {
        &self.socket_pool
    }

    pub fn cache(&self) -> &HttpCache {
        &self.cache
    }

    pub fn config(&self) -> &URLRequestContextConfig {
        &self.config
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }
}

impl Default for URLRequestContext {
    fn default() -> Self {
        Self::new()
    }
}
