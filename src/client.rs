//! Client with builder pattern.
//!
//! Provides the high-level API: fetch a URL to a body string, or load it all
//! the way to display text.
//!
//! # Example
//!
//! ```rust,ignore
//! use textnet::Client;
//!
//! let client = Client::builder()
//!     .user_agent("my-agent/1.0")
//!     .redirect_limit(3)
//!     .build();
//!
//! let text = client.load("https://example.org/").await?;
//! ```

use crate::base::neterror::NetError;
use crate::base::urlref::UrlRef;
use crate::http::httpcache::{CacheMode, HttpCache};
use crate::socket::connectjob::Connect;
use crate::socket::pool::ClientSocketPool;
use crate::socket::tls::TlsConfig;
use crate::textextract::render_body;
use crate::urlrequest::context::{URLRequestContext, URLRequestContextConfig};
use crate::urlrequest::job::URLRequestJob;
use std::sync::Arc;
use std::time::Duration;

/// Client for retrieving URLs.
///
/// Clones share one connection pool and one response cache. Use
/// [`Client::builder()`] to configure and create a client.
#[derive(Debug, Clone)]
pub struct Client {
    context: Arc<URLRequestContext>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Retrieve `url`, following redirects, and return the decoded body.
    pub async fn fetch(&self, url: &UrlRef) -> Result<String, NetError> {
        URLRequestJob::new(Arc::clone(&self.context)).start(url).await
    }

    /// Parse `url`, fetch it, and render the body for display.
    pub async fn load(&self, url: &str) -> Result<String, NetError> {
        let url = UrlRef::parse(url)?;
        let body = self.fetch(&url).await?;
        Ok(render_body(&url, &body))
    }

    pub fn context(&self) -> &URLRequestContext {
        &self.context
    }

    /// Get the socket pool.
    pub fn socket_pool(&self) -> &ClientSocketPool {
        self.context.socket_pool()
    }

    pub fn cache(&self) -> &HttpCache {
        self.context.cache()
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: URLRequestContextConfig,
    connector: Option<Arc<dyn Connect>>,
}

impl ClientBuilder {
    /// Set the User-Agent header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set how many redirects one fetch may follow.
    pub fn redirect_limit(mut self, limit: usize) -> Self {
        self.config.redirect_limit = limit;
        self
    }

    /// Set connection establishment timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set per-operation read/write timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Set TLS options.
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = tls;
        self
    }

    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.config.cache_mode = mode;
        self
    }

    /// Dial connections through `connector` instead of DNS/TCP/TLS.
    pub fn connector(mut self, connector: Arc<dyn Connect>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        let context = match self.connector {
            Some(connector) => URLRequestContext::with_connector(self.config, connector),
            None => URLRequestContext::with_config(self.config),
        };
        Client { context: Arc::new(context) }
    }
}
