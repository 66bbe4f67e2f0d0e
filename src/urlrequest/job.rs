use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::base::urlref::{Scheme, UrlRef};
use crate::http::httpcache::CacheLookup;
use crate::http::transaction::HttpNetworkTransaction;
use crate::urlrequest::context::URLRequestContext;
use std::sync::Arc;

/// Media type accepted in `data:` URLs.
const DATA_MEDIA_TYPE: &str = "text/html";

/// Result of retrieving a single URL, before redirects are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Body(String),
    /// The server pointed elsewhere; the next hop, already resolved.
    Redirect(UrlRef),
}

/// Retrieves URLs of every scheme against one shared context.
/// Roughly equivalent to the URLRequestJob family (file, data, http).
pub struct URLRequestJob {
    context: Arc<URLRequestContext>,
}

impl URLRequestJob {
    pub fn new(context: Arc<URLRequestContext>) -> Self {
        Self { context }
    }

    /// Fetch `url` and follow redirects until a body arrives or the
    /// redirect limit is spent.
    pub async fn start(&self, url: &UrlRef) -> Result<String, NetError> {
        let mut url = url.clone();
        let mut remaining = self.context.config().redirect_limit;

        loop {
            match self.fetch_once(&url).await? {
                FetchOutcome::Body(body) => return Ok(body),
                FetchOutcome::Redirect(next) => {
                    if remaining == 0 {
                        tracing::debug!(from = url.raw(), to = next.raw(), "redirect limit reached");
                        return Err(NetError::TooManyRedirects);
                    }
                    remaining -= 1;
                    tracing::debug!(
                        from = url.raw(),
                        to = next.raw(),
                        remaining,
                        "following redirect"
                    );
                    url = next;
                }
            }
        }
    }

    /// Fetch one URL without following redirects.
    pub async fn fetch_once(&self, url: &UrlRef) -> Result<FetchOutcome, NetError> {
        match url.scheme() {
            None => Err(NetError::InvalidUrl(url.raw().to_string())),
            Some(Scheme::File) => read_file(url.path()).await.map(FetchOutcome::Body),
            Some(Scheme::Data) => read_data(url).map(FetchOutcome::Body),
            Some(Scheme::Http) | Some(Scheme::Https) => self.fetch_network(url).await,
        }
    }

    async fn fetch_network(&self, url: &UrlRef) -> Result<FetchOutcome, NetError> {
        let cache = self.context.cache();
        match cache.lookup(url.raw())? {
            CacheLookup::Fresh(body) => return Ok(FetchOutcome::Body(body)),
            CacheLookup::Stale | CacheLookup::Absent => {}
        }

        let mut transaction = HttpNetworkTransaction::new(
            self.context.socket_pool().clone(),
            url.clone(),
            self.context.user_agent(),
        )
        .with_read_timeout(self.context.config().read_timeout);
        let response = transaction.start().await?;

        let status = response.status();
        if (300..=399).contains(&status.as_u16()) {
            let location = response
                .location()
                .ok_or(NetError::RedirectWithoutLocation(status.as_u16()))?;
            let next = url.resolve_location(location)?;
            if !next.scheme().is_some_and(Scheme::is_network) {
                tracing::warn!(from = url.raw(), to = next.raw(), "refusing redirect to local scheme");
                return Err(NetError::UnsafeRedirect(next.raw().to_string()));
            }
            return Ok(FetchOutcome::Redirect(next));
        }

        let body = response.text();
        cache.store(url.raw(), transaction.method(), &response, &body);
        Ok(FetchOutcome::Body(body))
    }
}

async fn read_file(path: &str) -> Result<String, NetError> {
    let bytes = tokio::fs::read(path).await.file_context(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `data:<media type>,<payload>`; only HTML payloads are accepted.
fn read_data(url: &UrlRef) -> Result<String, NetError> {
    let (media_type, payload) =
        url.path().split_once(',').ok_or_else(|| NetError::InvalidUrl(url.raw().to_string()))?;
    if media_type != DATA_MEDIA_TYPE {
        return Err(NetError::UnsupportedMediaType(media_type.to_string()));
    }
    Ok(payload.to_string())
}
