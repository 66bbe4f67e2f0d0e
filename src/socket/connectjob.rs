use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::stream::BoxedSocket;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpStream;

/// Alias for the `Future` type returned by a connector.
pub type Connecting = Pin<Box<dyn Future<Output = Result<BoxedSocket, NetError>> + Send>>;

/// Opens new transport connections for the socket pool.
///
/// The production implementation is [`ConnectJob`]; tests plug in
/// in-memory connectors to observe how often the pool dials out.
pub trait Connect: Send + Sync {
    fn connect(&self, host: &str, port: u16, use_tls: bool) -> Connecting;
}

/// Blanket implementation for Arc-wrapped connectors.
impl<C: Connect + ?Sized> Connect for Arc<C> {
    fn connect(&self, host: &str, port: u16, use_tls: bool) -> Connecting {
        (**self).connect(host, port, use_tls)
    }
}

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
#[derive(Debug, Clone, Default)]
pub struct ConnectJob {
    tls: TlsConfig,
}

impl ConnectJob {
    pub fn new(tls: TlsConfig) -> Self {
        Self { tls }
    }

    pub async fn connect_to(
        host: &str,
        port: u16,
        use_tls: bool,
        tls: &TlsConfig,
    ) -> Result<BoxedSocket, NetError> {
        // 1. DNS Resolution
        let addrs = tokio::net::lookup_host((host, port)).await.dns_context(host)?;

        // 2. TCP Connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_err = Some(e),
            }
        }

        let stream = match (stream, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => return Err(e).connection_context(host, port),
            (None, None) => {
                return Err(NetError::NameNotResolvedFor {
                    domain: host.to_string(),
                    reason: "no addresses".to_string(),
                })
            }
        };
        let _ = stream.set_nodelay(true);
        tracing::debug!(host, port, "TCP connection established");

        if !use_tls {
            return Ok(BoxedSocket::new(stream));
        }

        // 3. SSL Handshake, verifying the certificate against `host`
        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|e| NetError::SslProtocolError(e.to_string()))?;
        tls.apply_to_builder(&mut builder)?;

        let connector = builder.build();
        let mut config =
            connector.configure().map_err(|e| NetError::SslProtocolError(e.to_string()))?;
        config.set_use_server_name_indication(TlsConfig::should_set_sni(host));
        config.set_verify_hostname(tls.verify_peer);

        let tls_stream = tokio_boring::connect(config, host, stream).await.map_err(|e| {
            NetError::SslHandshakeFailed { host: host.to_string(), reason: format!("{:?}", e) }
        })?;
        tracing::debug!(host, port, "TLS handshake complete");

        Ok(BoxedSocket::new(tls_stream))
    }
}

impl Connect for ConnectJob {
    fn connect(&self, host: &str, port: u16, use_tls: bool) -> Connecting {
        let host = host.to_string();
        let tls = self.tls.clone();
        Box::pin(async move { ConnectJob::connect_to(&host, port, use_tls, &tls).await })
    }
}
