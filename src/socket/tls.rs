use crate::base::neterror::NetError;
use boring::ssl::{SslConnectorBuilder, SslVerifyMode, SslVersion};

/// TLS client configuration applied to every HTTPS connection.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    /// OpenSSL cipher string; `None` keeps the BoringSSL default.
    pub cipher_list: Option<String>,
    /// Verify the certificate chain and that it names the host.
    pub verify_peer: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            cipher_list: None,
            verify_peer: true,
        }
    }
}

impl TlsConfig {
    /// A configuration that accepts any certificate. Test servers only.
    pub fn insecure() -> Self {
        Self { verify_peer: false, ..Self::default() }
    }

    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        if let Some(min) = self.min_version {
            builder
                .set_min_proto_version(Some(min))
                .map_err(|e| NetError::SslProtocolError(e.to_string()))?;
        }
        if let Some(max) = self.max_version {
            builder
                .set_max_proto_version(Some(max))
                .map_err(|e| NetError::SslProtocolError(e.to_string()))?;
        }

        if let Some(ciphers) = &self.cipher_list {
            builder.set_cipher_list(ciphers).map_err(|e| NetError::SslProtocolError(e.to_string()))?;
        }

        // HTTP/1.0 only; no ALPN so the server never selects h2.
        if self.verify_peer {
            builder.set_verify(SslVerifyMode::PEER);
        } else {
            builder.set_verify(SslVerifyMode::NONE);
        }

        Ok(())
    }

    /// Check if SNI (Server Name Indication) should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        host.parse::<std::net::IpAddr>().is_err()
    }
}
