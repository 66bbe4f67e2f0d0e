//! Addressable resources.
//!
//! A [`UrlRef`] is the parsed form of the URL strings the user agent accepts:
//! `scheme://host[:port]/path`, `data:<content-type>,<payload>`, `file:///path`
//! and `view-source:` wrapping any of the network forms.

use crate::base::neterror::NetError;
use std::fmt;
use std::str::FromStr;

const VIEW_SOURCE_PREFIX: &str = "view-source:";

/// Retrieval scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
        }
    }

    /// Port used when the URL names none. Only network schemes have one.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::File | Scheme::Data => None,
        }
    }

    pub fn is_network(self) -> bool {
        self.default_port().is_some()
    }

    pub fn uses_tls(self) -> bool {
        self == Scheme::Https
    }
}

impl FromStr for Scheme {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "file" => Ok(Scheme::File),
            "data" => Ok(Scheme::Data),
            other => Err(NetError::UnknownUrlScheme(other.to_string())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display mode wrapping another scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metascheme {
    ViewSource,
}

/// Network peer identity: the `(host, port)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    pub host: String,
    pub port: u16,
}

/// A parsed, immutable URL.
///
/// Exactly one of these holds: a host is present, or the scheme is `file`/`data`.
/// The only exception is [`UrlRef::empty`], which has no scheme at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRef {
    raw: String,
    metascheme: Option<Metascheme>,
    scheme: Option<Scheme>,
    authority: Option<Authority>,
    path: String,
}

impl UrlRef {
    /// The "no target" sentinel.
    pub fn empty() -> Self {
        Self {
            raw: String::new(),
            metascheme: None,
            scheme: None,
            authority: None,
            path: String::new(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, NetError> {
        if raw.is_empty() {
            return Ok(Self::empty());
        }

        if raw.starts_with("data") {
            let (scheme, rest) =
                raw.split_once(':').ok_or_else(|| NetError::InvalidUrl(raw.to_string()))?;
            if scheme.parse::<Scheme>()? != Scheme::Data {
                return Err(NetError::UnknownUrlScheme(scheme.to_string()));
            }
            return Ok(Self {
                raw: raw.to_string(),
                metascheme: None,
                scheme: Some(Scheme::Data),
                authority: None,
                path: rest.to_string(),
            });
        }

        if let Some(inner) = raw.strip_prefix(VIEW_SOURCE_PREFIX) {
            if inner.starts_with(VIEW_SOURCE_PREFIX) {
                return Err(NetError::InvalidUrl(raw.to_string()));
            }
            let (scheme, authority, path) = parse_hierarchical(inner)?;
            if !scheme.is_network() {
                return Err(NetError::InvalidUrl(raw.to_string()));
            }
            return Ok(Self {
                raw: raw.to_string(),
                metascheme: Some(Metascheme::ViewSource),
                scheme: Some(scheme),
                authority,
                path,
            });
        }

        let (scheme, authority, path) = parse_hierarchical(raw)?;
        Ok(Self { raw: raw.to_string(), metascheme: None, scheme: Some(scheme), authority, path })
    }

    pub fn is_empty(&self) -> bool {
        self.scheme.is_none()
    }

    /// The string this URL was parsed from. Used as the cache key.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn metascheme(&self) -> Option<Metascheme> {
        self.metascheme
    }

    pub fn is_view_source(&self) -> bool {
        self.metascheme == Some(Metascheme::ViewSource)
    }

    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }

    pub fn host(&self) -> Option<&str> {
        self.authority.as_ref().map(|a| a.host.as_str())
    }

    pub fn port(&self) -> Option<u16> {
        self.authority.as_ref().map(|a| a.port)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `scheme://host[:port]`, omitting a default port. `None` for local schemes.
    pub fn origin(&self) -> Option<String> {
        let scheme = self.scheme?;
        let authority = self.authority.as_ref()?;
        if scheme.default_port() == Some(authority.port) {
            Some(format!("{}://{}", scheme, authority.host))
        } else {
            Some(format!("{}://{}:{}", scheme, authority.host, authority.port))
        }
    }

    /// Resolve a redirect `Location` against this URL.
    ///
    /// Locations starting with `/` are relative to the current origin; anything
    /// else is parsed as an absolute URL. The result never carries a metascheme.
    pub fn resolve_location(&self, location: &str) -> Result<UrlRef, NetError> {
        if location.starts_with("//") {
            let scheme = self.scheme.ok_or_else(|| NetError::InvalidUrl(location.to_string()))?;
            return UrlRef::parse(&format!("{}:{}", scheme, location));
        }
        if location.starts_with('/') {
            let origin = self.origin().ok_or_else(|| NetError::InvalidUrl(location.to_string()))?;
            return UrlRef::parse(&format!("{}{}", origin, location));
        }
        UrlRef::parse(location)
    }
}

impl FromStr for UrlRef {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UrlRef::parse(s)
    }
}

impl fmt::Display for UrlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_view_source() {
            f.write_str(VIEW_SOURCE_PREFIX)?;
        }
        match self.scheme {
            None => Ok(()),
            Some(Scheme::Data) => write!(f, "data:{}", self.path),
            Some(Scheme::File) => write!(f, "file://{}", self.path),
            Some(_) => match self.origin() {
                Some(origin) => write!(f, "{}{}", origin, self.path),
                None => Ok(()),
            },
        }
    }
}

/// Parse `scheme://rest` for every scheme except the `data:` short form.
fn parse_hierarchical(input: &str) -> Result<(Scheme, Option<Authority>, String), NetError> {
    let (scheme, rest) =
        input.split_once("://").ok_or_else(|| NetError::InvalidUrl(input.to_string()))?;
    let scheme: Scheme = scheme.parse()?;

    match scheme {
        Scheme::Data => Ok((scheme, None, rest.to_string())),
        Scheme::File => {
            // The first slash separates the (empty) authority from an absolute path.
            let (host, path) =
                rest.split_once('/').ok_or_else(|| NetError::InvalidUrl(input.to_string()))?;
            if !host.is_empty() && host != "localhost" {
                return Err(NetError::InvalidUrl(input.to_string()));
            }
            Ok((scheme, None, format!("/{}", path)))
        }
        Scheme::Http | Scheme::Https => {
            let mut port = scheme.default_port().unwrap_or_default();
            let (host_port, path) = rest.split_once('/').unwrap_or((rest, ""));

            let host = match host_port.split_once(':') {
                Some((host, explicit)) => {
                    port = explicit
                        .parse::<u16>()
                        .map_err(|_| NetError::InvalidUrl(input.to_string()))?;
                    host
                }
                None => host_port,
            };
            if host.is_empty() {
                return Err(NetError::InvalidUrl(input.to_string()));
            }

            let authority = Authority { host: host.to_string(), port };
            Ok((scheme, Some(authority), format!("/{}", path)))
        }
    }
}
