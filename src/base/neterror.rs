use thiserror::Error;

/// Coarse error taxonomy, one bucket per failure domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed URL or scheme.
    Parse,
    /// Filesystem or socket failure.
    Io,
    /// Malformed status line, header, body framing or content coding.
    Protocol,
    RedirectWithoutLocation,
    RedirectLimitExceeded,
    /// A network response redirected to a local scheme.
    UnsafeRedirect,
    UnsupportedMediaType,
    CacheInvariantViolation,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // URL Errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unknown URL scheme: {0}")]
    UnknownUrlScheme(String),

    // Connection Errors
    #[error("Name not resolved for {domain}: {reason}")]
    NameNotResolvedFor { domain: String, reason: String },
    #[error("Connection to {host}:{port} failed: {reason}")]
    ConnectionFailedTo { host: String, port: u16, reason: String },
    #[error("SSL handshake with {host} failed: {reason}")]
    SslHandshakeFailed { host: String, reason: String },
    #[error("SSL protocol error: {0}")]
    SslProtocolError(String),
    #[error("Socket I/O failed: {0}")]
    SocketIo(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // File Errors
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Failed to read {path}: {reason}")]
    FileIo { path: String, reason: String },

    // HTTP Errors
    #[error("Invalid request header: {0:?}")]
    InvalidHeader(String),
    #[error("Empty response")]
    EmptyResponse,
    #[error("Invalid status line: {0:?}")]
    InvalidStatusLine(String),
    #[error("Malformed header line: {0:?}")]
    MalformedHeader(String),
    #[error("Invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
    #[error("Invalid chunked encoding: {0:?}")]
    InvalidChunkedEncoding(String),
    #[error("Incomplete chunked encoding")]
    IncompleteChunkedEncoding,
    #[error("Content-Length mismatch: expected {expected} bytes, got {received}")]
    ContentLengthMismatch { expected: usize, received: usize },
    #[error("Content decoding failed ({coding}): {reason}")]
    ContentDecodingFailed { coding: String, reason: String },

    // Retrieval Errors
    #[error("Redirect ({0}) without Location header")]
    RedirectWithoutLocation(u16),
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Unsafe redirect to {0}")]
    UnsafeRedirect(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Cache entry for {0} has no max-age")]
    CacheInvariantViolation(String),
}

impl NetError {
    /// Chromium `net_error_list.h` code for this error.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolvedFor { .. } => -105,
            NetError::SslProtocolError(_) => -107,
            NetError::ConnectionTimedOut => -118,
            NetError::SslHandshakeFailed { .. } => -107,
            NetError::SocketIo(_) => -15,
            NetError::FileNotFound(_) => -6,
            NetError::FileIo { .. } => -2,

            NetError::InvalidUrl(_) => -300,
            NetError::UnknownUrlScheme(_) => -302,
            NetError::TooManyRedirects => -310,
            NetError::UnsafeRedirect(_) => -311,
            NetError::InvalidHeader(_) => -300,
            NetError::InvalidStatusLine(_) => -320,
            NetError::MalformedHeader(_) => -320,
            NetError::InvalidChunkedEncoding(_) => -321,
            NetError::EmptyResponse => -324,
            NetError::ContentDecodingFailed { .. } => -330,
            NetError::InvalidContentLength(_) => -346,
            NetError::ContentLengthMismatch { .. } => -354,
            NetError::IncompleteChunkedEncoding => -355,
            NetError::RedirectWithoutLocation(_) => -370,

            // Custom codes, kept clear of the Blob range (-900 to -906)
            NetError::UnsupportedMediaType(_) => -10001,
            NetError::CacheInvariantViolation(_) => -10002,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            NetError::InvalidUrl(_) | NetError::UnknownUrlScheme(_) => ErrorCategory::Parse,
            NetError::NameNotResolvedFor { .. }
            | NetError::ConnectionFailedTo { .. }
            | NetError::SslHandshakeFailed { .. }
            | NetError::SslProtocolError(_)
            | NetError::SocketIo(_)
            | NetError::ConnectionClosed
            | NetError::ConnectionTimedOut
            | NetError::FileNotFound(_)
            | NetError::FileIo { .. } => ErrorCategory::Io,
            NetError::InvalidHeader(_)
            | NetError::EmptyResponse
            | NetError::InvalidStatusLine(_)
            | NetError::MalformedHeader(_)
            | NetError::InvalidContentLength(_)
            | NetError::InvalidChunkedEncoding(_)
            | NetError::IncompleteChunkedEncoding
            | NetError::ContentLengthMismatch { .. }
            | NetError::ContentDecodingFailed { .. } => ErrorCategory::Protocol,
            NetError::RedirectWithoutLocation(_) => ErrorCategory::RedirectWithoutLocation,
            NetError::TooManyRedirects => ErrorCategory::RedirectLimitExceeded,
            NetError::UnsafeRedirect(_) => ErrorCategory::UnsafeRedirect,
            NetError::UnsupportedMediaType(_) => ErrorCategory::UnsupportedMediaType,
            NetError::CacheInvariantViolation(_) => ErrorCategory::CacheInvariantViolation,
        }
    }

    /// Errors that indicate the transport went away underneath a reused socket.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, NetError::ConnectionClosed | NetError::SocketIo(_) | NetError::EmptyResponse)
    }

    pub(crate) fn connection_failed_to(host: &str, port: u16, err: std::io::Error) -> Self {
        NetError::ConnectionFailedTo { host: host.to_string(), port, reason: err.to_string() }
    }

    pub(crate) fn dns_failed(domain: &str, err: std::io::Error) -> Self {
        NetError::NameNotResolvedFor { domain: domain.to_string(), reason: err.to_string() }
    }

    pub(crate) fn file_failed(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            NetError::FileNotFound(path.to_string())
        } else {
            NetError::FileIo { path: path.to_string(), reason: err.to_string() }
        }
    }
}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => NetError::ConnectionClosed,
            std::io::ErrorKind::TimedOut => NetError::ConnectionTimedOut,
            _ => NetError::SocketIo(err.to_string()),
        }
    }
}
