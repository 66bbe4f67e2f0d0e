//! Socket abstraction for polymorphic stream handling.
//!
//! This module provides a `StreamSocket` trait that allows uniform handling of
//! different socket types: plain TCP, TLS over TCP, and in-memory pipes used by
//! tests.
//!
//! Based on Chromium's `StreamSocket` interface which provides polymorphism
//! for `TcpClientSocket` and `SSLClientSocket`.

use futures::FutureExt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A trait for any socket that supports async read/write operations.
///
/// Chromium equivalent: `net::StreamSocket`
pub trait StreamSocket: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {
    /// Non-blocking check that the peer has not closed the connection and
    /// that no unsolicited bytes are waiting. Matches Chromium's
    /// `IsConnectedAndIdle()`.
    fn is_connected(&self) -> bool {
        true
    }
}

impl StreamSocket for TcpStream {
    fn is_connected(&self) -> bool {
        tcp_is_connected_and_idle(self)
    }
}

impl StreamSocket for SslStream<TcpStream> {
    fn is_connected(&self) -> bool {
        tcp_is_connected_and_idle(self.get_ref())
    }
}

impl StreamSocket for DuplexStream {}

/// Peek one byte without blocking.
/// - nothing ready: connected and idle
/// - EOF: closed by the peer
/// - data: the peer sent something we never asked for, the socket is unusable
fn tcp_is_connected_and_idle(stream: &TcpStream) -> bool {
    if stream.peer_addr().is_err() {
        return false;
    }

    let mut buf = [0u8; 1];
    match stream.peek(&mut buf).now_or_never() {
        None => true,
        Some(Ok(_)) | Some(Err(_)) => false,
    }
}

/// A wrapper type for boxed dynamic StreamSocket that is object-safe.
/// This avoids conflicting trait implementations with tokio's blanket impls.
pub struct BoxedSocket {
    inner: Pin<Box<dyn StreamSocket>>,
}

impl BoxedSocket {
    /// Create a new BoxedSocket from any StreamSocket.
    pub fn new<S: StreamSocket>(socket: S) -> Self {
        Self { inner: Box::pin(socket) }
    }

    /// Check if the socket is connected.
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }
}

impl std::fmt::Debug for BoxedSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedSocket").finish_non_exhaustive()
    }
}

impl AsyncRead for BoxedSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for BoxedSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_boxed_socket_round_trip() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut socket = BoxedSocket::new(client);

        socket.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        server.write_all(b"pong").await.unwrap();
        socket.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong");
        assert!(socket.is_connected());
    }

    #[tokio::test]
    async fn test_tcp_closed_by_peer_is_not_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        assert!(client.is_connected());

        drop(server);
        // Wait until the FIN is observable.
        client.readable().await.unwrap();
        assert!(!client.is_connected());
    }
}
