use crate::base::neterror::NetError;
use crate::socket::connectjob::{Connect, ConnectJob};
use crate::socket::stream::BoxedSocket;
use dashmap::DashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Identifies a connection group (host, port).
/// HTTP and HTTPS to one host land in different groups through their ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupId {
    host: String,
    port: u16,
}

/// One parked connection per authority. The mutex is held for a whole
/// exchange so two requests never share the stream at the same time.
type Slot = Arc<Mutex<Option<BoxedSocket>>>;

/// A connection borrowed from the pool for one request/response exchange.
///
/// Call [`PooledSocket::release`] to park it for the next request to the same
/// authority. Dropping the handle instead closes the connection and leaves
/// the slot empty.
#[derive(Debug)]
pub struct PooledSocket {
    slot: OwnedMutexGuard<Option<BoxedSocket>>,
    socket: BoxedSocket,
    reused: bool,
}

impl PooledSocket {
    /// True when the connection served an earlier request.
    pub fn is_reused(&self) -> bool {
        self.reused
    }

    /// Return the connection to the pool.
    pub fn release(self) {
        let PooledSocket { mut slot, socket, .. } = self;
        *slot = Some(socket);
    }

    /// Close the connection without returning it.
    pub fn discard(self) {
        tracing::debug!("discarding connection");
    }
}

impl AsyncRead for PooledSocket {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().socket).poll_read(cx, buf)
    }
}

impl AsyncWrite for PooledSocket {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.get_mut().socket).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().socket).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().socket).poll_shutdown(cx)
    }
}

/// Keeps live connections keyed by authority and hands them out one
/// exchange at a time. Healthy connections are never closed after use.
pub struct ClientSocketPool {
    groups: Arc<DashMap<GroupId, Slot>>,
    connector: Arc<dyn Connect>,
    connect_timeout: Option<Duration>,
}

impl Clone for ClientSocketPool {
    fn clone(&self) -> Self {
        Self {
            groups: Arc::clone(&self.groups),
            connector: Arc::clone(&self.connector),
            connect_timeout: self.connect_timeout,
        }
    }
}

impl std::fmt::Debug for ClientSocketPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSocketPool")
            .field("groups", &self.groups.len())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for ClientSocketPool {
    fn default() -> Self {
        Self::new(Arc::new(ConnectJob::default()))
    }
}

impl ClientSocketPool {
    pub fn new(connector: Arc<dyn Connect>) -> Self {
        Self { groups: Arc::new(DashMap::new()), connector, connect_timeout: None }
    }

    /// Bound connection establishment. Without it, connecting blocks as long
    /// as the OS does.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Borrow the connection for `(host, port)`, creating one if none is
    /// parked or the parked one is dead.
    pub async fn acquire(
        &self,
        host: &str,
        port: u16,
        use_tls: bool,
    ) -> Result<PooledSocket, NetError> {
        let group_id = GroupId { host: host.to_string(), port };
        let slot = Arc::clone(self.groups.entry(group_id).or_default().value());

        // Release the map shard before waiting on the slot.
        let mut guard = slot.lock_owned().await;

        if let Some(mut socket) = guard.take() {
            if probe(&mut socket).await {
                tracing::trace!(host, port, "reusing pooled connection");
                return Ok(PooledSocket { slot: guard, socket, reused: true });
            }
            tracing::debug!(host, port, "pooled connection closed by peer, reconnecting");
        }

        let connecting = self.connector.connect(host, port, use_tls);
        let socket = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| NetError::ConnectionTimedOut)??,
            None => connecting.await?,
        };
        tracing::debug!(host, port, use_tls, "opened new connection");

        Ok(PooledSocket { slot: guard, socket, reused: false })
    }

    /// Whether a connection is parked for `(host, port)`.
    /// Returns false while the connection is borrowed.
    pub fn contains(&self, host: &str, port: u16) -> bool {
        let group_id = GroupId { host: host.to_string(), port };
        self.groups
            .get(&group_id)
            .and_then(|slot| slot.try_lock().ok().map(|s| s.is_some()))
            .unwrap_or(false)
    }

    /// Get the number of parked connections across all authorities.
    pub fn idle_socket_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|slot| slot.try_lock().map(|s| s.is_some()).unwrap_or(false))
            .count()
    }

    /// Close every parked connection. Slots stay in the map so that a
    /// borrower holding one can still release into it.
    pub fn clear(&self) {
        for slot in self.groups.iter() {
            if let Ok(mut parked) = slot.try_lock() {
                *parked = None;
            }
        }
    }
}

/// Liveness probe: the peer must not have closed the stream and a zero-byte
/// write must succeed.
async fn probe(socket: &mut BoxedSocket) -> bool {
    if !socket.is_connected() {
        return false;
    }
    socket.write(&[]).await.is_ok()
}
