use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::base::urlref::UrlRef;
use crate::http::parser::{read_headers, read_status_line, ResponseHead};
use crate::http::request::format_request;
use crate::http::response::{read_response_body, HttpResponse};
use crate::socket::pool::{ClientSocketPool, PooledSocket};
use bytes::Bytes;
use http::Method;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

/// Internal state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    CreateStream,
    SendRequest,
    ReadStatusLine,
    ReadHeaders,
    ReadBody,
    Done,
}

impl State {
    /// Map internal state to public LoadState.
    fn to_load_state(self) -> LoadState {
        match self {
            State::Idle => LoadState::Idle,
            State::CreateStream => LoadState::Connecting,
            State::SendRequest => LoadState::SendingRequest,
            State::ReadStatusLine | State::ReadHeaders => LoadState::WaitingForResponse,
            State::ReadBody => LoadState::ReadingResponse,
            State::Done => LoadState::Idle,
        }
    }
}

/// One request/response exchange over a pooled connection.
///
/// A reused connection that turns out to be dead before the status line
/// arrives is replaced once with a fresh one; every other failure is final.
pub struct HttpNetworkTransaction {
    pool: ClientSocketPool,
    url: UrlRef,
    method: Method,
    user_agent: String,
    read_timeout: Option<Duration>,
    state: State,
    retried: bool,
}

impl HttpNetworkTransaction {
    pub fn new(pool: ClientSocketPool, url: UrlRef, user_agent: impl Into<String>) -> Self {
        Self {
            pool,
            url,
            method: Method::GET,
            user_agent: user_agent.into(),
            read_timeout: None,
            state: State::Idle,
            retried: false,
        }
    }

    /// Bound every write and read on the connection.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Get the current load state (for progress reporting).
    pub fn get_load_state(&self) -> LoadState {
        self.state.to_load_state()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Run the exchange to completion.
    pub async fn start(&mut self) -> Result<HttpResponse, NetError> {
        let (Some(scheme), Some(authority)) = (self.url.scheme(), self.url.authority()) else {
            return Err(NetError::InvalidUrl(self.url.raw().to_string()));
        };
        let (host, port, use_tls) = (authority.host.clone(), authority.port, scheme.uses_tls());

        let host_header = if scheme.default_port() == Some(port) {
            host.clone()
        } else {
            format!("{host}:{port}")
        };
        let request =
            format_request(&self.method, self.url.path(), &host_header, &self.user_agent)?;

        loop {
            self.state = State::CreateStream;
            let mut socket = self.pool.acquire(&host, port, use_tls).await?;
            let reused = socket.is_reused();

            match self.exchange(&mut socket, &request).await {
                Ok((response, leftover)) => {
                    self.state = State::Done;
                    if response.is_reusable() && !leftover {
                        socket.release();
                    } else {
                        tracing::debug!(%host, port, "connection not reusable after response");
                        socket.discard();
                    }
                    return Ok(response);
                }
                Err(err) => {
                    let before_status_line =
                        matches!(self.state, State::SendRequest | State::ReadStatusLine);
                    socket.discard();

                    if reused && !self.retried && before_status_line && err.is_connection_loss() {
                        tracing::warn!(
                            %host,
                            port,
                            error = %err,
                            "reused connection failed, retrying on a fresh connection"
                        );
                        self.retried = true;
                        continue;
                    }

                    self.state = State::Done;
                    return Err(err);
                }
            }
        }
    }

    /// Send the request and read the whole response. The flag reports bytes
    /// buffered past the end of the response.
    async fn exchange(
        &mut self,
        socket: &mut PooledSocket,
        request: &Bytes,
    ) -> Result<(HttpResponse, bool), NetError> {
        let limit = self.read_timeout;

        self.state = State::SendRequest;
        with_timeout(limit, async {
            socket.write_all(request).await?;
            socket.flush().await?;
            Ok::<_, NetError>(())
        })
        .await?;

        let mut reader = BufReader::new(&mut *socket);

        self.state = State::ReadStatusLine;
        let (version, status, reason) = with_timeout(limit, read_status_line(&mut reader)).await?;

        self.state = State::ReadHeaders;
        let headers = with_timeout(limit, read_headers(&mut reader)).await?;
        let head = ResponseHead { version, status, reason, headers };

        self.state = State::ReadBody;
        let response = with_timeout(limit, read_response_body(head, &mut reader)).await?;

        Ok((response, !reader.buffer().is_empty()))
    }
}

async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T, NetError>
where
    F: Future<Output = Result<T, NetError>>,
{
    match limit {
        Some(limit) => {
            tokio::time::timeout(limit, fut).await.map_err(|_| NetError::ConnectionTimedOut)?
        }
        None => fut.await,
    }
}
