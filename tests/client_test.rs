//! End-to-end fetches against a local keep-alive HTTP server.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use textnet::{Client, NetError, UrlRef};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

struct Server {
    base_url: String,
    accepts: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

/// Serve requests on 127.0.0.1. `respond` maps a request path to the raw
/// response and whether to close the connection after sending it.
async fn spawn_server<F>(respond: F) -> Server
where
    F: Fn(&str) -> (Vec<u8>, bool) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let accepts = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(AtomicUsize::new(0));
    let respond = Arc::new(respond);

    let (accepts_clone, requests_clone) = (accepts.clone(), requests.clone());
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            accepts_clone.fetch_add(1, Ordering::SeqCst);
            let requests = requests_clone.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                loop {
                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    loop {
                        let mut line = String::new();
                        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                            return;
                        }
                        if line == "\r\n" {
                            break;
                        }
                    }
                    requests.fetch_add(1, Ordering::SeqCst);

                    let path = request_line.split(' ').nth(1).unwrap_or("/").to_string();
                    let (response, close) = respond(&path);
                    if reader.get_mut().write_all(&response).await.is_err() || close {
                        return;
                    }
                }
            });
        }
    });

    Server { base_url, accepts, requests }
}

fn ok(body: &str) -> (Vec<u8>, bool) {
    let response = format!("HTTP/1.0 200 OK\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
    (response.into_bytes(), false)
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[tokio::test]
async fn test_sequential_fetches_share_one_connection() {
    let server = spawn_server(|_| ok("<p>hello</p>")).await;
    let client = Client::new();
    let url = UrlRef::parse(&format!("{}/", server.base_url)).unwrap();

    assert_eq!(client.fetch(&url).await.unwrap(), "<p>hello</p>");
    assert_eq!(client.fetch(&url).await.unwrap(), "<p>hello</p>");

    assert_eq!(server.accepts.load(Ordering::SeqCst), 1);
    assert_eq!(server.requests.load(Ordering::SeqCst), 2);
    assert_eq!(client.socket_pool().idle_socket_count(), 1);
}

#[tokio::test]
async fn test_chunked_and_content_length_bodies_match() {
    let server = spawn_server(|path| match path {
        "/chunked" => (
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\n\r\n".to_vec(),
            false,
        ),
        _ => ok("Hello"),
    })
    .await;
    let client = Client::new();

    let fixed = client.load(&format!("{}/fixed", server.base_url)).await.unwrap();
    let chunked = client.load(&format!("{}/chunked", server.base_url)).await.unwrap();
    assert_eq!(fixed, "Hello");
    assert_eq!(fixed, chunked);
    assert_eq!(server.accepts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gzip_body_is_decoded() {
    let server = spawn_server(|_| {
        let body = gzip(b"<h1>squeezed</h1>");
        let mut response = format!(
            "HTTP/1.0 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(&body);
        (response, false)
    })
    .await;

    let text = Client::new().load(&format!("{}/", server.base_url)).await.unwrap();
    assert_eq!(text, "squeezed");
}

#[tokio::test]
async fn test_close_delimited_body_forces_new_connection() {
    let server = spawn_server(|_| (b"HTTP/1.0 200 OK\r\n\r\nuntil close".to_vec(), true)).await;
    let client = Client::new();
    let url = UrlRef::parse(&format!("{}/", server.base_url)).unwrap();

    assert_eq!(client.fetch(&url).await.unwrap(), "until close");
    assert_eq!(client.socket_pool().idle_socket_count(), 0);
    assert_eq!(client.fetch(&url).await.unwrap(), "until close");
    assert_eq!(server.accepts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_closing_between_requests_is_survived() {
    let server = spawn_server(|_| {
        (b"HTTP/1.0 200 OK\r\nConnection: close\r\nContent-Length: 2\r\n\r\nok".to_vec(), true)
    })
    .await;
    let client = Client::new();
    let url = format!("{}/", server.base_url);

    assert_eq!(client.load(&url).await.unwrap(), "ok");
    assert_eq!(client.load(&url).await.unwrap(), "ok");
    assert_eq!(server.accepts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_view_source_returns_markup() {
    let server = spawn_server(|_| ok("<p>a &lt; b</p>")).await;
    let client = Client::new();

    let source = client.load(&format!("view-source:{}/", server.base_url)).await.unwrap();
    let text = client.load(&format!("{}/", server.base_url)).await.unwrap();
    assert_eq!(source, "<p>a &lt; b</p>");
    assert_eq!(text, "a < b");
}

#[tokio::test]
async fn test_malformed_status_line() {
    let server = spawn_server(|_| (b"garbage\r\n\r\n".to_vec(), true)).await;
    let result = Client::new().load(&format!("{}/", server.base_url)).await;
    assert_eq!(result, Err(NetError::InvalidStatusLine("garbage".to_string())));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = Client::new().load(&format!("http://127.0.0.1:{port}/")).await.unwrap_err();
    match err {
        NetError::ConnectionFailedTo { host, port: p, .. } => {
            assert_eq!(host, "127.0.0.1");
            assert_eq!(p, port);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
