use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use textnet::http::request::format_request;
use textnet::http::response::read_response;
use textnet::UrlRef;

fn benchmark_format_request(c: &mut Criterion) {
    c.bench_function("format_request", |b| {
        b.iter(|| {
            format_request(
                &Method::GET,
                black_box("/wiki/Main_Page"),
                black_box("en.wikipedia.org"),
                "textnet/0.1",
            )
            .unwrap()
        })
    });
}

fn benchmark_parse_url(c: &mut Criterion) {
    c.bench_function("parse_url", |b| {
        b.iter(|| UrlRef::parse(black_box("https://example.org:8443/a/b/c?d=e")).unwrap())
    });
}

fn benchmark_read_response(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let body = "x".repeat(16 * 1024);

    let fixed = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );

    let mut chunked = String::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n");
    for piece in body.as_bytes().chunks(1024) {
        chunked.push_str(&format!("{:x}\r\n{}\r\n", piece.len(), String::from_utf8_lossy(piece)));
    }
    chunked.push_str("0\r\n\r\n");

    c.bench_function("read_response_content_length", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut reader = fixed.as_bytes();
            read_response(&mut reader).await.unwrap()
        })
    });

    c.bench_function("read_response_chunked", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut reader = chunked.as_bytes();
            read_response(&mut reader).await.unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_format_request,
    benchmark_parse_url,
    benchmark_read_response
);
criterion_main!(benches);
