use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use url::Url;

use wirehttp::demo::{BAD_REQUEST_HTML, DemoHandler};
use wirehttp::proxy::Upstream;
use wirehttp::server::Server;

fn demo_handler() -> DemoHandler {
    let upstream = Url::parse("http://127.0.0.1:9").unwrap();
    DemoHandler::new(Upstream::new(upstream, Duration::from_millis(100)))
}

async fn send(server: &Server, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_server_answers_and_closes() {
    let server = Server::serve("127.0.0.1:0", demo_handler()).await.unwrap();
    assert!(server.is_listening());

    let response = send(&server, b"GET /yourproblem HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with(BAD_REQUEST_HTML));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_server_handles_concurrent_connections() {
    let server = Server::serve("127.0.0.1:0", demo_handler()).await.unwrap();
    let addr = server.local_addr();

    // Hold one connection open mid-request; others must not wait on it.
    let mut stalled = TcpStream::connect(addr).await.unwrap();
    stalled.write_all(b"GET / HTTP/1.1\r\nHo").await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        tasks.push(tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n")
                .await
                .unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).await.unwrap();
            String::from_utf8(response).unwrap()
        }));
    }

    for task in tasks {
        let response = task.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    stalled.write_all(b"st: x\r\n\r\n").await.unwrap();
    let mut response = Vec::new();
    stalled.read_to_end(&mut response).await.unwrap();
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_server_rejects_bad_version() {
    let server = Server::serve("127.0.0.1:0", demo_handler()).await.unwrap();

    let response = send(&server, b"GET / HTTP/2.0\r\nHost: x\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(response.contains("http version not supported: 2.0"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_close_stops_accepting() {
    let server = Server::serve("127.0.0.1:0", demo_handler()).await.unwrap();
    let addr = server.local_addr();

    server.close().await.unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
