use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::config::{UpstreamConfig, UpstreamTimeouts};
use super::types::UpstreamError;
use super::*;

fn test_config(endpoint: String, request_secs: u64) -> UpstreamConfig {
    UpstreamConfig {
        endpoint,
        api_key: "test-key".into(),
        timeouts: UpstreamTimeouts { request_secs, connect_secs: request_secs },
    }
}

/// Read a full HTTP request (headers + declared body) from the socket.
async fn read_request(sock: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = sock.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text
                .lines()
                .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(str::trim).map(String::from))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    data
}

/// Spawn a listener that answers exactly one request with a canned response.
async fn spawn_one_shot_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        read_request(&mut sock).await;
        let resp = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = sock.write_all(resp.as_bytes()).await;
        let _ = sock.shutdown().await;
    });
    format!("http://{addr}")
}

#[test]
fn parse_response_with_token_count() {
    let completion = parse_response(r#"{"text":"Sure, I can help.","total_tokens":42}"#).unwrap();
    assert_eq!(completion.text, "Sure, I can help.");
    assert_eq!(completion.total_tokens, Some(42));
}

#[test]
fn parse_response_without_token_count() {
    let completion = parse_response(r#"{"text":"hi"}"#).unwrap();
    assert_eq!(completion.text, "hi");
    assert_eq!(completion.total_tokens, None);
}

#[test]
fn parse_response_preserves_empty_text() {
    // The pipeline decides what an empty reply means; the client passes it up.
    let completion = parse_response(r#"{"text":"   "}"#).unwrap();
    assert_eq!(completion.text, "   ");
}

#[test]
fn parse_response_rejects_malformed_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, UpstreamError::Parse(_)));
}

#[tokio::test]
async fn complete_returns_text_and_tokens() {
    let endpoint = spawn_one_shot_server("200 OK", r#"{"text":"Sure, I can help.","total_tokens":42}"#).await;
    let client = HttpUpstreamClient::from_config(test_config(endpoint, 5)).unwrap();

    let completion = client.complete("say hi").await.unwrap();
    assert_eq!(completion.text, "Sure, I can help.");
    assert_eq!(completion.total_tokens, Some(42));
}

#[tokio::test]
async fn complete_maps_non_success_status() {
    let endpoint = spawn_one_shot_server("500 Internal Server Error", "boom").await;
    let client = HttpUpstreamClient::from_config(test_config(endpoint, 5)).unwrap();

    let err = client.complete("say hi").await.unwrap_err();
    match err {
        UpstreamError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_times_out_when_upstream_never_responds() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        read_request(&mut sock).await;
        // Hold the connection open without ever answering.
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(sock);
    });

    let client = HttpUpstreamClient::from_config(test_config(format!("http://{addr}"), 1)).unwrap();
    let started = Instant::now();
    let err = client.complete("say hi").await.unwrap_err();

    assert!(matches!(err, UpstreamError::Timeout { timeout_secs: 1 }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5), "timeout took {:?}", started.elapsed());
}

#[tokio::test]
async fn complete_maps_connection_refused_to_request_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpUpstreamClient::from_config(test_config(format!("http://{addr}"), 2)).unwrap();
    let err = client.complete("say hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Request(_) | UpstreamError::Timeout { .. }), "got {err:?}");
}
