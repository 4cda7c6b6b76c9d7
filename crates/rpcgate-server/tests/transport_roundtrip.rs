//! TCP and HTTP transports on ephemeral ports.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use rpcgate_core::protocol::codec::decode_response;
use rpcgate_server::app_state::AppState;
use rpcgate_server::transport::codec::{discard_line, read_frame};
use rpcgate_server::{config, router, transport};

const CFG: &str = r#"
version: 1
server:
  max_frame_bytes: 256
users:
  - { username: root, full_name: Root, role: admin, password: toor }
"#;

fn state() -> AppState {
    AppState::new(config::load_from_str(CFG).unwrap()).unwrap()
}

async fn spawn_tcp(app: AppState) -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        transport::tcp::serve(app, listener, async move {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });
    (addr, tx, task)
}

async fn tcp_call(addr: SocketAddr, line: &[u8]) -> serde_json::Value {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(line).await.unwrap();
    stream.write_all(b"\n").await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[tokio::test]
async fn tcp_one_request_per_connection() {
    let (addr, stop, task) = spawn_tcp(state()).await;

    let resp = tcp_call(addr, br#"{"name":"nonexistent_op","args":[]}"#).await;
    assert_eq!(
        resp,
        json!({
            "result": null,
            "error": "Invalid method: Method 'nonexistent_op' not found in available services."
        })
    );

    let resp = tcp_call(
        addr,
        br#"{"name":"check_password","args":[{"id":"root","password":"toor"}]}"#,
    )
    .await;
    assert_eq!(resp, json!({ "result": true, "error": null }));

    stop.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn tcp_garbage_gets_error_response() {
    let app = state();
    let (addr, stop, task) = spawn_tcp(app.clone()).await;

    let resp = tcp_call(addr, b"not json").await;
    assert!(resp["error"].as_str().unwrap().starts_with("Bad request: invalid request json"));
    assert!(resp["result"].is_null());

    assert_eq!(app.metrics().decode_errors.get(&[("transport", "tcp")]), 1);

    stop.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn tcp_oversized_frame_gets_error_response() {
    let app = state();
    let (addr, stop, task) = spawn_tcp(app.clone()).await;

    let line = format!(r#"{{"name":"get_user","args":["{}"]}}"#, "x".repeat(400));
    let resp = tcp_call(addr, line.as_bytes()).await;
    let err = resp["error"].as_str().unwrap();
    assert!(err.starts_with("Bad request: payload too large"), "{err}");
    assert!(resp["result"].is_null());

    assert_eq!(app.metrics().decode_errors.get(&[("transport", "tcp")]), 1);
    assert_eq!(app.metrics().requests.get(&[("outcome", "bad_request")]), 1);

    // the connection after it is served normally
    let resp = tcp_call(addr, br#"{"name":"nonexistent_op"}"#).await;
    assert!(resp["error"].as_str().unwrap().starts_with("Invalid method:"));

    stop.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn discard_line_stops_after_terminator_or_limit() {
    let data: &[u8] = b"rest of line\nnext\n";
    let mut rd = BufReader::new(data);
    assert_eq!(discard_line(&mut rd, 64).await.unwrap(), 13);
    assert_eq!(read_frame(&mut rd, 64).await.unwrap().unwrap(), b"next".to_vec());

    let endless: &[u8] = b"aaaaaaaaaa";
    let mut rd = BufReader::new(endless);
    assert_eq!(discard_line(&mut rd, 4).await.unwrap(), 4);
    assert_eq!(discard_line(&mut rd, 64).await.unwrap(), 6);
}

#[tokio::test]
async fn read_frame_strips_terminator_and_reports_eof() {
    let data: &[u8] = b"{\"name\":\"x\"}\n";
    let mut rd = BufReader::new(data);
    assert_eq!(read_frame(&mut rd, 64).await.unwrap().unwrap(), b"{\"name\":\"x\"}".to_vec());
    assert!(read_frame(&mut rd, 64).await.unwrap().is_none());

    let exact: &[u8] = b"abcd\n";
    let mut rd = BufReader::new(exact);
    assert_eq!(read_frame(&mut rd, 4).await.unwrap().unwrap(), b"abcd".to_vec());

    let long: &[u8] = b"abcdef\n";
    let mut rd = BufReader::new(long);
    let err = read_frame(&mut rd, 4).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "PAYLOAD_TOO_LARGE");
}

async fn http_request(addr: SocketAddr, raw: String) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn http_rpc_and_metrics() {
    let app = state();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router::build_router(app))
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });

    let body = r#"{"name":"get_user","args":["root"]}"#;
    let raw = format!(
        "POST /v1/rpc HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let out = http_request(addr, raw).await;
    assert!(out.starts_with("HTTP/1.1 200"), "{out}");
    let (_, payload) = out.split_once("\r\n\r\n").unwrap();
    let resp = decode_response(payload.as_bytes()).unwrap();
    assert_eq!(resp.error(), Some("Permission denied: Missing metadata for authorization."));

    let out = http_request(
        addr,
        "GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".into(),
    )
    .await;
    assert!(out.contains("rpcgate_requests_total{outcome=\"permission_denied\"} 1"), "{out}");

    let out = http_request(
        addr,
        "GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".into(),
    )
    .await;
    assert!(out.starts_with("HTTP/1.1 200"));

    tx.send(()).unwrap();
    server.await.unwrap();
}
