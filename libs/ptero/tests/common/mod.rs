//! Common test utilities for ptero integration tests
//!
//! - envelope builders for wiremock responses
//! - a mock daemon console socket

#![allow(dead_code)]

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use ptero::client::types::WebSocketAuth;
use ptero::error::Result;
use ptero::ws::TokenSource;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const APP_KEY: &str = "ptla_test_key";
pub const CLIENT_KEY: &str = "ptlc_test_key";

/// `{ object, attributes }`
pub fn item(object: &str, attributes: Value) -> Value {
    json!({ "object": object, "attributes": attributes })
}

/// `{ object: "list", data: [...] }`
pub fn list(object: &str, items: Vec<Value>) -> Value {
    json!({
        "object": "list",
        "data": items.into_iter().map(|a| item(object, a)).collect::<Vec<_>>(),
    })
}

/// `{ errors: [{ code, status, detail }] }`
pub fn errors(code: &str, status: &str, detail: &str) -> Value {
    json!({ "errors": [{ "code": code, "status": status, "detail": detail }] })
}

pub fn user_attributes(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "external_id": null,
        "uuid": format!("uuid-{}", id),
        "username": username,
        "email": format!("{}@example.com", username),
        "first_name": "Test",
        "last_name": "User",
        "language": "en",
        "root_admin": false,
        "2fa": false,
        "created_at": "2021-03-01T12:00:00+00:00",
        "updated_at": "2021-03-02T12:00:00+00:00"
    })
}

/// A frame seen by the mock daemon
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Text(Value),
    Close(Option<u16>),
    Ended,
}

/// Single-connection mock of a daemon console socket
///
/// Records every frame the shard sends and forwards frames pushed with
/// [`MockDaemon::push`].
pub struct MockDaemon {
    pub addr: SocketAddr,
    received: Mutex<mpsc::UnboundedReceiver<Received>>,
    outgoing: mpsc::UnboundedSender<String>,
    origin: Arc<std::sync::Mutex<Option<String>>>,
}

impl MockDaemon {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (received_tx, received_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
        let origin = Arc::new(std::sync::Mutex::new(None));
        let origin_clone = Arc::clone(&origin);

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };

            let callback = |req: &Request, resp: Response| {
                let value = req
                    .headers()
                    .get("Origin")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *origin_clone.lock().unwrap() = value;
                Ok(resp)
            };

            let ws = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
                Ok(ws) => ws,
                Err(e) => {
                    eprintln!("WebSocket handshake failed: {}", e);
                    return;
                }
            };
            let (mut write, mut read) = ws.split();

            loop {
                tokio::select! {
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
                                let _ = received_tx.send(Received::Text(value));
                            }
                            Some(Ok(Message::Close(frame))) => {
                                let _ = received_tx.send(Received::Close(frame.map(|f| u16::from(f.code))));
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(_)) | None => {
                                let _ = received_tx.send(Received::Ended);
                                break;
                            }
                        }
                    }
                    out = outgoing_rx.recv() => {
                        match out {
                            Some(text) => {
                                if write.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        Self {
            addr,
            received: Mutex::new(received_rx),
            outgoing: outgoing_tx,
            origin,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send `{ event, args }` to the connected shard
    pub fn push(&self, event: &str, args: &[&str]) {
        let frame = json!({ "event": event, "args": args }).to_string();
        self.outgoing.send(frame).unwrap();
    }

    /// Next frame from the shard, waiting up to two seconds
    pub async fn next(&self) -> Received {
        let mut rx = self.received.lock().await;
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for a frame from the shard")
            .unwrap_or(Received::Ended)
    }

    pub fn origin(&self) -> Option<String> {
        self.origin.lock().unwrap().clone()
    }
}

/// Token source handing out `token-1`, `token-2`, ... for a fixed socket
pub struct CountingTokens {
    socket: String,
    issued: AtomicUsize,
}

impl CountingTokens {
    pub fn new(socket: impl Into<String>) -> Self {
        Self {
            socket: socket.into(),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for CountingTokens {
    async fn websocket_auth(&self, _server: &str) -> Result<WebSocketAuth> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(WebSocketAuth {
            token: format!("token-{}", n),
            socket: self.socket.clone(),
        })
    }
}

/// Wait until `check` holds, polling for up to two seconds
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..40 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    check()
}
