//! Integration tests for console shards against a mock daemon socket

mod common;

use common::{eventually, CountingTokens, MockDaemon, Received};
use ptero::client::types::PowerSignal;
use ptero::error::PteroError;
use ptero::ws::{ConnectionState, ServerStats, Shard, ShardHandler};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const PANEL: &str = "https://panel.example.com";

/// Forwards every callback as a short string
struct ChannelHandler {
    tx: mpsc::UnboundedSender<String>,
}

impl ShardHandler for ChannelHandler {
    fn on_error(&self, error: &PteroError) {
        let _ = self.tx.send(format!("error: {}", error));
    }
    fn on_ready(&self) {
        let _ = self.tx.send("ready".into());
    }
    fn on_console_output(&self, lines: &[String]) {
        let _ = self.tx.send(format!("console: {}", lines.join("|")));
    }
    fn on_stats_update(&self, stats: &ServerStats) {
        let _ = self.tx.send(format!("stats: {} {}", stats.state, stats.memory_bytes));
    }
    fn on_status_update(&self, status: &str) {
        let _ = self.tx.send(format!("status: {}", status));
    }
    fn on_install_complete(&self) {
        let _ = self.tx.send("install complete".into());
    }
}

fn handler() -> (Arc<ChannelHandler>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelHandler { tx }), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a handler callback")
        .expect("handler channel closed")
}

async fn connected() -> (MockDaemon, Arc<CountingTokens>, Shard, mpsc::UnboundedReceiver<String>) {
    let daemon = MockDaemon::start().await;
    let tokens = Arc::new(CountingTokens::new(daemon.ws_url()));
    let shard = Shard::new("abcd1234", PANEL, tokens.clone());
    let (handler, rx) = handler();

    shard.connect(handler).await.unwrap();
    (daemon, tokens, shard, rx)
}

#[tokio::test]
async fn test_connect_sends_auth_with_origin() {
    let (daemon, tokens, shard, _rx) = connected().await;

    assert_eq!(
        daemon.next().await,
        Received::Text(json!({"event": "auth", "args": ["token-1"]}))
    );
    assert_eq!(daemon.origin().as_deref(), Some(PANEL));
    assert_eq!(tokens.issued(), 1);
    assert!(shard.is_connected());
}

#[tokio::test]
async fn test_events_are_dispatched() {
    let (daemon, _tokens, _shard, mut rx) = connected().await;
    daemon.next().await;

    daemon.push("auth success", &[]);
    daemon.push("console output", &["[Server] Done (3.2s)!"]);
    daemon.push("status", &["running"]);
    daemon.push(
        "stats",
        &[r#"{"memory_bytes":512,"memory_limit_bytes":1024,"cpu_absolute":1.5,"network":{"rx_bytes":0,"tx_bytes":0},"state":"running","disk_bytes":0,"uptime":10}"#],
    );
    daemon.push("install completed", &[]);

    assert_eq!(next_event(&mut rx).await, "ready");
    assert_eq!(next_event(&mut rx).await, "console: [Server] Done (3.2s)!");
    assert_eq!(next_event(&mut rx).await, "status: running");
    assert_eq!(next_event(&mut rx).await, "stats: running 512");
    assert_eq!(next_event(&mut rx).await, "install complete");
}

#[tokio::test]
async fn test_unknown_event_reported_as_error() {
    let (daemon, _tokens, _shard, mut rx) = connected().await;
    daemon.next().await;

    daemon.push("backup restore completed", &[]);

    assert_eq!(
        next_event(&mut rx).await,
        "error: received unknown event 'backup restore completed'"
    );
}

#[tokio::test]
async fn test_bad_stats_reported_as_error() {
    let (daemon, _tokens, shard, mut rx) = connected().await;
    daemon.next().await;

    daemon.push("stats", &["{oops"]);

    assert!(next_event(&mut rx).await.starts_with("error: "));
    assert!(shard.is_connected());
}

#[tokio::test]
async fn test_token_expiring_reauthenticates() {
    let (daemon, tokens, shard, _rx) = connected().await;
    daemon.next().await;

    daemon.push("token expiring", &[]);

    assert_eq!(
        daemon.next().await,
        Received::Text(json!({"event": "auth", "args": ["token-2"]}))
    );
    assert_eq!(tokens.issued(), 2);
    assert!(shard.is_connected());
}

#[tokio::test]
async fn test_token_expired_disconnects() {
    let (daemon, _tokens, shard, _rx) = connected().await;
    daemon.next().await;

    daemon.push("token expired", &[]);

    assert!(matches!(daemon.next().await, Received::Close(_) | Received::Ended));
    assert!(eventually(|| shard.state() == ConnectionState::Disconnected).await);
    assert!(matches!(shard.request_logs(), Err(PteroError::NotConnected)));
}

#[tokio::test]
async fn test_outgoing_commands() {
    let (daemon, _tokens, shard, _rx) = connected().await;
    daemon.next().await;

    shard.request_logs().unwrap();
    shard.request_stats().unwrap();
    shard.send_command("say hello").unwrap();
    shard.set_power_state(PowerSignal::Restart).unwrap();

    assert_eq!(daemon.next().await, Received::Text(json!({"event": "send logs", "args": []})));
    assert_eq!(daemon.next().await, Received::Text(json!({"event": "send stats", "args": []})));
    assert_eq!(
        daemon.next().await,
        Received::Text(json!({"event": "send command", "args": ["say hello"]}))
    );
    assert_eq!(
        daemon.next().await,
        Received::Text(json!({"event": "set state", "args": ["restart"]}))
    );
}

#[tokio::test]
async fn test_destroy_closes_normally() {
    let (daemon, _tokens, shard, _rx) = connected().await;
    daemon.next().await;

    shard.destroy();

    assert_eq!(daemon.next().await, Received::Close(Some(1000)));
    assert!(!shard.is_connected());
    assert!(matches!(shard.send_command("stop"), Err(PteroError::NotConnected)));
}

#[tokio::test]
async fn test_connect_fails_when_socket_unreachable() {
    let tokens = Arc::new(CountingTokens::new("ws://127.0.0.1:1"));
    let shard = Shard::new("abcd1234", PANEL, tokens);
    let (handler, _rx) = handler();

    let err = shard.connect(handler).await.unwrap_err();
    assert!(matches!(err, PteroError::WebSocket(_)));
    assert!(!shard.is_connected());
}
