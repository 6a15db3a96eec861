use super::events::{ServerStats, WsPayload};
use crate::client::types::WebSocketAuth;
use crate::error::{PteroError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Supplies console socket credentials for a server
///
/// Called once per `connect` and again whenever the daemon reports that the
/// current token is about to expire.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn websocket_auth(&self, server: &str) -> Result<WebSocketAuth>;
}

/// Callbacks for a shard's socket events
///
/// Every method defaults to doing nothing, so implementors override only
/// what they need. Callbacks run on the shard's socket task and should not
/// block.
pub trait ShardHandler: Send + Sync {
    fn on_debug(&self, _message: &str) {}

    /// Every decoded frame, before it is dispatched
    fn on_raw(&self, _payload: &WsPayload) {}

    fn on_error(&self, _error: &PteroError) {}

    /// The daemon accepted the auth token
    fn on_ready(&self) {}

    fn on_backup_complete(&self, _backup: &Value) {}

    fn on_console_output(&self, _lines: &[String]) {}

    fn on_daemon_output(&self, _lines: &[String]) {}

    fn on_daemon_error(&self, _message: &str) {}

    fn on_install_start(&self) {}

    fn on_install_output(&self, _lines: &[String]) {}

    fn on_install_complete(&self) {}

    fn on_jwt_error(&self, _message: &str) {}

    fn on_stats_update(&self, _stats: &ServerStats) {}

    fn on_status_update(&self, _status: &str) {}

    fn on_transfer_output(&self, _lines: &[String]) {}

    fn on_transfer_status(&self, _status: &str) {}
}

/// Handler that ignores everything
pub struct NoopHandler;

impl ShardHandler for NoopHandler {}

/// Fixed credentials, for daemons reached without the panel
pub struct StaticToken(pub WebSocketAuth);

#[async_trait]
impl TokenSource for StaticToken {
    async fn websocket_auth(&self, _server: &str) -> Result<WebSocketAuth> {
        Ok(self.0.clone())
    }
}
