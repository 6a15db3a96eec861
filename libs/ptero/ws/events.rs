//! Console socket payloads and their decoded events

use crate::conversions::{to_camel_case, ConvertOptions};
use crate::error::{PteroError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw frame exchanged with the daemon: `{ "event": ..., "args": [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsPayload {
    pub event: String,
    #[serde(default, deserialize_with = "string_args")]
    pub args: Vec<String>,
}

impl WsPayload {
    pub fn new(event: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }

    pub fn auth(token: impl Into<String>) -> Self {
        Self::new("auth", vec![token.into()])
    }

    /// Arguments joined the way the daemon splits multi-part values
    pub fn joined(&self) -> String {
        self.args.join(",")
    }
}

/// Args are strings on the wire, but tolerate null and non-string entries
fn string_args<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Live resource usage pushed by the `stats` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerStats {
    pub memory_bytes: u64,
    pub memory_limit_bytes: u64,
    pub cpu_absolute: f64,
    pub disk_bytes: u64,
    pub network: NetworkStats,
    pub state: String,
    pub uptime: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShardEvent {
    AuthSuccess,
    TokenExpiring,
    TokenExpired,
    BackupCompleted(Value),
    ConsoleOutput(Vec<String>),
    DaemonMessage(Vec<String>),
    DaemonError(String),
    InstallStarted,
    InstallOutput(Vec<String>),
    InstallCompleted,
    JwtError(String),
    Stats(ServerStats),
    Status(String),
    TransferLogs(Vec<String>),
    TransferStatus(String),
    Unknown(String),
}

impl ShardEvent {
    /// Decode a payload; fails only when a JSON-carrying event has bad JSON
    pub fn parse(payload: &WsPayload) -> Result<Self> {
        let event = match payload.event.as_str() {
            "auth success" => ShardEvent::AuthSuccess,
            "token expiring" => ShardEvent::TokenExpiring,
            "token expired" => ShardEvent::TokenExpired,
            "backup completed" => ShardEvent::BackupCompleted(json_arg(payload)?),
            "console output" => ShardEvent::ConsoleOutput(payload.args.clone()),
            "daemon message" => ShardEvent::DaemonMessage(payload.args.clone()),
            "daemon error" => ShardEvent::DaemonError(payload.joined()),
            "install started" => ShardEvent::InstallStarted,
            "install output" => ShardEvent::InstallOutput(payload.args.clone()),
            "install completed" => ShardEvent::InstallCompleted,
            "jwt error" => ShardEvent::JwtError(payload.joined()),
            "stats" => {
                let stats = serde_json::from_value(json_arg(payload)?)
                    .map_err(|e| PteroError::DeserializeFailed(format!("stats: {}", e)))?;
                ShardEvent::Stats(stats)
            }
            "status" => ShardEvent::Status(payload.joined()),
            "transfer logs" => ShardEvent::TransferLogs(payload.args.clone()),
            "transfer status" => {
                ShardEvent::TransferStatus(payload.args.first().cloned().unwrap_or_default())
            }
            other => ShardEvent::Unknown(other.to_string()),
        };

        Ok(event)
    }
}

fn json_arg(payload: &WsPayload) -> Result<Value> {
    let raw: Value = serde_json::from_str(&payload.joined()).map_err(|e| {
        PteroError::DeserializeFailed(format!("'{}' payload: {}", payload.event, e))
    })?;
    Ok(to_camel_case(&raw, &ConvertOptions::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(event: &str, args: &[&str]) -> WsPayload {
        WsPayload::new(event, args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_payload_args_default_and_coerce() {
        let p: WsPayload = serde_json::from_str(r#"{"event":"auth success"}"#).unwrap();
        assert!(p.args.is_empty());

        let p: WsPayload = serde_json::from_str(r#"{"event":"x","args":null}"#).unwrap();
        assert!(p.args.is_empty());

        let p: WsPayload = serde_json::from_str(r#"{"event":"x","args":["a",1]}"#).unwrap();
        assert_eq!(p.args, vec!["a", "1"]);
    }

    #[test]
    fn test_auth_payload_shape() {
        let out = serde_json::to_value(WsPayload::auth("jwt")).unwrap();
        assert_eq!(out, json!({"event": "auth", "args": ["jwt"]}));
    }

    #[test]
    fn test_stats_are_camel_cased() {
        let raw = r#"{"memory_bytes":1024,"memory_limit_bytes":2048,"cpu_absolute":12.5,"network":{"rx_bytes":1,"tx_bytes":2},"state":"running","disk_bytes":4096,"uptime":60000}"#;
        match ShardEvent::parse(&payload("stats", &[raw])).unwrap() {
            ShardEvent::Stats(stats) => {
                assert_eq!(stats.memory_bytes, 1024);
                assert_eq!(stats.memory_limit_bytes, 2048);
                assert_eq!(stats.cpu_absolute, 12.5);
                assert_eq!(stats.network.tx_bytes, 2);
                assert_eq!(stats.state, "running");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_bad_stats_json_is_an_error() {
        assert!(ShardEvent::parse(&payload("stats", &["{not json"])).is_err());
    }

    #[test]
    fn test_backup_completed() {
        let event = ShardEvent::parse(&payload(
            "backup completed",
            &[r#"{"uuid":"b1","is_successful":true,"checksum_type":"sha1"}"#],
        ))
        .unwrap();
        assert_eq!(
            event,
            ShardEvent::BackupCompleted(json!({"uuid": "b1", "isSuccessful": true, "checksumType": "sha1"}))
        );
    }

    #[test]
    fn test_text_events() {
        assert_eq!(
            ShardEvent::parse(&payload("console output", &["[Server] Done"])).unwrap(),
            ShardEvent::ConsoleOutput(vec!["[Server] Done".into()])
        );
        assert_eq!(
            ShardEvent::parse(&payload("status", &["running"])).unwrap(),
            ShardEvent::Status("running".into())
        );
        assert_eq!(
            ShardEvent::parse(&payload("transfer status", &[])).unwrap(),
            ShardEvent::TransferStatus(String::new())
        );
        assert_eq!(
            ShardEvent::parse(&payload("daemon error", &["a", "b"])).unwrap(),
            ShardEvent::DaemonError("a,b".into())
        );
    }

    #[test]
    fn test_unknown_event() {
        assert_eq!(
            ShardEvent::parse(&payload("deleted", &[])).unwrap(),
            ShardEvent::Unknown("deleted".into())
        );
    }
}
