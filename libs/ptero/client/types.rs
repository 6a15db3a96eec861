//! Client API entities

use crate::application::types::{FeatureLimits, Limits};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub admin: bool,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiKey {
    pub identifier: String,
    pub description: String,
    pub allowed_ips: Vec<String>,
    pub created_at: Option<i64>,
    pub last_used_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SshKey {
    pub name: String,
    pub fingerprint: String,
    pub public_key: String,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub batch: Option<String>,
    pub event: String,
    pub is_api: bool,
    pub ip: Option<String>,
    pub description: Option<String>,
    pub properties: Value,
    pub has_additional_metadata: bool,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SftpDetails {
    pub ip: String,
    pub port: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientServer {
    pub uuid: String,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub node: String,
    pub server_owner: bool,
    pub limits: Limits,
    pub feature_limits: FeatureLimits,
    pub sftp_details: SftpDetails,
    pub status: Option<String>,
    pub invocation: String,
    pub docker_image: String,
    pub is_suspended: bool,
    pub is_installing: bool,
    pub is_transferring: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceUsage {
    pub memory_bytes: u64,
    pub cpu_absolute: f64,
    pub disk_bytes: u64,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub uptime: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resources {
    pub current_state: String,
    pub is_suspended: bool,
    pub resources: ResourceUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct File {
    pub name: String,
    pub mode: String,
    pub mode_bits: String,
    pub size: u64,
    pub is_file: bool,
    pub is_symlink: bool,
    pub mimetype: String,
    pub created_at: Option<i64>,
    pub modified_at: Option<String>,
}

/// One permission group as listed by `/api/client/permissions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionDescriptor {
    pub description: String,
    pub keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoFactorData {
    #[serde(rename = "imageURLData")]
    pub image_url_data: String,
    pub secret: String,
}

/// Credentials for a server's console socket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketAuth {
    pub token: String,
    pub socket: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSignal {
    Start,
    Stop,
    Restart,
    Kill,
}

impl PowerSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerSignal::Start => "start",
            PowerSignal::Stop => "stop",
            PowerSignal::Restart => "restart",
            PowerSignal::Kill => "kill",
        }
    }
}

impl fmt::Display for PowerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameData {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChmodData {
    pub file: String,
    pub mode: u32,
}

/// Remote download into the server's file tree
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullFileOptions {
    pub url: String,
    pub directory: Option<String>,
    pub filename: Option<String>,
    pub use_header: Option<bool>,
    pub foreground: Option<bool>,
}
