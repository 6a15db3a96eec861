//! Application API entities
//!
//! Field names follow the in-memory camelCase shape produced by the
//! transformer. Timestamps are epoch milliseconds.

use crate::cache::Identified;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub memory: i64,
    pub swap: i64,
    pub disk: i64,
    pub io: i64,
    pub threads: Option<String>,
    pub cpu: i64,
    pub oom_disabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureLimits {
    pub allocations: i64,
    pub backups: i64,
    pub databases: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub external_id: Option<String>,
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub language: String,
    pub root_admin: bool,
    #[serde(rename = "2fa")]
    pub two_factor: bool,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    /// Present when fetched with `include=servers`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<AppServer>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Container {
    pub startup_command: String,
    pub image: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub installed: bool,
    pub environment: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppServer {
    pub id: i64,
    pub external_id: Option<String>,
    pub uuid: String,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub suspended: bool,
    pub limits: Limits,
    pub feature_limits: FeatureLimits,
    pub user: i64,
    pub node: i64,
    pub allocation: i64,
    pub nest: i64,
    pub egg: i64,
    pub container: Container,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    pub id: i64,
    pub uuid: String,
    pub public: bool,
    pub name: String,
    pub description: Option<String>,
    pub location_id: i64,
    pub fqdn: String,
    pub scheme: String,
    pub behind_proxy: bool,
    pub maintenance_mode: bool,
    pub memory: i64,
    pub memory_overallocate: i64,
    pub disk: i64,
    pub disk_overallocate: i64,
    pub upload_size: i64,
    pub daemon_listen: i64,
    pub daemon_sftp: i64,
    pub daemon_base: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Allocation {
    pub id: i64,
    pub ip: String,
    pub alias: Option<String>,
    pub port: i64,
    pub notes: Option<String>,
    pub assigned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub short: String,
    pub long: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Nest {
    pub id: i64,
    pub uuid: String,
    pub author: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Egg {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub nest: i64,
    pub author: String,
    pub description: Option<String>,
    pub docker_image: String,
    pub docker_images: HashMap<String, String>,
    pub startup: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

/// Wings configuration document for a node, camelCased but otherwise untyped
pub type NodeConfig = Value;

impl Identified for User {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for AppServer {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Node {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Allocation {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Accepts `true`/`false`, `0`/`1`, or null
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().map(|i| i != 0).unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::{decode, from_attributes};
    use serde_json::json;

    #[test]
    fn test_user_from_wire() {
        let user: User = decode(from_attributes(&json!({
            "id": 1,
            "external_id": null,
            "uuid": "c4022c6c",
            "username": "codeco",
            "email": "codeco@file.properties",
            "first_name": "Rihan",
            "last_name": "Arfan",
            "language": "en",
            "root_admin": true,
            "2fa": false,
            "created_at": "2020-01-01T00:00:00+00:00",
            "updated_at": null
        })))
        .unwrap();

        assert_eq!(user.first_name, "Rihan");
        assert!(user.root_admin);
        assert!(!user.two_factor);
        assert_eq!(user.created_at, Some(1_577_836_800_000));
        assert_eq!(user.updated_at, None);
        assert_eq!(user.external_id, None);
    }

    #[test]
    fn test_container_installed_accepts_int() {
        let container: Container = decode(json!({"installed": 1})).unwrap();
        assert!(container.installed);

        let container: Container = decode(json!({"installed": false})).unwrap();
        assert!(!container.installed);
    }
}
