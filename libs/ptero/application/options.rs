//! Request options for application API mutations
//!
//! Options serialize to camelCase and are snake_cased on the way out.
//! Unset fields are sent as `null`.

use super::types::User;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserOptions {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
    pub root_admin: Option<bool>,
    pub external_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserOptions {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub root_admin: Option<bool>,
    pub external_id: Option<String>,
    pub language: Option<String>,
}

impl UpdateUserOptions {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.password.is_none()
            && self.root_admin.is_none()
            && self.external_id.is_none()
            && self.language.is_none()
    }

    /// Full user body: the current user overlaid with these options
    pub fn merged_onto(self, current: &User) -> CreateUserOptions {
        CreateUserOptions {
            email: self.email.unwrap_or_else(|| current.email.clone()),
            username: self.username.unwrap_or_else(|| current.username.clone()),
            first_name: self.first_name.unwrap_or_else(|| current.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| current.last_name.clone()),
            password: self.password,
            root_admin: Some(self.root_admin.unwrap_or(current.root_admin)),
            external_id: self.external_id.or_else(|| current.external_id.clone()),
            language: Some(self.language.unwrap_or_else(|| current.language.clone())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsOptions {
    pub memory: Option<i64>,
    pub swap: Option<i64>,
    pub disk: Option<i64>,
    pub io: Option<i64>,
    pub threads: Option<String>,
    pub cpu: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLimitsOptions {
    pub allocations: Option<i64>,
    pub backups: Option<i64>,
    pub databases: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOptions {
    pub default: i64,
    pub additional: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOptions {
    pub locations: Vec<i64>,
    pub port_range: Vec<String>,
    pub dedicated_ip: bool,
}

/// New server; either `allocation` or `deploy` must be set
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerOptions {
    pub name: String,
    pub description: Option<String>,
    pub external_id: Option<String>,
    pub user: i64,
    pub egg: i64,
    pub docker_image: String,
    pub startup: String,
    pub environment: HashMap<String, String>,
    pub skip_scripts: Option<bool>,
    pub oom_disabled: Option<bool>,
    pub limits: LimitsOptions,
    pub feature_limits: FeatureLimitsOptions,
    pub allocation: Option<AllocationOptions>,
    pub deploy: Option<DeployOptions>,
    pub start_on_completion: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsOptions {
    pub name: Option<String>,
    pub user: Option<i64>,
    pub external_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuildOptions {
    pub allocation: Option<i64>,
    pub oom_disabled: Option<bool>,
    pub limits: Option<LimitsOptions>,
    pub feature_limits: Option<FeatureLimitsOptions>,
    pub add_allocations: Option<Vec<i64>>,
    pub remove_allocations: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStartupOptions {
    pub startup: Option<String>,
    pub environment: Option<HashMap<String, String>>,
    pub egg: Option<i64>,
    pub image: Option<String>,
    pub skip_scripts: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppOptions {
    pub cache: bool,
}
