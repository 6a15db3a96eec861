use super::types::*;
use crate::config::PanelConfig;
use crate::conversions::{to_camel_case, ConvertOptions};
use crate::error::{PteroError, Result};
use crate::http::{Auth, Method, RestClient};
use crate::routes::client as routes;
use crate::transformer::{decode, encode, from_attributes, from_data};
use crate::ws::{Shard, TokenSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// User-facing (client) API client
///
/// Works with either a client API key or a browser session.
#[derive(Debug, Clone)]
pub struct ClientApi {
    rest: RestClient,
}

impl ClientApi {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_auth(Auth::api_key(url, key))
    }

    pub fn with_auth(auth: Auth) -> Self {
        info!("Client API for {}", auth.url);
        Self {
            rest: RestClient::new(auth),
        }
    }

    pub fn with_rest(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        let key = config.client_key.clone().ok_or_else(|| {
            PteroError::Validation("client_key is required for the client API".to_string())
        })?;
        Ok(Self::new(config.url.clone(), key))
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    async fn item<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let raw = self.rest.get_item(path).await?;
        decode(from_attributes(&raw))
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let items = self.rest.get_list(path).await?;
        from_data(&items).into_iter().map(decode).collect()
    }

    /// `attributes.url` of a signed-URL response
    async fn signed_url(&self, path: &str) -> Result<String> {
        let raw = self.rest.get_item(path).await?;
        match raw.get("url").and_then(Value::as_str) {
            Some(url) => Ok(url.to_string()),
            None => Err(PteroError::DeserializeFailed(
                "signed URL response has no url".to_string(),
            )),
        }
    }

    // ----------------------------------------------------------------------
    // Account
    // ----------------------------------------------------------------------

    /// Permission groups, keyed by group name
    pub async fn get_permissions(&self) -> Result<HashMap<String, PermissionDescriptor>> {
        let mut raw = self.rest.get_item(&routes::permissions()).await?;
        decode(raw.get_mut("permissions").map(Value::take).unwrap_or_default())
    }

    pub async fn get_account(&self) -> Result<Account> {
        self.item(&routes::account::main()).await
    }

    pub async fn get_two_factor_url(&self) -> Result<TwoFactorData> {
        let raw = self.rest.get_data(&routes::account::two_factor()).await?;
        let options = ConvertOptions::new().with_map("image_url_data", "image_URL_data");
        decode(to_camel_case(&raw, &options))
    }

    /// Enable two-factor auth and return the recovery tokens
    pub async fn enable_two_factor(&self, code: &str) -> Result<Vec<String>> {
        let raw = self
            .rest
            .post_item(&routes::account::two_factor(), json!({ "code": code }))
            .await?;
        match raw {
            Value::Object(mut obj) => decode(obj.remove("tokens").unwrap_or_default()),
            other => decode(other),
        }
    }

    pub async fn disable_two_factor(&self, password: &str) -> Result<()> {
        self.rest
            .send(
                Method::Delete,
                &routes::account::two_factor(),
                Some(json!({ "password": password })),
            )
            .await
    }

    pub async fn update_email(&self, email: &str, password: &str) -> Result<()> {
        self.rest
            .send(
                Method::Put,
                &routes::account::email(),
                Some(json!({ "email": email, "password": password })),
            )
            .await
    }

    pub async fn update_password(&self, current: &str, new: &str) -> Result<()> {
        self.rest
            .send(
                Method::Put,
                &routes::account::password(),
                Some(json!({
                    "current_password": current,
                    "password": new,
                    "password_confirmation": new,
                })),
            )
            .await
    }

    pub async fn get_activities(&self) -> Result<Vec<Activity>> {
        self.list(&routes::account::activity()).await
    }

    pub async fn get_api_keys(&self) -> Result<Vec<ApiKey>> {
        self.list(&routes::account::api_keys()).await
    }

    pub async fn create_api_key(&self, description: &str, allowed_ips: &[String]) -> Result<ApiKey> {
        let raw = self
            .rest
            .post_item(
                &routes::account::api_keys(),
                json!({ "description": description, "allowed_ips": allowed_ips }),
            )
            .await?;
        decode(from_attributes(&raw))
    }

    pub async fn delete_api_key(&self, id: &str) -> Result<()> {
        self.rest
            .send(Method::Delete, &routes::account::api_key(id), None)
            .await
    }

    pub async fn get_ssh_keys(&self) -> Result<Vec<SshKey>> {
        self.list(&routes::account::ssh_keys()).await
    }

    pub async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey> {
        let raw = self
            .rest
            .post_item(
                &routes::account::ssh_keys(),
                json!({ "name": name, "public_key": public_key }),
            )
            .await?;
        decode(from_attributes(&raw))
    }

    pub async fn remove_ssh_key(&self, fingerprint: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::account::ssh_keys_remove(),
                Some(json!({ "fingerprint": fingerprint })),
            )
            .await
    }

    // ----------------------------------------------------------------------
    // Servers
    // ----------------------------------------------------------------------

    pub async fn get_servers(&self) -> Result<Vec<ClientServer>> {
        self.list(&routes::main()).await
    }

    pub async fn get_server(&self, id: &str) -> Result<ClientServer> {
        self.item(&routes::servers::get(id)).await
    }

    pub async fn get_server_websocket_auth(&self, id: &str) -> Result<WebSocketAuth> {
        let raw = self.rest.get_data(&routes::servers::websocket(id)).await?;
        decode(to_camel_case(&raw, &ConvertOptions::default()))
    }

    pub async fn get_server_resources(&self, id: &str) -> Result<Resources> {
        self.item(&routes::servers::resources(id)).await
    }

    pub async fn get_server_activities(&self, id: &str) -> Result<Vec<Activity>> {
        self.list(&routes::servers::activity(id)).await
    }

    pub async fn send_server_command(&self, id: &str, command: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::command(id),
                Some(json!({ "command": command })),
            )
            .await
    }

    pub async fn set_server_power_state(&self, id: &str, signal: PowerSignal) -> Result<()> {
        debug!("Power {} for server {}", signal, id);
        self.rest
            .send(
                Method::Post,
                &routes::servers::power(id),
                Some(json!({ "signal": signal })),
            )
            .await
    }

    pub async fn rename_server(&self, id: &str, name: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::settings::rename(id),
                Some(json!({ "name": name })),
            )
            .await
    }

    pub async fn reinstall_server(&self, id: &str) -> Result<()> {
        self.rest
            .send(Method::Post, &routes::servers::settings::reinstall(id), None)
            .await
    }

    // ----------------------------------------------------------------------
    // Files
    // ----------------------------------------------------------------------

    pub async fn get_server_files(&self, id: &str, directory: Option<&str>) -> Result<Vec<File>> {
        self.list(&routes::servers::files::list(id, directory)).await
    }

    pub async fn get_file_contents(&self, id: &str, name: &str) -> Result<String> {
        self.rest
            .get_text(&routes::servers::files::contents(id, name))
            .await
    }

    pub async fn get_file_download_url(&self, id: &str, name: &str) -> Result<String> {
        self.signed_url(&routes::servers::files::download(id, name))
            .await
    }

    pub async fn rename_files(&self, id: &str, root: &str, files: &[RenameData]) -> Result<()> {
        self.rest
            .send(
                Method::Put,
                &routes::servers::files::rename(id),
                Some(json!({ "root": root, "files": files })),
            )
            .await
    }

    pub async fn copy_file(&self, id: &str, name: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::files::copy(id),
                Some(json!({ "location": name })),
            )
            .await
    }

    /// Overwrite (or create) a file with `content`
    pub async fn write_file(&self, id: &str, name: &str, content: impl Into<String>) -> Result<()> {
        self.rest
            .post_text(&routes::servers::files::write(id, name), content.into())
            .await
    }

    pub async fn create_file(&self, id: &str, name: &str) -> Result<()> {
        self.write_file(id, name, String::new()).await
    }

    /// Archive `files` under `root` and return the archive's entry
    pub async fn compress_files(&self, id: &str, root: &str, files: &[String]) -> Result<File> {
        let raw = self
            .rest
            .post_item(
                &routes::servers::files::compress(id),
                json!({ "root": root, "files": files }),
            )
            .await?;
        decode(from_attributes(&raw))
    }

    pub async fn decompress_file(&self, id: &str, root: &str, name: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::files::decompress(id),
                Some(json!({ "root": root, "file": name })),
            )
            .await
    }

    pub async fn delete_files(&self, id: &str, root: &str, files: &[String]) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::files::delete(id),
                Some(json!({ "root": root, "files": files })),
            )
            .await
    }

    pub async fn create_folder(&self, id: &str, root: &str, name: &str) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::files::create_folder(id),
                Some(json!({ "root": root, "name": name })),
            )
            .await
    }

    pub async fn chmod_files(&self, id: &str, root: &str, files: &[ChmodData]) -> Result<()> {
        self.rest
            .send(
                Method::Post,
                &routes::servers::files::chmod(id),
                Some(json!({ "root": root, "files": files })),
            )
            .await
    }

    pub async fn pull_file(&self, id: &str, options: PullFileOptions) -> Result<()> {
        if options.url.is_empty() {
            return Err(PteroError::Validation("A URL is required to pull a file.".to_string()));
        }
        let body = encode(&options, &ConvertOptions::default())?;
        self.rest
            .send(Method::Post, &routes::servers::files::pull(id), Some(body))
            .await
    }

    pub async fn get_upload_url(&self, id: &str) -> Result<String> {
        self.signed_url(&routes::servers::files::upload(id)).await
    }

    // ----------------------------------------------------------------------
    // Websocket
    // ----------------------------------------------------------------------

    /// Shard for one server's console socket, authenticated through this client
    pub fn create_shard(&self, id: &str) -> Shard {
        Shard::new(id, self.rest.auth().url.clone(), Arc::new(self.clone()))
    }
}

#[async_trait]
impl TokenSource for ClientApi {
    async fn websocket_auth(&self, server: &str) -> Result<WebSocketAuth> {
        self.get_server_websocket_auth(server).await
    }
}
