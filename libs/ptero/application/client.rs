use super::options::*;
use super::types::*;
use crate::cache::ApplicationCache;
use crate::config::PanelConfig;
use crate::conversions::{to_camel_case, ConvertOptions};
use crate::error::{PteroError, Result};
use crate::http::{Auth, FetchOptions, Method, RestClient};
use crate::routes::application as routes;
use crate::transformer::{
    decode, encode, from_attributes, from_attributes_with, from_data, from_data_with,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Lowest port that may be allocated
pub const MIN_ALLOCATION_PORT: u32 = 1025;
/// Highest port that may be allocated
pub const MAX_ALLOCATION_PORT: u32 = 65535;
/// Widest port range accepted in one allocation request
pub const MAX_PORT_SPAN: u32 = 1000;

/// Server environments are user data and keep their keys as sent
fn server_options() -> ConvertOptions {
    ConvertOptions::new().with_pass(["environment"])
}

/// Administrative (application) API client
pub struct ApplicationClient {
    rest: RestClient,
    cache: Option<ApplicationCache>,
}

impl ApplicationClient {
    pub fn new(url: impl Into<String>, key: impl Into<String>, options: AppOptions) -> Self {
        Self::with_rest(RestClient::new(Auth::api_key(url, key)), options)
    }

    pub fn with_rest(rest: RestClient, options: AppOptions) -> Self {
        let cache = options.cache.then(ApplicationCache::new);
        info!(
            "Application client for {} (cache {})",
            rest.auth().url,
            if cache.is_some() { "enabled" } else { "disabled" }
        );
        Self { rest, cache }
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        let key = config.application_key.clone().ok_or_else(|| {
            PteroError::Validation("application_key is required for the application API".to_string())
        })?;
        Ok(Self::new(config.url.clone(), key, AppOptions { cache: config.cache }))
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn cache(&self) -> Option<&ApplicationCache> {
        self.cache.as_ref()
    }

    // ----------------------------------------------------------------------
    // Users
    // ----------------------------------------------------------------------

    pub async fn get_users(&self, options: &FetchOptions) -> Result<Vec<User>> {
        let path = format!("{}{}", routes::users::main(), options.resolve());
        let items = self.rest.get_list(&path).await?;

        let users = items
            .iter()
            .map(|item| {
                let attrs = item.get("attributes").cloned().unwrap_or_else(|| json!({}));
                user_from_attributes(&attrs)
            })
            .collect::<Result<Vec<User>>>()?;

        if let Some(cache) = &self.cache {
            cache.users.insert_many(&users);
        }
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    /// Fetch a user by ID, served from the cache unless `force` is set
    pub async fn get_user(&self, id: i64, force: bool) -> Result<User> {
        if !force {
            if let Some(user) = self.cache.as_ref().and_then(|c| c.users.get(id)) {
                return Ok(user);
            }
        }

        let raw = self.rest.get_item(&routes::users::get(id)).await?;
        let user = user_from_attributes(&raw)?;
        self.cache_user(&user);
        Ok(user)
    }

    pub async fn get_user_with(&self, id: i64, options: &FetchOptions) -> Result<User> {
        let path = format!("{}{}", routes::users::get(id), options.resolve());
        let raw = self.rest.get_item(&path).await?;
        let user = user_from_attributes(&raw)?;
        self.cache_user(&user);
        Ok(user)
    }

    pub async fn get_user_by_external(&self, external_id: &str) -> Result<User> {
        let raw = self.rest.get_item(&routes::users::external(external_id)).await?;
        let user = user_from_attributes(&raw)?;
        self.cache_user(&user);
        Ok(user)
    }

    pub async fn create_user(&self, options: CreateUserOptions) -> Result<User> {
        let body = encode(&options, &ConvertOptions::default())?;
        let raw = self.rest.post_item(&routes::users::main(), body).await?;
        let user = user_from_attributes(&raw)?;
        self.cache_user(&user);
        Ok(user)
    }

    /// Update a user; unset options keep the user's current values
    pub async fn update_user(&self, id: i64, options: UpdateUserOptions) -> Result<User> {
        if options.is_empty() {
            return Err(PteroError::Validation(
                "Not enough options to update the user.".to_string(),
            ));
        }

        let current = self.get_user(id, false).await?;
        let body = encode(&options.merged_onto(&current), &ConvertOptions::default())?;
        let raw = self.rest.patch_item(&routes::users::get(id), body).await?;
        let user = user_from_attributes(&raw)?;
        self.cache_user(&user);
        Ok(user)
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.rest.send(Method::Delete, &routes::users::get(id), None).await?;
        if let Some(cache) = &self.cache {
            cache.users.remove(id);
        }
        Ok(())
    }

    fn cache_user(&self, user: &User) {
        if let Some(cache) = &self.cache {
            cache.users.insert(user.clone());
        }
    }

    // ----------------------------------------------------------------------
    // Servers
    // ----------------------------------------------------------------------

    pub async fn get_servers(&self, options: &FetchOptions) -> Result<Vec<AppServer>> {
        let path = format!("{}{}", routes::servers::main(), options.resolve());
        let items = self.rest.get_list(&path).await?;
        let servers = decode_all::<AppServer>(from_data_with(&items, &server_options()))?;

        if let Some(cache) = &self.cache {
            cache.servers.insert_many(&servers);
        }
        Ok(servers)
    }

    pub async fn get_server(&self, id: i64, force: bool) -> Result<AppServer> {
        if !force {
            if let Some(server) = self.cache.as_ref().and_then(|c| c.servers.get(id)) {
                return Ok(server);
            }
        }

        let raw = self.rest.get_item(&routes::servers::get(id)).await?;
        self.finish_server(raw)
    }

    pub async fn get_server_by_external(&self, external_id: &str) -> Result<AppServer> {
        let raw = self.rest.get_item(&routes::servers::external(external_id)).await?;
        self.finish_server(raw)
    }

    pub async fn create_server(&self, options: CreateServerOptions) -> Result<AppServer> {
        if options.allocation.is_none() && options.deploy.is_none() {
            return Err(PteroError::Validation(
                "Either allocation or deploy must be specified to create a server.".to_string(),
            ));
        }

        let body = encode(&options, &server_options())?;
        let raw = self.rest.post_item(&routes::servers::main(), body).await?;
        self.finish_server(raw)
    }

    pub async fn update_server_details(
        &self,
        id: i64,
        options: UpdateDetailsOptions,
    ) -> Result<AppServer> {
        let body = encode(&options, &ConvertOptions::default())?;
        let raw = self.rest.patch_item(&routes::servers::details(id), body).await?;
        self.finish_server(raw)
    }

    pub async fn update_server_build(
        &self,
        id: i64,
        options: UpdateBuildOptions,
    ) -> Result<AppServer> {
        let body = encode(&options, &ConvertOptions::default())?;
        let raw = self.rest.patch_item(&routes::servers::build(id), body).await?;
        self.finish_server(raw)
    }

    pub async fn update_server_startup(
        &self,
        id: i64,
        options: UpdateStartupOptions,
    ) -> Result<AppServer> {
        let body = encode(&options, &server_options())?;
        let raw = self.rest.patch_item(&routes::servers::startup(id), body).await?;
        self.finish_server(raw)
    }

    pub async fn suspend_server(&self, id: i64) -> Result<()> {
        self.rest.send(Method::Post, &routes::servers::suspend(id), None).await
    }

    pub async fn unsuspend_server(&self, id: i64) -> Result<()> {
        self.rest.send(Method::Post, &routes::servers::unsuspend(id), None).await
    }

    pub async fn reinstall_server(&self, id: i64) -> Result<()> {
        self.rest.send(Method::Post, &routes::servers::reinstall(id), None).await
    }

    pub async fn delete_server(&self, id: i64, force: bool) -> Result<()> {
        let path = if force {
            routes::servers::force(id)
        } else {
            routes::servers::get(id)
        };
        self.rest.send(Method::Delete, &path, None).await?;

        if let Some(cache) = &self.cache {
            cache.servers.remove(id);
        }
        Ok(())
    }

    fn finish_server(&self, raw: Value) -> Result<AppServer> {
        let server: AppServer = decode(from_attributes_with(&raw, &server_options()))?;
        if let Some(cache) = &self.cache {
            cache.servers.insert(server.clone());
        }
        Ok(server)
    }

    // ----------------------------------------------------------------------
    // Nodes
    // ----------------------------------------------------------------------

    pub async fn get_nodes(&self) -> Result<Vec<Node>> {
        let items = self.rest.get_list(&routes::nodes::main()).await?;
        let nodes = decode_all::<Node>(from_data(&items))?;

        if let Some(cache) = &self.cache {
            cache.nodes.insert_many(&nodes);
        }
        Ok(nodes)
    }

    pub async fn get_node(&self, id: i64, force: bool) -> Result<Node> {
        if !force {
            if let Some(node) = self.cache.as_ref().and_then(|c| c.nodes.get(id)) {
                return Ok(node);
            }
        }

        let raw = self.rest.get_item(&routes::nodes::get(id)).await?;
        let node: Node = decode(from_attributes(&raw))?;
        if let Some(cache) = &self.cache {
            cache.nodes.insert(node.clone());
        }
        Ok(node)
    }

    pub async fn get_node_config(&self, id: i64) -> Result<NodeConfig> {
        let raw = self.rest.get_raw(&routes::nodes::config(id)).await?;
        Ok(to_camel_case(&raw, &ConvertOptions::default()))
    }

    pub async fn delete_node(&self, id: i64) -> Result<()> {
        self.rest.send(Method::Delete, &routes::nodes::get(id), None).await?;
        if let Some(cache) = &self.cache {
            cache.nodes.remove(id);
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Allocations
    // ----------------------------------------------------------------------

    pub async fn get_allocations(&self, node: i64) -> Result<Vec<Allocation>> {
        let items = self.rest.get_list(&routes::allocations::main(node)).await?;
        let allocations = decode_all::<Allocation>(from_data(&items))?;

        if let Some(cache) = &self.cache {
            cache.allocations.insert_many(&allocations);
        }
        Ok(allocations)
    }

    /// Allocations on the node that no server is using
    pub async fn get_available_allocations(&self, node: i64) -> Result<Vec<Allocation>> {
        let allocations = self.get_allocations(node).await?;
        Ok(allocations.into_iter().filter(|a| !a.assigned).collect())
    }

    /// Create allocations for `ports`, which may contain `start-stop` ranges
    ///
    /// Ranges are checked before anything is sent.
    pub async fn create_allocations(
        &self,
        node: i64,
        ip: &str,
        ports: &[String],
        alias: Option<&str>,
    ) -> Result<()> {
        validate_ports(ports)?;

        let body = json!({
            "ip": ip,
            "ports": ports,
            "alias": alias,
        });
        self.rest
            .send(Method::Post, &routes::allocations::main(node), Some(body))
            .await
    }

    pub async fn delete_allocation(&self, node: i64, id: i64) -> Result<()> {
        self.rest
            .send(Method::Delete, &routes::allocations::get(node, id), None)
            .await?;
        if let Some(cache) = &self.cache {
            cache.allocations.remove(id);
        }
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Locations, nests and eggs
    // ----------------------------------------------------------------------

    pub async fn get_locations(&self) -> Result<Vec<Location>> {
        let items = self.rest.get_list(&routes::locations::main()).await?;
        decode_all(from_data(&items))
    }

    pub async fn get_location(&self, id: i64) -> Result<Location> {
        let raw = self.rest.get_item(&routes::locations::get(id)).await?;
        decode(from_attributes(&raw))
    }

    pub async fn get_nests(&self) -> Result<Vec<Nest>> {
        let items = self.rest.get_list(&routes::nests::main()).await?;
        decode_all(from_data(&items))
    }

    pub async fn get_nest(&self, id: i64) -> Result<Nest> {
        let raw = self.rest.get_item(&routes::nests::get(id)).await?;
        decode(from_attributes(&raw))
    }

    pub async fn get_eggs(&self, nest: i64) -> Result<Vec<Egg>> {
        let items = self.rest.get_list(&routes::nests::eggs::main(nest)).await?;
        decode_all(from_data(&items))
    }

    pub async fn get_egg(&self, nest: i64, id: i64) -> Result<Egg> {
        let raw = self.rest.get_item(&routes::nests::eggs::get(nest, id)).await?;
        decode(from_attributes(&raw))
    }
}

/// Check every `start-stop` entry of an allocation request
pub fn validate_ports(ports: &[String]) -> Result<()> {
    for port in ports {
        let Some((start, stop)) = port.split_once('-') else {
            continue;
        };

        let parse = |s: &str| {
            s.trim().parse::<u32>().map_err(|_| {
                PteroError::Validation(format!("Invalid port range '{}'.", port))
            })
        };
        let (start, stop) = (parse(start)?, parse(stop)?);

        if start > stop {
            return Err(PteroError::Validation(
                "Start cannot be greater than stop.".to_string(),
            ));
        }
        if start < MIN_ALLOCATION_PORT || stop > MAX_ALLOCATION_PORT {
            return Err(PteroError::Validation(format!(
                "Port range must be between {} and {}.",
                MIN_ALLOCATION_PORT, MAX_ALLOCATION_PORT
            )));
        }
        if stop - start > MAX_PORT_SPAN {
            return Err(PteroError::Validation(format!(
                "Maximum port range exceeded ({}).",
                MAX_PORT_SPAN
            )));
        }
    }

    Ok(())
}

/// Build a user, flattening `relationships.servers` when it was included
fn user_from_attributes(raw: &Value) -> Result<User> {
    let mut raw = raw.clone();
    let relationships = raw
        .as_object_mut()
        .and_then(|obj| obj.remove("relationships"));

    let mut user: User = decode(from_attributes(&raw))?;

    if let Some(Value::Array(items)) = relationships
        .as_ref()
        .and_then(|rel| rel.get("servers"))
        .and_then(|servers| servers.get("data"))
    {
        user.servers = Some(decode_all(from_data_with(items, &server_options()))?);
    }

    Ok(user)
}

fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_port_range_below_minimum_rejected() {
        let err = validate_ports(&ports(&["500-600"])).unwrap_err();
        assert!(matches!(err, PteroError::Validation(_)));
    }

    #[test]
    fn test_port_range_of_exactly_one_thousand_accepted() {
        assert!(validate_ports(&ports(&["5000-6000"])).is_ok());
    }

    #[test]
    fn test_port_range_too_wide_rejected() {
        let err = validate_ports(&ports(&["5000-6001"])).unwrap_err();
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_port_range_reversed_rejected() {
        assert!(validate_ports(&ports(&["6000-5000"])).is_err());
    }

    #[test]
    fn test_port_range_above_maximum_rejected() {
        assert!(validate_ports(&ports(&["65000-65536"])).is_err());
    }

    #[test]
    fn test_single_ports_and_garbage() {
        assert!(validate_ports(&ports(&["25565", "25566"])).is_ok());
        assert!(validate_ports(&ports(&["abc-def"])).is_err());
        assert!(validate_ports(&ports(&["1025-1025"])).is_ok());
        assert!(validate_ports(&ports(&["1024-1030"])).is_err());
    }

    #[test]
    fn test_user_relationships_flattened() {
        let raw = serde_json::json!({
            "id": 1,
            "username": "admin",
            "relationships": {
                "servers": {
                    "object": "list",
                    "data": [{
                        "object": "server",
                        "attributes": {
                            "id": 5,
                            "name": "Survival",
                            "feature_limits": {"backups": 2},
                            "container": {"environment": {"SERVER_JARFILE": "server.jar"}}
                        }
                    }]
                }
            }
        });

        let user = user_from_attributes(&raw).unwrap();
        let servers = user.servers.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id, 5);
        assert_eq!(servers[0].feature_limits.backups, 2);
        assert_eq!(
            servers[0].container.environment["SERVER_JARFILE"],
            serde_json::json!("server.jar")
        );
    }
}
