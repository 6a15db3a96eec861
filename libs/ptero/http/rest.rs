use crate::error::{ApiErrorBody, ApiErrors, PteroError, Result};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, USER_AGENT,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How requests prove who they are
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    ApiKey,
    /// Browser session: the key is the XSRF token, sent with the session cookie
    Session { cookie: Option<String> },
}

/// Panel location and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    pub url: String,
    pub key: String,
    pub scheme: AuthScheme,
}

impl Auth {
    pub fn api_key(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: trim_url(url.into()),
            key: key.into(),
            scheme: AuthScheme::ApiKey,
        }
    }

    pub fn session(
        url: impl Into<String>,
        xsrf_token: impl Into<String>,
        cookie: Option<String>,
    ) -> Self {
        Self {
            url: trim_url(url.into()),
            key: xsrf_token.into(),
            scheme: AuthScheme::Session { cookie },
        }
    }
}

// Keys stay out of logs
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("url", &self.url)
            .field("key", &"***")
            .field("scheme", &self.scheme)
            .finish()
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_reqwest(), f)
    }
}

/// Thin transport over the panel's REST API
///
/// Every call is independent: no retries, no ordering between in-flight
/// requests, no timeouts beyond the HTTP client's own defaults.
#[derive(Debug, Clone)]
pub struct RestClient {
    auth: Auth,
    client: Client,
}

impl RestClient {
    pub fn new(auth: Auth) -> Self {
        Self {
            auth,
            client: Client::new(),
        }
    }

    pub fn with_client(auth: Auth, client: Client) -> Self {
        Self { auth, client }
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn headers(&self, text: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Ok(ua) = HeaderValue::from_str(&format!("PteroLite {}", VERSION)) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(if text { "text/plain" } else { "application/json" }),
        );

        match &self.auth.scheme {
            AuthScheme::ApiKey => {
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
                let bearer = HeaderValue::from_str(&format!("Bearer {}", self.auth.key))
                    .map_err(|_| {
                        PteroError::Validation(
                            "API key contains characters not allowed in a header".into(),
                        )
                    })?;
                headers.insert(AUTHORIZATION, bearer);
            }
            AuthScheme::Session { cookie } => {
                headers.insert(ACCEPT, HeaderValue::from_static("application/json,text/html"));
                if let Ok(v) = HeaderValue::from_str(&self.auth.key) {
                    headers.insert("X-XSRF-TOKEN", v);
                }
                if let Some(v) = cookie.as_deref().and_then(|c| HeaderValue::from_str(c).ok()) {
                    headers.insert(COOKIE, v);
                }
            }
        }

        Ok(headers)
    }

    /// Issue a JSON request and return the decoded body, if any
    ///
    /// 202/204 and empty 2xx bodies resolve to `None`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let (_, value) = self.request_with_status(method, path, body).await?;
        Ok(value)
    }

    async fn request_with_status(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Option<Value>)> {
        let url = format!("{}{}", self.auth.url, path);
        debug!("{} {}", method, path);

        let mut req = self
            .client
            .request(method.as_reqwest(), &url)
            .headers(self.headers(false)?);
        if let Some(body) = body {
            req = req.body(serde_json::to_vec(&body)?);
        }

        let response = req.send().await?;
        let status = response.status();

        if status == StatusCode::ACCEPTED || status == StatusCode::NO_CONTENT {
            return Ok((status, None));
        }

        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok((status, None));
            }
            return serde_json::from_slice::<Value>(&bytes)
                .map(|v| (status, Some(v)))
                .map_err(|_| PteroError::MalformedResponse {
                    status: status.as_u16(),
                });
        }

        Err(error_from_body(status, &bytes))
    }

    async fn expect_field(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        field: &str,
    ) -> Result<Value> {
        let (status, value) = self.request_with_status(method, path, body).await?;
        value
            .and_then(|mut v| v.get_mut(field).map(Value::take))
            .filter(|v| !v.is_null())
            .ok_or(PteroError::MalformedResponse {
                status: status.as_u16(),
            })
    }

    /// GET a single-item envelope and return its `attributes`
    pub async fn get_item(&self, path: &str) -> Result<Value> {
        self.expect_field(Method::Get, path, None, "attributes").await
    }

    pub async fn post_item(&self, path: &str, body: Value) -> Result<Value> {
        self.expect_field(Method::Post, path, Some(body), "attributes").await
    }

    pub async fn patch_item(&self, path: &str, body: Value) -> Result<Value> {
        self.expect_field(Method::Patch, path, Some(body), "attributes").await
    }

    /// GET a list envelope and return the items of its `data` array
    pub async fn get_list(&self, path: &str) -> Result<Vec<Value>> {
        let (status, value) = self.request_with_status(Method::Get, path, None).await?;
        match value.and_then(|mut v| v.get_mut("data").map(Value::take)) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(PteroError::MalformedResponse {
                status: status.as_u16(),
            }),
        }
    }

    /// GET a `{ data: {...} }` body and return `data`
    pub async fn get_data(&self, path: &str) -> Result<Value> {
        self.expect_field(Method::Get, path, None, "data").await
    }

    /// GET a body that is not wrapped in an envelope
    pub async fn get_raw(&self, path: &str) -> Result<Value> {
        let (status, value) = self.request_with_status(Method::Get, path, None).await?;
        value.ok_or(PteroError::MalformedResponse {
            status: status.as_u16(),
        })
    }

    /// Issue a request whose response body is not needed
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        self.request(method, path, body).await.map(|_| ())
    }

    /// GET a plain-text body (file contents)
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.auth.url, path);
        debug!("GET {} (text)", path);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(true)?)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_body(status, &bytes));
        }

        String::from_utf8(bytes.to_vec()).map_err(|e| {
            PteroError::DeserializeFailed(format!("file contents are not valid UTF-8: {}", e))
        })
    }

    /// POST a plain-text body (file writes)
    pub async fn post_text(&self, path: &str, body: String) -> Result<()> {
        let url = format!("{}{}", self.auth.url, path);
        debug!("POST {} (text, {} bytes)", path, body.len());

        let response = self
            .client
            .post(&url)
            .headers(self.headers(true)?)
            .body(body)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let bytes = response.bytes().await?;
        Err(error_from_body(status, &bytes))
    }
}

fn error_from_body(status: StatusCode, bytes: &[u8]) -> PteroError {
    match serde_json::from_slice::<ApiErrorBody>(bytes) {
        Ok(body) if !body.errors.is_empty() => {
            warn!("Panel returned {} with {} error(s)", status, body.errors.len());
            PteroError::Api(ApiErrors(body.errors))
        }
        _ => {
            warn!("Panel returned {} with an unreadable body", status);
            PteroError::MalformedResponse {
                status: status.as_u16(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_trims_trailing_slash() {
        let auth = Auth::api_key("https://panel.example.com/", "ptla_x");
        assert_eq!(auth.url, "https://panel.example.com");
        assert_eq!(auth.scheme, AuthScheme::ApiKey);
    }

    #[test]
    fn test_auth_debug_masks_key() {
        let auth = Auth::api_key("https://panel.example.com", "ptla_secret");
        let printed = format!("{:?}", auth);
        assert!(!printed.contains("ptla_secret"));
    }

    #[test]
    fn test_bearer_headers() {
        let client = RestClient::new(Auth::api_key("https://p", "k"));
        let headers = client.headers(false).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer k");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert!(headers
            .get(USER_AGENT)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("PteroLite "));
    }

    #[test]
    fn test_session_headers() {
        let client = RestClient::new(Auth::session(
            "https://p",
            "xsrf",
            Some("pterodactyl_session=abc".into()),
        ));
        let headers = client.headers(true).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get("X-XSRF-TOKEN").unwrap(), "xsrf");
        assert_eq!(headers.get(COOKIE).unwrap(), "pterodactyl_session=abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        let client = RestClient::new(Auth::api_key("https://p", "ptla_bad\nkey"));
        assert!(matches!(
            client.headers(false),
            Err(PteroError::Validation(_))
        ));
    }

    #[test]
    fn test_error_from_body() {
        let body = br#"{"errors":[{"code":"NotFound","status":"404","detail":"gone"}]}"#;
        match error_from_body(StatusCode::NOT_FOUND, body) {
            PteroError::Api(errors) => assert_eq!(errors.0[0].code, "NotFound"),
            other => panic!("unexpected error: {other:?}"),
        }

        match error_from_body(StatusCode::BAD_GATEWAY, b"<html>") {
            PteroError::MalformedResponse { status } => assert_eq!(status, 502),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
