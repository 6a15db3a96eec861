//! Session (cookie + XSRF) authentication helpers

use crate::error::{PteroError, Result};
use chrono::DateTime;
use percent_encoding::percent_decode_str;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use tracing::debug;

/// XSRF token handed out by the panel's front page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsrfToken {
    pub token: String,
    /// Cookie expiry as epoch milliseconds, when the panel sent one
    pub expires: Option<i64>,
}

/// Fetch a fresh XSRF token from `<url>/`
pub async fn fetch_xsrf_token(client: &Client, url: &str) -> Result<XsrfToken> {
    let url = format!("{}/", url.trim_end_matches('/'));
    debug!("Fetching XSRF token from {}", url);

    let response = client.get(&url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(PteroError::MalformedResponse {
            status: status.as_u16(),
        });
    }

    let cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();

    if cookies.is_empty() {
        return Err(PteroError::Validation(
            "Pterodactyl did not send a cookie".to_string(),
        ));
    }

    parse_set_cookie(&cookies).ok_or_else(|| {
        PteroError::Validation("Pterodactyl did not send an XSRF-TOKEN cookie".to_string())
    })
}

/// Extract the XSRF token and its expiry from `Set-Cookie` header values
pub fn parse_set_cookie<S: AsRef<str>>(headers: &[S]) -> Option<XsrfToken> {
    for header in headers {
        let mut parts = header.as_ref().split(';').map(str::trim);

        let Some(first) = parts.next() else {
            continue;
        };
        let Some(raw) = first.strip_prefix("XSRF-TOKEN=") else {
            continue;
        };

        let token = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        let expires = parts
            .find_map(|p| {
                p.strip_prefix("expires=")
                    .or_else(|| p.strip_prefix("Expires="))
            })
            .and_then(|e| DateTime::parse_from_rfc2822(e).ok())
            .map(|dt| dt.timestamp_millis());

        return Some(XsrfToken { token, expires });
    }

    None
}
