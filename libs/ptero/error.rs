//! Error types shared by every part of the client

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;

/// A single entry of the panel's `{ "errors": [...] }` envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Body shape of a structured API failure
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub errors: Vec<ApiErrorDetail>,
}

/// All sub-errors reported by one failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrors(pub Vec<ApiErrorDetail>);

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.0 {
            let detail = e
                .detail
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or("No details provided");
            write!(f, "\n- {} ({}): {}", e.code, e.status, detail)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum PteroError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(ApiErrors),

    #[error("Pterodactyl API returned an invalid or malformed payload (code: {status})")]
    MalformedResponse { status: u16 },

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("received unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Shard is not connected")]
    NotConnected,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PteroError {
    /// HTTP status attached to the error, when the panel answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            PteroError::MalformedResponse { status } => Some(*status),
            PteroError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            PteroError::Api(errors) => errors
                .0
                .first()
                .and_then(|e| e.status.parse::<u16>().ok()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PteroError {
    fn from(e: serde_json::Error) -> Self {
        PteroError::DeserializeFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PteroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_listing() {
        let errors = ApiErrors(vec![
            ApiErrorDetail {
                code: "ValidationException".into(),
                status: "422".into(),
                detail: Some("The email field is required.".into()),
            },
            ApiErrorDetail {
                code: "NotFoundHttpException".into(),
                status: "404".into(),
                detail: None,
            },
        ]);

        let msg = PteroError::Api(errors).to_string();
        assert!(msg.contains("- ValidationException (422): The email field is required."));
        assert!(msg.contains("- NotFoundHttpException (404): No details provided"));
    }

    #[test]
    fn test_status_extraction() {
        assert_eq!(PteroError::MalformedResponse { status: 502 }.status(), Some(502));
        assert_eq!(PteroError::Validation("x".into()).status(), None);

        let api = PteroError::Api(ApiErrors(vec![ApiErrorDetail {
            code: "c".into(),
            status: "403".into(),
            detail: None,
        }]));
        assert_eq!(api.status(), Some(403));
    }

    #[test]
    fn test_malformed_message_names_status() {
        let msg = PteroError::MalformedResponse { status: 500 }.to_string();
        assert!(msg.contains("500"));
    }
}
