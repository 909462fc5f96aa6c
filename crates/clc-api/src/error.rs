//! Transport error types

use crate::transport::Method;
use thiserror::Error;

/// Errors raised by the transport collaborator
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered with a non-2xx status
    #[error("Response code {status}. {message} {method} {path}")]
    Failed {
        status: u16,
        method: Method,
        path: String,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] clc_config::ConfigError),
}

impl ApiError {
    /// HTTP status carried by a `Failed` response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Failed { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display() {
        let err = ApiError::Failed {
            status: 400,
            method: Method::Post,
            path: "antiAffinityPolicies/BTDI".to_string(),
            message: "The location is invalid.".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Response code 400. The location is invalid. POST antiAffinityPolicies/BTDI"
        );
        assert_eq!(err.status(), Some(400));
        assert!(err.is_client_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_status_absent() {
        let err = ApiError::AuthenticationFailed("no token".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
    }
}
