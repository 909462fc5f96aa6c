//! reqwest-backed transport
//!
//! Talks to the v2 API directly with Bearer token authentication.

use crate::error::{ApiError, Result};
use crate::transport::{Method, Transport};
use async_trait::async_trait;
use clc_config::ClientConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const LOGIN_PATH: &str = "authentication/login";

/// HTTP transport for the v2 API
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    root_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Create an unauthenticated transport rooted at `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into();
        Ok(Self {
            client,
            root_url: endpoint.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.endpoint, config.timeout())
    }

    /// Attach a bearer token to every subsequent call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Exchange credentials for a bearer token and the account defaults
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::to_value(LoginRequest { username, password })?;
        let response = self
            .call(Method::Post, LOGIN_PATH, Some(&body))
            .await
            .map_err(|e| match e {
                ApiError::Failed {
                    status: 400 | 401,
                    message,
                    ..
                } => ApiError::AuthenticationFailed(message),
                other => other,
            })?;

        let login: LoginResponse = serde_json::from_value(response)?;
        tracing::info!(
            "Logged in as {} (alias {}, location {})",
            login.user_name,
            login.account_alias,
            login.location_alias
        );
        Ok(login)
    }

    /// Build the full URL for a path relative to the API root
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.root_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.endpoint(path);
        let mut request = self.client.request(method.into(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("{} {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("{} {} -> {}", method, path, status.as_u16());

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let message = serde_json::from_str::<ApiMessage>(&text)
            .ok()
            .and_then(|m| m.message)
            .unwrap_or(text);

        Err(ApiError::Failed {
            status: status.as_u16(),
            method,
            path: path.to_string(),
            message,
        })
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_name: String,
    pub account_alias: String,
    pub location_alias: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub bearer_token: String,
}

// ============ API Types ============

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(root: &str) -> HttpTransport {
        HttpTransport::new(root, Duration::from_secs(15)).unwrap()
    }

    #[test]
    fn test_endpoint_concat() {
        let http = transport("https://api.ctl.io/v2");
        assert_eq!(
            http.endpoint("servers/BTDI/WA1BTDIWEB01"),
            "https://api.ctl.io/v2/servers/BTDI/WA1BTDIWEB01"
        );
    }

    #[test]
    fn test_endpoint_trim_root() {
        let http = transport("https://api.ctl.io/v2/");
        assert_eq!(http.root_url(), "https://api.ctl.io/v2");
        assert_eq!(
            http.endpoint("antiAffinityPolicies/BTDI"),
            "https://api.ctl.io/v2/antiAffinityPolicies/BTDI"
        );
    }

    #[test]
    fn test_endpoint_trim_path_prefix() {
        let http = transport("https://api.ctl.io/v2");
        assert_eq!(
            http.endpoint("/antiAffinityPolicies/BTDI"),
            "https://api.ctl.io/v2/antiAffinityPolicies/BTDI"
        );
    }

    #[test]
    fn test_with_token() {
        let http = transport("https://api.ctl.io/v2");
        assert!(!http.is_authenticated());
        assert!(http.with_token("abc").is_authenticated());
    }
}
