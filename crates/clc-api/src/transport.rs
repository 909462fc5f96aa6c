//! Transport trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP verbs used by the v2 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Performs one authenticated API call
///
/// `path` is relative to the API root (e.g. `servers/BTDI/WA1BTDIWEB01`).
/// Implementations return the decoded JSON body, `Value::Null` for an empty
/// body, and `ApiError::Failed` for any non-2xx response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value>;
}
