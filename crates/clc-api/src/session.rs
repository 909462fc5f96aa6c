//! Session context
//!
//! A `Session` bundles the transport with the account defaults (alias and
//! location) and is passed explicitly to every resource constructor.

use crate::error::Result;
use crate::http::HttpTransport;
use crate::transport::{Method, Transport};
use clc_config::ClientConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    alias: String,
    location: String,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        alias: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            alias: alias.into(),
            location: location.into(),
        }
    }

    /// Log in with the configured credentials
    ///
    /// Alias and location come from the config when set, otherwise from the
    /// login response.
    pub async fn login(config: &ClientConfig) -> Result<Self> {
        let (username, password) = config.credentials()?;
        let http = HttpTransport::from_config(config)?;
        let login = http.login(username, password).await?;

        let alias = config.alias.clone().unwrap_or(login.account_alias);
        let location = config.location.clone().unwrap_or(login.location_alias);
        let transport = http.with_token(login.bearer_token);

        Ok(Self::new(Arc::new(transport), alias, location))
    }

    /// Default account alias
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Default datacenter
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn resolve_alias<'a>(&'a self, alias: Option<&'a str>) -> &'a str {
        alias.unwrap_or(&self.alias)
    }

    pub fn resolve_location<'a>(&'a self, location: Option<&'a str>) -> &'a str {
        location.unwrap_or(&self.location)
    }

    /// Raw call returning the decoded JSON body
    pub async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        self.transport.call(method, path, body).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.call(Method::Get, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.call(Method::Post, path, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self.call(Method::Put, path, Some(&body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.call(Method::Delete, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("alias", &self.alias)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
