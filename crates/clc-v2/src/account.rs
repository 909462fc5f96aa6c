//! Accounts

use crate::anti_affinity::AntiAffinity;
use crate::error::Result;
use crate::server::Server;
use clc_api::Session;
use std::fmt;

/// Account proxy scoped to one alias
///
/// Construction never calls the API.
#[derive(Debug, Clone)]
pub struct Account {
    session: Session,
    alias: String,
}

impl Account {
    pub fn new(session: &Session, alias: Option<&str>) -> Self {
        Self {
            session: session.clone(),
            alias: session.resolve_alias(alias).to_string(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Datacenter used when an operation does not name one
    pub fn default_location(&self) -> &str {
        self.session.location()
    }

    pub async fn anti_affinity_policies(&self) -> Result<Vec<AntiAffinity>> {
        AntiAffinity::get_all(&self.session, Some(self.alias.as_str()), None).await
    }

    pub async fn server(&self, id: &str) -> Result<Server> {
        Server::get(&self.session, id, Some(self.alias.as_str())).await
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alias)
    }
}
