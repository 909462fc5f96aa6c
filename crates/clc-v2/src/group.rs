//! Server groups

use crate::error::Result;
use crate::link::{Link, ids_by_rel};
use clc_api::Session;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Group proxy
///
/// Holds only the id; `get` fetches the group on demand.
#[derive(Debug, Clone)]
pub struct Group {
    session: Session,
    id: String,
    alias: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub status: Option<String>,
    pub servers_count: Option<u32>,
    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupData {
    /// Ids of the servers directly in this group
    pub fn server_ids(&self) -> Vec<String> {
        ids_by_rel(&self.links, "server")
    }
}

impl Group {
    pub fn new(session: &Session, id: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            session: session.clone(),
            id: id.into(),
            alias: session.resolve_alias(alias).to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub async fn get(&self) -> Result<GroupData> {
        Ok(self
            .session
            .get(&format!("groups/{}/{}", self.alias, self.id))
            .await?)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_api::{Method, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_is_lazy() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "groups/BTDI/g1",
            json!({
                "id": "g1",
                "name": "Ansible Managed Servers",
                "locationId": "WA1",
                "type": "default",
                "status": "active",
                "serversCount": 2,
                "groups": [],
                "links": [
                    {"rel": "server", "href": "/v2/servers/btdi/wa1btdiweb01", "id": "WA1BTDIWEB01"},
                    {"rel": "server", "href": "/v2/servers/btdi/wa1btdiweb02", "id": "WA1BTDIWEB02"}
                ]
            }),
        );
        let session = Session::new(mock.clone(), "BTDI", "WA1");

        let group = Group::new(&session, "g1", None);
        assert_eq!(mock.call_count(), 0);

        let data = group.get().await.unwrap();
        assert_eq!(data.name.as_deref(), Some("Ansible Managed Servers"));
        assert_eq!(data.group_type.as_deref(), Some("default"));
        assert_eq!(data.server_ids(), vec!["WA1BTDIWEB01", "WA1BTDIWEB02"]);
        assert!(data.extra.contains_key("groups"));
        assert_eq!(mock.call_count(), 1);
    }
}
