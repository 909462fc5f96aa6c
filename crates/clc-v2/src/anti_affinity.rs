//! Anti-affinity policies
//!
//! A policy keeps its servers off the same physical host within one
//! datacenter.

use crate::error::Result;
use crate::link::{Link, ids_by_rel};
use clc_api::Session;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Anti-affinity policy proxy
#[derive(Debug, Clone)]
pub struct AntiAffinity {
    session: Session,
    id: String,
    alias: String,
    name: String,
    location: String,
    servers: Vec<String>,
}

impl AntiAffinity {
    /// List every policy of an account, optionally filtered by location
    ///
    /// The location match is case-insensitive and applied locally.
    pub async fn get_all(
        session: &Session,
        alias: Option<&str>,
        location: Option<&str>,
    ) -> Result<Vec<Self>> {
        let alias = session.resolve_alias(alias);
        let response: Value = session.get(&format!("antiAffinityPolicies/{}", alias)).await?;

        let wanted = location.map(str::to_lowercase);
        let mut policies = Vec::new();
        for entry in policy_entries(response) {
            let record: PolicyRecord = serde_json::from_value(entry)?;
            if let Some(wanted) = &wanted {
                if record.location.to_lowercase() != *wanted {
                    continue;
                }
            }
            policies.push(Self::from_record(session, alias, record));
        }

        tracing::debug!("Found {} anti-affinity policies for {}", policies.len(), alias);
        Ok(policies)
    }

    /// List the policies of one location (the session's by default)
    pub async fn get_location(
        session: &Session,
        location: Option<&str>,
        alias: Option<&str>,
    ) -> Result<Vec<Self>> {
        let location = session.resolve_location(location);
        Self::get_all(session, alias, Some(location)).await
    }

    /// Create a policy
    ///
    /// The new policy starts with no servers.
    pub async fn create(
        session: &Session,
        name: &str,
        alias: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let alias = session.resolve_alias(alias);
        let location = session.resolve_location(location);

        tracing::info!("Creating anti-affinity policy {} in {}", name, location);
        let record: PolicyRecord = session
            .post(
                &format!("antiAffinityPolicies/{}", alias),
                &CreatePolicyRequest { name, location },
            )
            .await?;

        Ok(Self {
            session: session.clone(),
            id: record.id,
            alias: alias.to_string(),
            name: record.name,
            location: record.location,
            servers: Vec::new(),
        })
    }

    /// Fetch a policy by id
    pub async fn get(session: &Session, id: &str, alias: Option<&str>) -> Result<Self> {
        let alias = session.resolve_alias(alias);
        let record: PolicyRecord = session
            .get(&format!("antiAffinityPolicies/{}/{}", alias, id))
            .await?;
        Ok(Self::from_record(session, alias, record))
    }

    /// Build a proxy from already known fields without any remote call
    pub fn new(
        session: &Session,
        id: impl Into<String>,
        alias: Option<&str>,
        name: impl Into<String>,
        location: impl Into<String>,
        servers: Vec<String>,
    ) -> Self {
        Self {
            session: session.clone(),
            id: id.into(),
            alias: session.resolve_alias(alias).to_string(),
            name: name.into(),
            location: location.into(),
            servers,
        }
    }

    fn from_record(session: &Session, alias: &str, record: PolicyRecord) -> Self {
        let servers = ids_by_rel(&record.links, "server");
        Self {
            session: session.clone(),
            id: record.id,
            alias: alias.to_string(),
            name: record.name,
            location: record.location,
            servers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Ids of the servers bound to this policy
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Rename the policy
    pub async fn update(&mut self, name: &str) -> Result<()> {
        tracing::info!("Renaming anti-affinity policy {} to {}", self.id, name);
        let _: Value = self
            .session
            .put(&self.path(), &UpdatePolicyRequest { name })
            .await?;
        self.name = name.to_string();
        Ok(())
    }

    /// Delete the policy
    pub async fn delete(self) -> Result<()> {
        tracing::info!("Deleting anti-affinity policy {} ({})", self.id, self.name);
        let _: Value = self.session.delete(&self.path()).await?;
        Ok(())
    }

    fn path(&self) -> String {
        format!("antiAffinityPolicies/{}/{}", self.alias, self.id)
    }
}

impl fmt::Display for AntiAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Policy objects found in a list response
///
/// The list response wraps policies in an object (`items`) next to other
/// arrays such as `links`; only entries carrying a location are policies.
fn policy_entries(response: Value) -> Vec<Value> {
    let arrays: Vec<Value> = match response {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        array @ Value::Array(_) => vec![array],
        _ => Vec::new(),
    };

    arrays
        .into_iter()
        .filter_map(|v| match v {
            Value::Array(entries) => Some(entries),
            _ => None,
        })
        .flatten()
        .filter(|entry| {
            entry
                .get("location")
                .and_then(Value::as_str)
                .is_some_and(|l| !l.is_empty())
        })
        .collect()
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct PolicyRecord {
    id: String,
    name: String,
    location: String,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Serialize)]
struct CreatePolicyRequest<'a> {
    name: &'a str,
    location: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdatePolicyRequest<'a> {
    name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_api::{Method, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, Session) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(mock.clone(), "BTDI", "WA1");
        (mock, session)
    }

    fn policy_json(id: &str, name: &str, location: &str, servers: &[&str]) -> Value {
        let mut links = vec![json!({
            "rel": "self",
            "href": format!("/v2/antiAffinityPolicies/BTDI/{}", id),
            "verbs": ["GET", "DELETE", "PUT"]
        })];
        for server in servers {
            links.push(json!({
                "rel": "server",
                "href": format!("/v2/servers/BTDI/{}", server.to_lowercase()),
                "id": server
            }));
        }
        json!({"id": id, "name": name, "location": location, "links": links})
    }

    fn list_json() -> Value {
        json!({
            "items": [
                policy_json("p1", "web", "WA1", &["WA1BTDIWEB01", "WA1BTDIWEB02"]),
                policy_json("p2", "db", "va1", &[]),
                policy_json("p3", "cache", "wa1", &["WA1BTDICACHE01"]),
            ],
            "links": [{"rel": "self", "href": "/v2/antiAffinityPolicies/BTDI", "verbs": ["GET", "POST"]}]
        })
    }

    #[tokio::test]
    async fn test_get_all() {
        let (mock, session) = setup();
        mock.respond(Method::Get, "antiAffinityPolicies/BTDI", list_json());

        let policies = AntiAffinity::get_all(&session, None, None).await.unwrap();

        assert_eq!(policies.len(), 3);
        assert_eq!(policies[0].id(), "p1");
        assert_eq!(policies[0].servers(), ["WA1BTDIWEB01", "WA1BTDIWEB02"]);
        assert!(policies[1].servers().is_empty());
        assert_eq!(policies[2].alias(), "BTDI");
    }

    #[tokio::test]
    async fn test_get_all_filters_location_case_insensitively() {
        let (mock, session) = setup();
        mock.respond(Method::Get, "antiAffinityPolicies/BTDI", list_json());

        let policies = AntiAffinity::get_all(&session, None, Some("Wa1")).await.unwrap();

        let ids: Vec<&str> = policies.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_get_all_location_folds_unicode_case() {
        let (mock, session) = setup();
        mock.respond(
            Method::Get,
            "antiAffinityPolicies/BTDI",
            json!({"items": [
                policy_json("p1", "web", "ÉU1", &[]),
                policy_json("p2", "db", "EU1", &[]),
            ]}),
        );

        let policies = AntiAffinity::get_all(&session, None, Some("éu1")).await.unwrap();

        let ids: Vec<&str> = policies.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn test_get_all_explicit_alias() {
        let (mock, session) = setup();
        mock.respond(Method::Get, "antiAffinityPolicies/OTHR", json!({"items": []}));

        let policies = AntiAffinity::get_all(&session, Some("OTHR"), None).await.unwrap();

        assert!(policies.is_empty());
        assert_eq!(mock.calls()[0].path, "antiAffinityPolicies/OTHR");
    }

    #[tokio::test]
    async fn test_get_location_defaults_to_session() {
        let (mock, session) = setup();
        mock.respond(Method::Get, "antiAffinityPolicies/BTDI", list_json());

        let default = AntiAffinity::get_location(&session, None, None).await.unwrap();
        assert_eq!(default.len(), 2);

        let va1 = AntiAffinity::get_location(&session, Some("VA1"), None).await.unwrap();
        assert_eq!(va1.len(), 1);
        assert_eq!(va1[0].name(), "db");
    }

    #[tokio::test]
    async fn test_create() {
        let (mock, session) = setup();
        mock.respond(
            Method::Post,
            "antiAffinityPolicies/BTDI",
            policy_json("p9", "new-policy", "WA1", &["IGNORED01"]),
        );

        let policy = AntiAffinity::create(&session, "new-policy", None, None)
            .await
            .unwrap();

        assert_eq!(policy.id(), "p9");
        assert_eq!(policy.location(), "WA1");
        assert!(policy.servers().is_empty());
        assert_eq!(
            mock.calls()[0].body,
            Some(json!({"name": "new-policy", "location": "WA1"}))
        );
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (mock, session) = setup();
        mock.respond(
            Method::Get,
            "antiAffinityPolicies/BTDI/p1",
            policy_json("p1", "web", "WA1", &["WA1BTDIWEB01"]),
        );

        let policy = AntiAffinity::get(&session, "p1", None).await.unwrap();

        assert_eq!(policy.name(), "web");
        assert_eq!(policy.servers(), ["WA1BTDIWEB01"]);
        assert_eq!(policy.to_string(), "web");
    }

    #[tokio::test]
    async fn test_new_issues_no_call() {
        let (mock, session) = setup();

        let policy = AntiAffinity::new(&session, "p1", None, "web", "WA1", vec![]);

        assert_eq!(policy.alias(), "BTDI");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_changes_name_only() {
        let (mock, session) = setup();
        mock.respond(Method::Put, "antiAffinityPolicies/BTDI/p1", Value::Null);
        let mut policy = AntiAffinity::new(&session, "p1", None, "web", "WA1", vec![]);

        policy.update("frontend").await.unwrap();

        assert_eq!(policy.name(), "frontend");
        assert_eq!(policy.id(), "p1");
        assert_eq!(policy.location(), "WA1");
        assert_eq!(mock.calls()[0].body, Some(json!({"name": "frontend"})));
    }

    #[tokio::test]
    async fn test_update_failure_keeps_name() {
        let (mock, session) = setup();
        mock.fail(Method::Put, "antiAffinityPolicies/BTDI/p1", 500, "Internal Server Error");
        let mut policy = AntiAffinity::new(&session, "p1", None, "web", "WA1", vec![]);

        let err = policy.update("frontend").await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(policy.name(), "web");
    }

    #[tokio::test]
    async fn test_delete() {
        let (mock, session) = setup();
        mock.respond(Method::Delete, "antiAffinityPolicies/BTDI/p1", Value::Null);
        let policy = AntiAffinity::new(&session, "p1", None, "web", "WA1", vec![]);

        policy.delete().await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].method, Method::Delete);
        assert_eq!(calls[0].path, "antiAffinityPolicies/BTDI/p1");
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let (mock, session) = setup();
        mock.fail(Method::Post, "antiAffinityPolicies/BTDI", 400, "The location is invalid.");

        let err = AntiAffinity::create(&session, "x", None, Some("ZZ9"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("POST antiAffinityPolicies/BTDI"));
    }

    #[test]
    fn test_policy_entries_skip_links() {
        let entries = policy_entries(list_json());
        assert_eq!(entries.len(), 3);

        let bare = policy_entries(json!([policy_json("p1", "web", "WA1", &[])]));
        assert_eq!(bare.len(), 1);

        assert!(policy_entries(Value::Null).is_empty());
    }
}
