//! Servers
//!
//! `Server` wraps the JSON returned by `GET servers/{alias}/{id}` in a typed
//! `ServerData`. A field lands in its typed slot only when the typed value
//! reproduces the received JSON exactly. Anything else (undocumented keys,
//! explicit nulls, unexpected shapes) is kept verbatim in the `extra` maps,
//! so `Server::attr` always returns what the API sent.

use crate::account::Account;
use crate::error::{ClcError, Result};
use crate::group::Group;
use crate::link::Link;
use crate::operation::{QueuedOperation, ServerOperation};
use chrono::{DateTime, NaiveDateTime, Utc};
use clc_api::Session;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Snapshot retention used when the caller does not pick one
pub const DEFAULT_SNAPSHOT_EXPIRATION_DAYS: u32 = 7;

/// Server proxy
#[derive(Debug, Clone)]
pub struct Server {
    session: Session,
    id: String,
    alias: String,
    data: ServerData,
}

/// Remote server state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_id: Option<String>,
    pub is_template: Option<bool>,
    pub location_id: Option<String>,
    pub os_type: Option<String>,
    pub os: Option<String>,
    pub status: Option<String>,
    pub server_type: Option<String>,
    pub storage_type: Option<String>,
    pub change_info: Option<ChangeInfo>,
    pub details: Option<ServerDetails>,
    pub links: Option<Vec<Link>>,

    /// Top-level fields kept as received
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerDetails {
    pub ip_addresses: Option<Vec<IpAddress>>,
    pub cpu: Option<u32>,
    pub disk_count: Option<u32>,
    pub host_name: Option<String>,
    pub in_maintenance_mode: Option<bool>,
    pub memory_mb: Option<u64>,
    pub power_state: Option<String>,
    pub storage_gb: Option<u64>,
    pub snapshots: Option<Vec<SnapshotInfo>>,
    pub custom_fields: Option<Vec<CustomField>>,

    /// Detail fields kept as received
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_date.as_deref().and_then(parse_timestamp)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_date.as_deref().and_then(parse_timestamp)
    }
}

/// RFC 3339, or `YYYY-MM-DD HH:MM:SS` taken as UTC
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|t| t.and_utc())
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Splits a JSON object into typed slots and verbatim leftovers
struct Fields {
    remaining: Map<String, Value>,
    kept: Map<String, Value>,
}

impl Fields {
    fn new(remaining: Map<String, Value>) -> Self {
        Self {
            remaining,
            kept: Map::new(),
        }
    }

    /// Typed value of `key`, or `None` with the raw value kept aside when it
    /// does not convert back to the same JSON
    fn take<T: DeserializeOwned + Serialize>(&mut self, key: &str) -> Option<T> {
        let value = self.remaining.remove(key)?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) if serde_json::to_value(&typed).ok().as_ref() == Some(&value) => Some(typed),
            _ => {
                self.kept.insert(key.to_string(), value);
                None
            }
        }
    }

    fn finish(mut self) -> Map<String, Value> {
        self.kept.append(&mut self.remaining);
        self.kept
    }
}

fn put<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = to_json(value) {
        map.insert(key.to_string(), value);
    }
}

fn to_json<T: Serialize>(value: &Option<T>) -> Option<Value> {
    value.as_ref().and_then(|v| serde_json::to_value(v).ok())
}

impl ServerData {
    fn from_map(map: Map<String, Value>) -> Self {
        let mut fields = Fields::new(map);
        Self {
            id: fields.take("id"),
            name: fields.take("name"),
            description: fields.take("description"),
            group_id: fields.take("groupId"),
            is_template: fields.take("isTemplate"),
            location_id: fields.take("locationId"),
            os_type: fields.take("osType"),
            os: fields.take("os"),
            status: fields.take("status"),
            server_type: fields.take("type"),
            storage_type: fields.take("storageType"),
            change_info: fields.take("changeInfo"),
            details: fields.take("details"),
            links: fields.take("links"),
            extra: fields.finish(),
        }
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        put(&mut map, "id", &self.id);
        put(&mut map, "name", &self.name);
        put(&mut map, "description", &self.description);
        put(&mut map, "groupId", &self.group_id);
        put(&mut map, "isTemplate", &self.is_template);
        put(&mut map, "locationId", &self.location_id);
        put(&mut map, "osType", &self.os_type);
        put(&mut map, "os", &self.os);
        put(&mut map, "status", &self.status);
        put(&mut map, "type", &self.server_type);
        put(&mut map, "storageType", &self.storage_type);
        put(&mut map, "changeInfo", &self.change_info);
        put(&mut map, "details", &self.details);
        put(&mut map, "links", &self.links);
        map
    }

    /// Top-level field by its API name, `None` when the API did not send it
    pub fn field(&self, name: &str) -> Option<Value> {
        let typed = match name {
            "id" => to_json(&self.id),
            "name" => to_json(&self.name),
            "description" => to_json(&self.description),
            "groupId" => to_json(&self.group_id),
            "isTemplate" => to_json(&self.is_template),
            "locationId" => to_json(&self.location_id),
            "osType" => to_json(&self.os_type),
            "os" => to_json(&self.os),
            "status" => to_json(&self.status),
            "type" => to_json(&self.server_type),
            "storageType" => to_json(&self.storage_type),
            "changeInfo" => to_json(&self.change_info),
            "details" => to_json(&self.details),
            "links" => to_json(&self.links),
            _ => None,
        };
        typed.or_else(|| self.extra.get(name).cloned())
    }
}

impl ServerDetails {
    fn from_map(map: Map<String, Value>) -> Self {
        let mut fields = Fields::new(map);
        Self {
            ip_addresses: fields.take("ipAddresses"),
            cpu: fields.take("cpu"),
            disk_count: fields.take("diskCount"),
            host_name: fields.take("hostName"),
            in_maintenance_mode: fields.take("inMaintenanceMode"),
            memory_mb: fields.take("memoryMB"),
            power_state: fields.take("powerState"),
            storage_gb: fields.take("storageGB"),
            snapshots: fields.take("snapshots"),
            custom_fields: fields.take("customFields"),
            extra: fields.finish(),
        }
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        put(&mut map, "ipAddresses", &self.ip_addresses);
        put(&mut map, "cpu", &self.cpu);
        put(&mut map, "diskCount", &self.disk_count);
        put(&mut map, "hostName", &self.host_name);
        put(&mut map, "inMaintenanceMode", &self.in_maintenance_mode);
        put(&mut map, "memoryMB", &self.memory_mb);
        put(&mut map, "powerState", &self.power_state);
        put(&mut map, "storageGB", &self.storage_gb);
        put(&mut map, "snapshots", &self.snapshots);
        put(&mut map, "customFields", &self.custom_fields);
        map
    }

    /// Detail field by its API name, `None` when the API did not send it
    pub fn field(&self, name: &str) -> Option<Value> {
        let typed = match name {
            "ipAddresses" => to_json(&self.ip_addresses),
            "cpu" => to_json(&self.cpu),
            "diskCount" => to_json(&self.disk_count),
            "hostName" => to_json(&self.host_name),
            "inMaintenanceMode" => to_json(&self.in_maintenance_mode),
            "memoryMB" => to_json(&self.memory_mb),
            "powerState" => to_json(&self.power_state),
            "storageGB" => to_json(&self.storage_gb),
            "snapshots" => to_json(&self.snapshots),
            "customFields" => to_json(&self.custom_fields),
            _ => None,
        };
        typed.or_else(|| self.extra.get(name).cloned())
    }
}

impl<'de> Deserialize<'de> for ServerData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

impl Serialize for ServerData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ServerDetails {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

impl Serialize for ServerDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl Server {
    /// Fetch a server by id
    pub async fn get(session: &Session, id: &str, alias: Option<&str>) -> Result<Self> {
        let alias = session.resolve_alias(alias);
        let data: ServerData = session.get(&format!("servers/{}/{}", alias, id)).await?;
        Ok(Self {
            session: session.clone(),
            id: id.to_string(),
            alias: alias.to_string(),
            data,
        })
    }

    /// Wrap already fetched data; no remote call
    pub fn from_data(
        session: &Session,
        id: impl Into<String>,
        alias: Option<&str>,
        data: ServerData,
    ) -> Self {
        Self {
            session: session.clone(),
            id: id.into(),
            alias: session.resolve_alias(alias).to_string(),
            data,
        }
    }

    /// Wrap an already fetched JSON body; no remote call
    pub fn from_value(
        session: &Session,
        id: impl Into<String>,
        alias: Option<&str>,
        value: Value,
    ) -> Result<Self> {
        let data = serde_json::from_value(value)?;
        Ok(Self::from_data(session, id, alias, data))
    }

    /// Re-fetch the server state
    pub async fn refresh(&mut self) -> Result<()> {
        self.data = self.session.get(&self.path()).await?;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn data(&self) -> &ServerData {
        &self.data
    }

    /// Look a field up by its API name
    ///
    /// Top-level fields win over `details` fields.
    pub fn attr(&self, name: &str) -> Result<Value> {
        self.data
            .field(name)
            .or_else(|| self.data.details.as_ref().and_then(|d| d.field(name)))
            .ok_or_else(|| ClcError::missing("Server", name))
    }

    pub fn name(&self) -> Option<&str> {
        self.data.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.data.description.as_deref()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.data.group_id.as_deref()
    }

    pub fn location_id(&self) -> Option<&str> {
        self.data.location_id.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.data.status.as_deref()
    }

    pub fn os(&self) -> Option<&str> {
        self.data.os.as_deref()
    }

    pub fn cpu(&self) -> Option<u32> {
        self.details().and_then(|d| d.cpu)
    }

    pub fn memory_mb(&self) -> Option<u64> {
        self.details().and_then(|d| d.memory_mb)
    }

    pub fn storage_gb(&self) -> Option<u64> {
        self.details().and_then(|d| d.storage_gb)
    }

    /// Power state as of the last fetch
    pub fn power_state(&self) -> Option<&str> {
        self.details().and_then(|d| d.power_state.as_deref())
    }

    pub fn in_maintenance_mode(&self) -> Option<bool> {
        self.details().and_then(|d| d.in_maintenance_mode)
    }

    fn details(&self) -> Option<&ServerDetails> {
        self.data.details.as_ref()
    }

    /// Account owning this server
    pub fn account(&self) -> Account {
        Account::new(&self.session, Some(self.alias.as_str()))
    }

    /// Group containing this server
    pub fn group(&self) -> Result<Group> {
        let group_id = self
            .group_id()
            .ok_or_else(|| ClcError::missing("Server", "groupId"))?;
        Ok(Group::new(&self.session, group_id, Some(self.alias.as_str())))
    }

    /// Queue a power operation
    ///
    /// Local data is not updated; call `refresh` to observe the new state.
    pub async fn execute(&self, operation: ServerOperation) -> Result<Vec<QueuedOperation>> {
        tracing::info!("Queueing {} for server {}", operation, self.id);
        let queued: Vec<QueuedOperation> = self
            .session
            .post(
                &format!("operations/{}/servers/{}", self.alias, operation.name()),
                &OperationRequest {
                    server_ids: [self.id.as_str()],
                },
            )
            .await?;
        Ok(self.owned(queued))
    }

    pub async fn pause(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::Pause).await
    }

    pub async fn shut_down(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::ShutDown).await
    }

    pub async fn reboot(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::Reboot).await
    }

    pub async fn reset(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::Reset).await
    }

    pub async fn power_on(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::PowerOn).await
    }

    pub async fn power_off(&self) -> Result<Vec<QueuedOperation>> {
        self.execute(ServerOperation::PowerOff).await
    }

    /// Take a hypervisor-level snapshot kept for `expiration_days` (1 to 10,
    /// checked remotely; 7 when `None`)
    pub async fn snapshot(&self, expiration_days: Option<u32>) -> Result<Vec<QueuedOperation>> {
        let days = expiration_days.unwrap_or(DEFAULT_SNAPSHOT_EXPIRATION_DAYS);
        tracing::info!("Creating snapshot of {} kept for {} days", self.id, days);
        let queued: Vec<QueuedOperation> = self
            .session
            .post(
                &format!("operations/{}/servers/createSnapshot", self.alias),
                &SnapshotRequest {
                    server_ids: [self.id.as_str()],
                    snapshot_expiration_days: days,
                },
            )
            .await?;
        Ok(self.owned(queued))
    }

    /// Delete the server
    pub async fn delete(self) -> Result<QueuedOperation> {
        tracing::info!("Deleting server {}", self.id);
        let queued: QueuedOperation = self.session.delete(&self.path()).await?;
        Ok(queued.with_alias(&self.alias))
    }

    /// Server updates are not supported by this client yet
    pub async fn update(&mut self, _changes: &Value) -> Result<()> {
        Err(ClcError::NotImplemented("server update"))
    }

    fn path(&self) -> String {
        format!("servers/{}/{}", self.alias, self.id)
    }

    fn owned(&self, queued: Vec<QueuedOperation>) -> Vec<QueuedOperation> {
        queued
            .into_iter()
            .map(|q| q.with_alias(&self.alias))
            .collect()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(&self.id))
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationRequest<'a> {
    server_ids: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRequest<'a> {
    server_ids: [&'a str; 1],
    snapshot_expiration_days: u32,
}
