//! Server operations and their tracking handles

use crate::error::{ClcError, Result};
use crate::link::{Link, find_rel};
use clc_api::Session;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Power operations accepted by `operations/{alias}/servers/{name}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerOperation {
    Pause,
    ShutDown,
    Reboot,
    Reset,
    PowerOn,
    PowerOff,
}

impl ServerOperation {
    pub const ALL: [ServerOperation; 6] = [
        ServerOperation::Pause,
        ServerOperation::ShutDown,
        ServerOperation::Reboot,
        ServerOperation::Reset,
        ServerOperation::PowerOn,
        ServerOperation::PowerOff,
    ];

    /// Endpoint name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            ServerOperation::Pause => "pause",
            ServerOperation::ShutDown => "shutDown",
            ServerOperation::Reboot => "reboot",
            ServerOperation::Reset => "reset",
            ServerOperation::PowerOn => "powerOn",
            ServerOperation::PowerOff => "powerOff",
        }
    }
}

impl fmt::Display for ServerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-server answer to an operation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedOperation {
    pub server: String,

    #[serde(default)]
    pub is_queued: bool,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Alias of the server the operation was queued for
    #[serde(skip)]
    alias: Option<String>,
}

impl QueuedOperation {
    pub fn status_link(&self) -> Option<&Link> {
        find_rel(&self.links, "status")
    }

    /// Id to poll with `operation::status`
    pub fn status_id(&self) -> Option<&str> {
        self.status_link().and_then(|l| l.id.as_deref())
    }

    /// Account alias the status is looked up in
    ///
    /// Set when the operation comes from a `Server` call; `None` for values
    /// deserialized elsewhere, which then fall back to the session's alias.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub(crate) fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Fetch the current status of this operation
    pub async fn status(&self, session: &Session) -> Result<OperationStatus> {
        let id = self
            .status_id()
            .ok_or_else(|| ClcError::missing("QueuedOperation", "status"))?;
        status(session, id, self.alias()).await
    }
}

/// Remote state of a queued operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationStatus {
    NotStarted,
    Executing,
    Succeeded,
    Failed,
    Resumed,
    Unknown(String),
}

impl OperationStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OperationStatus::NotStarted => "notStarted",
            OperationStatus::Executing => "executing",
            OperationStatus::Succeeded => "succeeded",
            OperationStatus::Failed => "failed",
            OperationStatus::Resumed => "resumed",
            OperationStatus::Unknown(s) => s,
        }
    }
}

impl From<String> for OperationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "notStarted" => OperationStatus::NotStarted,
            "executing" => OperationStatus::Executing,
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed,
            "resumed" => OperationStatus::Resumed,
            _ => OperationStatus::Unknown(s),
        }
    }
}

impl From<OperationStatus> for String {
    fn from(status: OperationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch the status of a queued operation
pub async fn status(session: &Session, id: &str, alias: Option<&str>) -> Result<OperationStatus> {
    let alias = session.resolve_alias(alias);
    let response: StatusResponse = session
        .get(&format!("operations/{}/status/{}", alias, id))
        .await?;
    Ok(response.status)
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: OperationStatus,
}
