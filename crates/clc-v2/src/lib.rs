//! CenturyLink Cloud v2 resources
//!
//! Thin proxies over the v2 REST API. Each proxy is built from an explicit
//! `Session` and either fetches its state by id or wraps data the caller
//! already has.
//!
//! # Example
//!
//! ```ignore
//! use clc_api::Session;
//! use clc_config::ClientConfig;
//! use clc_v2::{AntiAffinity, Server};
//!
//! let session = Session::login(&ClientConfig::load()?).await?;
//!
//! // Policies in the session's default datacenter
//! for policy in AntiAffinity::get_location(&session, None, None).await? {
//!     println!("{} {:?}", policy, policy.servers());
//! }
//!
//! // Reboot a server and check on the queued operation
//! let server = Server::get(&session, "WA1BTDIWEB01", None).await?;
//! for queued in server.reboot().await? {
//!     println!("{}", queued.status(&session).await?);
//! }
//! ```

pub mod account;
pub mod anti_affinity;
pub mod error;
pub mod group;
pub mod link;
pub mod operation;
pub mod server;

pub use account::Account;
pub use anti_affinity::AntiAffinity;
pub use error::{ClcError, Result};
pub use group::{Group, GroupData};
pub use link::Link;
pub use operation::{OperationStatus, QueuedOperation, ServerOperation};
pub use server::{DEFAULT_SNAPSHOT_EXPIRATION_DAYS, Server, ServerData, ServerDetails};
