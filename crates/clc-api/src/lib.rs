//! CenturyLink Cloud v2 API transport
//!
//! This crate provides the transport collaborator used by the resource
//! proxies in `clc-v2`: a `Transport` trait, a reqwest implementation with
//! bearer-token login, and the `Session` context carrying the account
//! defaults.
//!
//! # Example
//!
//! ```ignore
//! use clc_api::Session;
//! use clc_config::ClientConfig;
//!
//! let config = ClientConfig::load()?;
//! let session = Session::login(&config).await?;
//!
//! let server: serde_json::Value = session
//!     .get(&format!("servers/{}/{}", session.alias(), "WA1BTDIWEB01"))
//!     .await?;
//! ```

pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod session;
pub mod transport;

pub use error::{ApiError, Result};
pub use http::{HttpTransport, LoginResponse};
#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockTransport, RecordedCall};
pub use session::Session;
pub use transport::{Method, Transport};
