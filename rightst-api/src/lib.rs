//! # rightst-api
//!
//! [`ApiClient`] implements [`rightst_core::ScriptGateway`] over the
//! RightScale 1.5 HTTP API using a blocking `ureq` agent.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = rightst_core::config::load()?;
//! let (_, env) = config.environment(None)?;
//! let client = rightst_api::ApiClient::login(env)?;
//! # Ok(()) }
//! ```

pub mod client;
pub mod multipart;
mod wire;

pub use client::{ApiClient, API_VERSION, DEFAULT_TIMEOUT};
