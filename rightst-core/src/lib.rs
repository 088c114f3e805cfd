//! rightst core library: script domain types, metadata parsing, config,
//! and the remote gateway contract.
//!
//! - [`types`]: newtypes, fingerprints, remote state
//! - [`metadata`]: embedded metadata parser and scaffolder
//! - [`gateway`]: [`ScriptGateway`] collaborator trait
//! - [`config`]: `~/.right_st.yml` loading
//! - [`error`]: error enums

pub mod config;
pub mod error;
pub mod gateway;
pub mod metadata;
pub mod types;

pub use error::{ConfigError, FingerprintError, GatewayError, MetadataError};
pub use gateway::ScriptGateway;
pub use metadata::ScriptMetadata;
pub use types::{
    AttachmentHref, AttachmentId, Fingerprint, Link, RemoteAttachment, ScriptFields, ScriptHref,
    ScriptName, ScriptSummary,
};
