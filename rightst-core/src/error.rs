//! Error types for rightst-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from parsing or scaffolding an embedded metadata block.
///
/// Line numbers are 1-based and refer to the script file.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A `# ---` start marker was found but no `# ...` end marker follows it.
    #[error("metadata block opened on line {line} is never closed with '# ...'")]
    Unterminated { line: usize },

    /// A line inside the metadata block is not a comment.
    #[error("line {line} inside the metadata block is not a comment: {content:?}")]
    NotAComment { line: usize, content: String },

    /// The comment-stripped block is not valid metadata YAML.
    #[error("invalid metadata YAML in block starting on line {line}: {source}")]
    Yaml {
        line: usize,
        #[source]
        source: serde_yaml::Error,
    },

    /// An `Attachments` entry that cannot be resolved next to the script.
    #[error("attachment #{index} {value:?} must be a non-empty relative path")]
    InvalidAttachment { index: usize, value: String },
}

/// A remote digest or fingerprint string that is not 32 hex characters.
#[derive(Debug, Error)]
#[error("invalid fingerprint {value:?}: expected 32 hex characters")]
pub struct FingerprintError {
    pub value: String,
}

/// Failure of a single call through a [`crate::gateway::ScriptGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote platform answered with a non-success status.
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response arrived but could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Errors from loading the `right_st` configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,

    #[error("environment '{name}' is not defined in the config (known: {known})")]
    UnknownEnvironment { name: String, known: String },

    #[error("no environment selected; pass --environment or set login.default_environment")]
    EnvironmentNotSelected,

    #[error("environment '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}
