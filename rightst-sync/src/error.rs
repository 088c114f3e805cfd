//! Error types for rightst-sync.

use std::path::{Path, PathBuf};

use thiserror::Error;

use rightst_core::{Fingerprint, GatewayError, MetadataError, ScriptHref};

/// All errors that can arise while planning, pushing or validating scripts.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed embedded metadata.
    #[error("{path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },

    /// The script has no metadata block (or an empty name) and no fallback
    /// was granted.
    #[error("{path}: no embedded metadata; use --force to upload anyway")]
    MissingMetadata { path: PathBuf },

    /// A declared attachment could not be opened or read to completion.
    #[error("attachment '{name}' is unreadable at {path}: {source}")]
    AttachmentUnreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An attachment's bytes changed between fingerprinting and upload.
    #[error(
        "attachment '{name}' at {path} changed while pushing (fingerprinted {expected}, now {actual})"
    )]
    AttachmentChanged {
        name: String,
        path: PathBuf,
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// More than one head-revision remote script carries the same name.
    #[error(
        "matched multiple scripts named '{name}' at head revision ({}); delete one or address it by href",
        join_hrefs(.candidates)
    )]
    AmbiguousTarget {
        name: String,
        candidates: Vec<ScriptHref>,
    },

    /// A gateway call returned an error.
    #[error("{operation} failed for {target}: {source}")]
    RemoteOperationFailed {
        operation: &'static str,
        target: String,
        #[source]
        source: GatewayError,
    },

    /// No remote script matched a lookup by name.
    #[error("found no script matching '{query}'")]
    NotFound { query: String },

    /// A remote script name that cannot be used as a local file name.
    #[error("script name '{name}' is not a usable file name; pass a destination path")]
    InvalidFileName { name: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// The script file this error's message already names, if any.
    pub fn script_path(&self) -> Option<&Path> {
        match self {
            SyncError::Metadata { path, .. } | SyncError::MissingMetadata { path } => {
                Some(path.as_path())
            }
            _ => None,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::RemoteOperationFailed`].
pub(crate) fn remote_err(
    operation: &'static str,
    target: impl std::fmt::Display,
) -> impl FnOnce(GatewayError) -> SyncError {
    let target = target.to_string();
    move |source| SyncError::RemoteOperationFailed {
        operation,
        target,
        source,
    }
}

fn join_hrefs(hrefs: &[ScriptHref]) -> String {
    hrefs
        .iter()
        .map(|h| h.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
