//! Two-stage push pipeline used by `right_st rightscript upload`.
//!
//! 1. [`plan`] walks the given paths and parses every script's metadata.
//!    Any failure aborts the batch before a single remote call is made.
//! 2. [`apply`] pushes each planned script in turn. A script's failure is
//!    recorded in its [`PushResult`] and the batch moves on.
//!
//! Pushing one script ([`push_script`]):
//! read source → fingerprint attachments → upsert → snapshot remote
//! attachments → reconcile → execute (deletes, then uploads).

use std::path::{Path, PathBuf};

use rightst_core::{metadata, ScriptFields, ScriptGateway, ScriptMetadata, ScriptName};

use crate::error::{io_err, SyncError};
use crate::hash_index::{hash_attachments, HashIndex, LocalAttachment};
use crate::reconcile::{self, AttachmentResult, ReconcilePlan};
use crate::snapshot::RemoteSnapshot;
use crate::upsert::{self, UpsertOutcome};
use crate::walk::walk_paths;
use crate::writer::file_stem;

/// What to do with a script whose metadata carries no name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Fail with [`SyncError::MissingMetadata`].
    #[default]
    Require,
    /// Use the file name without extension (`--force`).
    FallbackToFileStem,
}

/// A parsed local script ready to push.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalScript {
    pub path: PathBuf,
    pub metadata: ScriptMetadata,
}

/// Output of the validation stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlan {
    pub scripts: Vec<LocalScript>,
}

/// Summary of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub script: UpsertOutcome,
    pub attachments: Vec<AttachmentResult>,
}

/// Per-script outcome of [`apply`].
#[derive(Debug)]
pub struct PushResult {
    pub path: PathBuf,
    pub name: ScriptName,
    pub outcome: Result<PushReport, SyncError>,
}

/// A script whose metadata and attachments checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScript {
    pub path: PathBuf,
    pub metadata: ScriptMetadata,
    /// Declared attachments in declaration order, duplicates included.
    pub attachments: Vec<LocalAttachment>,
}

/// Stage 1: expand `paths` and load every script.
pub fn plan(paths: &[PathBuf], policy: NamePolicy) -> Result<BatchPlan, SyncError> {
    let files = walk_paths(paths)?;
    let scripts = files
        .iter()
        .map(|path| load_script(path, policy))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = scripts.len(), "planned scripts");
    Ok(BatchPlan { scripts })
}

/// Parse one script and apply the name policy.
pub fn load_script(path: &Path, policy: NamePolicy) -> Result<LocalScript, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    let mut metadata = metadata::parse_bytes(&bytes).map_err(|source| SyncError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.name.is_empty() {
        match policy {
            NamePolicy::Require => {
                return Err(SyncError::MissingMetadata {
                    path: path.to_path_buf(),
                })
            }
            NamePolicy::FallbackToFileStem => {
                metadata.name = ScriptName::from(file_stem(path));
                tracing::warn!(
                    "no embedded metadata in {}; uploading as '{}'",
                    path.display(),
                    metadata.name
                );
            }
        }
    }

    Ok(LocalScript {
        path: path.to_path_buf(),
        metadata,
    })
}

/// Stage 2: push every planned script, one at a time.
pub fn apply<G: ScriptGateway + ?Sized>(
    gateway: &G,
    plan: &BatchPlan,
    dry_run: bool,
) -> Vec<PushResult> {
    plan.scripts
        .iter()
        .map(|script| {
            let outcome = push_script(gateway, script, dry_run);
            if let Err(err) = &outcome {
                tracing::error!(error = %err, "push failed for {}", script.path.display());
            }
            PushResult {
                path: script.path.clone(),
                name: script.metadata.name.clone(),
                outcome,
            }
        })
        .collect()
}

/// Push a single script and reconcile its attachments.
pub fn push_script<G: ScriptGateway + ?Sized>(
    gateway: &G,
    script: &LocalScript,
    dry_run: bool,
) -> Result<PushReport, SyncError> {
    let source = std::fs::read(&script.path).map_err(|e| io_err(&script.path, e))?;
    let local = HashIndex::build(&script.path, &script.metadata.attachments)?;

    let fields = ScriptFields {
        name: script.metadata.name.clone(),
        description: script.metadata.description.clone(),
        source,
    };
    let outcome = upsert::upsert(gateway, &fields, dry_run)?;

    let attachments = match outcome.href() {
        Some(href) => {
            let remote = RemoteSnapshot::fetch(gateway, href)?;
            let plan = ReconcilePlan::compute(&local, &remote);
            tracing::debug!(
                delete = plan.to_delete.len(),
                create = plan.to_create.len(),
                unchanged = plan.unchanged.len(),
                "reconciled attachments for '{}'",
                fields.name
            );
            reconcile::execute(gateway, &remote, &plan, dry_run)?
        }
        // Dry run of a script that does not exist yet: everything is new.
        None => local
            .iter()
            .map(|a| AttachmentResult::WouldUpload {
                name: a.upload_name().to_string(),
                fingerprint: a.fingerprint,
            })
            .collect(),
    };

    Ok(PushReport {
        script: outcome,
        attachments,
    })
}

/// Parse a script's metadata and fingerprint its attachments.
///
/// Unlike upload, missing metadata is an error here.
pub fn validate(path: &Path) -> Result<ValidatedScript, SyncError> {
    let script = load_script(path, NamePolicy::Require)?;
    let attachments = hash_attachments(&script.path, &script.metadata.attachments)?;
    Ok(ValidatedScript {
        path: script.path,
        metadata: script.metadata,
        attachments,
    })
}
