//! Attachment reconciliation.
//!
//! Local and remote attachments are matched purely by content fingerprint:
//!
//! - `to_delete = remote − local`: removed from the metadata, or the file's
//!   bytes changed and its old fingerprint is orphaned
//! - `to_create = local − remote`: new attachment, or new content
//! - `unchanged = local ∩ remote`: nothing to do; display names are not
//!   compared, so a rename without a content change is left alone
//!
//! [`execute`] uploads the bytes it verified against the planned fingerprint,
//! never a later re-read of the file. It issues every delete before any create. A content change shows
//! up as one delete plus one create, and the stale attachment is gone before
//! its replacement is uploaded under the same name. The first failing call
//! aborts the rest; already-applied operations are not rolled back.

use std::fs;

use rightst_core::{AttachmentHref, Fingerprint, RemoteAttachment, ScriptGateway};

use crate::error::{remote_err, SyncError};
use crate::hash_index::{fingerprint_bytes, HashIndex, LocalAttachment};
use crate::snapshot::RemoteSnapshot;

/// A local attachment whose content is already stored remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unchanged {
    pub local: LocalAttachment,
    /// Name the remote copy is stored under; may differ from the local name.
    pub remote_name: String,
}

/// Create/delete decision set between a [`HashIndex`] and a [`RemoteSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_delete: Vec<RemoteAttachment>,
    pub to_create: Vec<LocalAttachment>,
    pub unchanged: Vec<Unchanged>,
}

impl ReconcilePlan {
    /// Diff local against remote. All three lists are in fingerprint order.
    pub fn compute(local: &HashIndex, remote: &RemoteSnapshot) -> Self {
        let to_delete = remote
            .iter()
            .filter(|a| !local.contains(&a.digest))
            .cloned()
            .collect();

        let mut to_create = Vec::new();
        let mut unchanged = Vec::new();
        for attachment in local.iter() {
            match remote.get(&attachment.fingerprint) {
                Some(existing) => unchanged.push(Unchanged {
                    local: attachment.clone(),
                    remote_name: existing.name.clone(),
                }),
                None => to_create.push(attachment.clone()),
            }
        }

        Self {
            to_delete,
            to_create,
            unchanged,
        }
    }

    /// `true` when applying the plan would not touch the remote side.
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty()
    }
}

/// Outcome of one attachment decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentResult {
    /// Stale remote attachment removed.
    Deleted {
        name: String,
        fingerprint: Fingerprint,
        target: AttachmentHref,
    },
    /// `--dry-run`: the attachment *would* have been removed.
    WouldDelete {
        name: String,
        fingerprint: Fingerprint,
        target: AttachmentHref,
    },
    /// Local content uploaded.
    Uploaded { name: String, fingerprint: Fingerprint },
    /// `--dry-run`: the content *would* have been uploaded.
    WouldUpload { name: String, fingerprint: Fingerprint },
    /// Content already present remotely.
    Unchanged {
        name: String,
        remote_name: String,
        fingerprint: Fingerprint,
    },
}

/// Apply `plan` against the script `remote` was listed under.
///
/// Every upload is read into memory and checked against its planned
/// fingerprint first, so a file edited since it was hashed fails the script
/// before any remote mutation. Then deletes, then uploads, then unchanged
/// entries. In dry-run mode no gateway call is issued and no attachment file
/// is opened.
pub fn execute<G: ScriptGateway + ?Sized>(
    gateway: &G,
    remote: &RemoteSnapshot,
    plan: &ReconcilePlan,
    dry_run: bool,
) -> Result<Vec<AttachmentResult>, SyncError> {
    let script = remote.script();
    let mut results = Vec::with_capacity(
        plan.to_delete.len() + plan.to_create.len() + plan.unchanged.len(),
    );

    let staged = if dry_run {
        Vec::new()
    } else {
        plan.to_create
            .iter()
            .map(|fresh| Ok((fresh, read_verified(fresh)?)))
            .collect::<Result<Vec<_>, SyncError>>()?
    };

    for stale in &plan.to_delete {
        let target = stale.delete_target(script);
        let name = stale.name.clone();
        let fingerprint = stale.digest;
        if dry_run {
            tracing::info!("[dry-run] would delete attachment '{name}' ({fingerprint})");
            results.push(AttachmentResult::WouldDelete {
                name,
                fingerprint,
                target,
            });
            continue;
        }

        tracing::info!(%target, "deleting attachment '{name}' ({fingerprint})");
        gateway.delete_attachment(&target).map_err(remote_err(
            "delete attachment",
            format_args!("'{name}' ({fingerprint}) at {target}"),
        ))?;
        results.push(AttachmentResult::Deleted {
            name,
            fingerprint,
            target,
        });
    }

    if dry_run {
        for fresh in &plan.to_create {
            let name = fresh.upload_name().to_string();
            let fingerprint = fresh.fingerprint;
            tracing::info!("[dry-run] would upload attachment '{name}' ({fingerprint})");
            results.push(AttachmentResult::WouldUpload { name, fingerprint });
        }
    }

    for (fresh, bytes) in &staged {
        let name = fresh.upload_name().to_string();
        let fingerprint = fresh.fingerprint;
        tracing::info!(%script, "uploading attachment '{name}' ({fingerprint})");
        gateway
            .create_attachment(script, &name, &mut bytes.as_slice())
            .map_err(remote_err(
                "upload attachment",
                format_args!("'{name}' ({fingerprint}) to {script}"),
            ))?;
        results.push(AttachmentResult::Uploaded { name, fingerprint });
    }

    for kept in &plan.unchanged {
        tracing::debug!(
            "attachment '{}' already uploaded with md5 {}",
            kept.local.filename,
            kept.local.fingerprint
        );
        results.push(AttachmentResult::Unchanged {
            name: kept.local.filename.clone(),
            remote_name: kept.remote_name.clone(),
            fingerprint: kept.local.fingerprint,
        });
    }

    Ok(results)
}

/// Read an attachment whole and confirm it still has its planned fingerprint.
fn read_verified(fresh: &LocalAttachment) -> Result<Vec<u8>, SyncError> {
    let bytes = fs::read(&fresh.path).map_err(|source| SyncError::AttachmentUnreadable {
        name: fresh.filename.clone(),
        path: fresh.path.clone(),
        source,
    })?;
    let actual = fingerprint_bytes(&bytes);
    if actual != fresh.fingerprint {
        return Err(SyncError::AttachmentChanged {
            name: fresh.filename.clone(),
            path: fresh.path.clone(),
            expected: fresh.fingerprint,
            actual,
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rightst_core::{AttachmentId, ScriptHref};
    use std::path::PathBuf;

    fn fp(n: u8) -> Fingerprint {
        Fingerprint::from_bytes([n; 16])
    }

    fn local(name: &str, n: u8) -> LocalAttachment {
        LocalAttachment {
            filename: name.into(),
            path: PathBuf::from(name),
            fingerprint: fp(n),
        }
    }

    fn remote(id: &str, name: &str, n: u8) -> RemoteAttachment {
        RemoteAttachment {
            id: AttachmentId(id.into()),
            name: name.into(),
            digest: fp(n),
            links: vec![],
        }
    }

    #[test]
    fn mixed_scenario() {
        let local = HashIndex::from_attachments([local("a.sh", 1), local("b.sh", 2)]);
        let remote = RemoteSnapshot::new(
            ScriptHref::from_id("1"),
            [remote("10", "a.sh", 1), remote("11", "old.sh", 3)],
        );

        let plan = ReconcilePlan::compute(&local, &remote);
        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_delete[0].digest, fp(3));
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].filename, "b.sh");
        assert_eq!(plan.unchanged.len(), 1);
        assert_eq!(plan.unchanged[0].local.fingerprint, fp(1));
        assert!(!plan.is_noop());
    }

    #[test]
    fn renamed_file_with_same_content_is_not_corrected() {
        let local = HashIndex::from_attachments([local("new-name.sh", 1)]);
        let remote =
            RemoteSnapshot::new(ScriptHref::from_id("1"), [remote("10", "old-name.sh", 1)]);

        let plan = ReconcilePlan::compute(&local, &remote);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged[0].remote_name, "old-name.sh");
    }

    #[test]
    fn empty_local_deletes_everything() {
        let remote = RemoteSnapshot::new(
            ScriptHref::from_id("1"),
            [remote("10", "a.sh", 1), remote("11", "b.sh", 2)],
        );
        let plan = ReconcilePlan::compute(&HashIndex::default(), &remote);
        assert_eq!(plan.to_delete.len(), 2);
        assert!(plan.to_create.is_empty());
    }
}
