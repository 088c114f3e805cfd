//! Remote state snapshot: attachments currently stored against a script.

use std::collections::BTreeMap;

use rightst_core::{Fingerprint, RemoteAttachment, ScriptGateway, ScriptHref};

use crate::error::{remote_err, SyncError};

/// Remote attachments of one script keyed by digest.
///
/// When two remote attachments share a digest the later one in the listing
/// wins; the earlier one is invisible to reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    script: ScriptHref,
    entries: BTreeMap<Fingerprint, RemoteAttachment>,
}

impl RemoteSnapshot {
    pub fn new(script: ScriptHref, attachments: impl IntoIterator<Item = RemoteAttachment>) -> Self {
        let entries = attachments
            .into_iter()
            .map(|a| (a.digest, a))
            .collect::<BTreeMap<_, _>>();
        Self { script, entries }
    }

    /// List every attachment of `script` in a single gateway call.
    pub fn fetch<G: ScriptGateway + ?Sized>(
        gateway: &G,
        script: &ScriptHref,
    ) -> Result<Self, SyncError> {
        let attachments = gateway
            .list_attachments(script)
            .map_err(remote_err("list attachments", script))?;
        tracing::debug!(%script, count = attachments.len(), "fetched remote attachments");
        Ok(Self::new(script.clone(), attachments))
    }

    /// The script this snapshot was listed under.
    pub fn script(&self) -> &ScriptHref {
        &self.script
    }

    pub fn get(&self, digest: &Fingerprint) -> Option<&RemoteAttachment> {
        self.entries.get(digest)
    }

    pub fn contains(&self, digest: &Fingerprint) -> bool {
        self.entries.contains_key(digest)
    }

    /// Entries in digest order.
    pub fn iter(&self) -> impl Iterator<Item = &RemoteAttachment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rightst_core::AttachmentId;

    fn remote(id: &str, digest: u8) -> RemoteAttachment {
        RemoteAttachment {
            id: AttachmentId(id.into()),
            name: format!("{id}.sh"),
            digest: Fingerprint::from_bytes([digest; 16]),
            links: vec![],
        }
    }

    #[test]
    fn later_duplicate_digest_wins() {
        let snap = RemoteSnapshot::new(
            ScriptHref::from_id("1"),
            [remote("10", 1), remote("11", 1), remote("12", 2)],
        );
        assert_eq!(snap.len(), 2);
        let kept = snap.get(&Fingerprint::from_bytes([1; 16])).unwrap();
        assert_eq!(kept.id, AttachmentId("11".into()));
    }

    #[test]
    fn empty_listing() {
        let snap = RemoteSnapshot::new(ScriptHref::from_id("1"), Vec::new());
        assert!(snap.is_empty());
        assert_eq!(snap.script().0, "/api/right_scripts/1");
    }
}
