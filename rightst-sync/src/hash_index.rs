//! Content hash index: MD5 fingerprints of a script's declared attachments.
//!
//! Fingerprints are computed fresh on every run by streaming each file
//! through the digest. Nothing is cached; a file either yields a complete
//! fingerprint or an [`SyncError::AttachmentUnreadable`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use rightst_core::Fingerprint;

use crate::error::SyncError;

/// A declared attachment resolved on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttachment {
    /// Name as declared in the metadata, relative to the script's directory.
    pub filename: String,
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
}

impl LocalAttachment {
    /// Name the attachment is uploaded as: the last component of the
    /// declared filename.
    pub fn upload_name(&self) -> &str {
        Path::new(&self.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.filename)
    }
}

/// Local attachments keyed by fingerprint.
///
/// Two declarations with identical content collapse into one entry; the
/// later declaration wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashIndex {
    entries: BTreeMap<Fingerprint, LocalAttachment>,
}

impl HashIndex {
    /// Resolve and fingerprint every declared attachment of the script at
    /// `script_path`.
    pub fn build(script_path: &Path, declared: &[String]) -> Result<Self, SyncError> {
        Ok(Self::from_attachments(hash_attachments(script_path, declared)?))
    }

    pub fn from_attachments(attachments: impl IntoIterator<Item = LocalAttachment>) -> Self {
        let mut entries = BTreeMap::new();
        for attachment in attachments {
            if let Some(previous) = entries.insert(attachment.fingerprint, attachment) {
                tracing::debug!(
                    filename = %previous.filename,
                    fingerprint = %previous.fingerprint,
                    "duplicate attachment content; later declaration wins"
                );
            }
        }
        Self { entries }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&LocalAttachment> {
        self.entries.get(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Entries in fingerprint order.
    pub fn iter(&self) -> impl Iterator<Item = &LocalAttachment> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fingerprint each declared attachment in declaration order, keeping
/// duplicates.
pub fn hash_attachments(
    script_path: &Path,
    declared: &[String],
) -> Result<Vec<LocalAttachment>, SyncError> {
    let dir = script_path.parent().unwrap_or_else(|| Path::new(""));
    declared
        .iter()
        .map(|filename| -> Result<LocalAttachment, SyncError> {
            let path = dir.join(filename);
            let fingerprint =
                fingerprint_file(&path).map_err(|source| SyncError::AttachmentUnreadable {
                    name: filename.clone(),
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(%filename, %fingerprint, "hashed attachment");
            Ok(LocalAttachment {
                filename: filename.clone(),
                path,
                fingerprint,
            })
        })
        .collect()
}

/// Stream a file through MD5. The file is closed before returning.
pub fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    let mut file = File::open(path)?;
    fingerprint_reader(&mut file)
}

/// Stream `reader` to EOF through MD5.
pub fn fingerprint_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Fingerprint> {
    let mut hasher = Md5::new();
    io::copy(reader, &mut hasher)?;
    Ok(finish(hasher))
}

/// MD5 of an in-memory buffer.
pub fn fingerprint_bytes(content: &[u8]) -> Fingerprint {
    let mut hasher = Md5::new();
    hasher.update(content);
    finish(hasher)
}

fn finish(hasher: Md5) -> Fingerprint {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hasher.finalize());
    Fingerprint::from_bytes(bytes)
}
