//! Domain types for scripts, attachments and their remote handles.
//!
//! Remote handles are hrefs (`/api/right_scripts/<id>`); they are opaque to
//! everything except the gateway implementation and [`ScriptHref::parse`].

use std::fmt;
use std::str::FromStr;

use crate::error::FingerprintError;

/// Collection href for all scripts on the remote platform.
pub const SCRIPTS_COLLECTION: &str = "/api/right_scripts";

/// Relation name, inside an attachment's link list, of its owning script.
pub const OWNING_SCRIPT_REL: &str = "right_script";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The identity key used to find a script remotely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScriptName(pub String);

impl ScriptName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ScriptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ScriptName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ScriptName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Resolved remote handle of a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptHref(pub String);

impl ScriptHref {
    /// `/api/right_scripts/<id>`
    pub fn from_id(id: &str) -> Self {
        Self(format!("{SCRIPTS_COLLECTION}/{id}"))
    }

    /// Interpret a user-supplied parameter as a script handle.
    ///
    /// Accepts a bare numeric id or a full `/api/right_scripts/<id>` href.
    /// Anything else is a name and yields `None`.
    pub fn parse(param: &str) -> Option<Self> {
        if is_numeric_id(param) {
            return Some(Self::from_id(param));
        }
        let id = param
            .strip_prefix(SCRIPTS_COLLECTION)
            .and_then(|rest| rest.strip_prefix('/'))?;
        is_numeric_id(id).then(|| Self(param.to_owned()))
    }

    /// `<href>/attachments`
    pub fn attachments(&self) -> String {
        format!("{}/attachments", self.0)
    }

    /// `<href>/source`
    pub fn source(&self) -> String {
        format!("{}/source", self.0)
    }
}

impl fmt::Display for ScriptHref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ScriptHref {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Remote identifier of an attachment (unique within its script).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentId(pub String);

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Address of a single attachment, used as the delete target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentHref(pub String);

impl fmt::Display for AttachmentHref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// 128-bit content digest. The join key between local and remote attachments.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    /// Parses a 32-character hex digest; case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|_| FingerprintError {
            value: s.to_owned(),
        })?;
        Ok(Self(bytes))
    }
}

// ---------------------------------------------------------------------------
// Remote state
// ---------------------------------------------------------------------------

/// One entry of a remote script listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSummary {
    pub href: ScriptHref,
    pub name: String,
    pub description: String,
    /// `0` is the head revision; committed revisions are numbered from 1.
    pub revision: u32,
}

impl ScriptSummary {
    pub fn is_head(&self) -> bool {
        self.revision == 0
    }

    /// `HEAD` or the revision number.
    pub fn revision_label(&self) -> String {
        if self.is_head() {
            "HEAD".to_string()
        } else {
            self.revision.to_string()
        }
    }
}

/// Fields sent on script create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFields {
    pub name: ScriptName,
    pub description: String,
    pub source: Vec<u8>,
}

/// A named relation of a remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// An attachment currently stored against a remote script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAttachment {
    pub id: AttachmentId,
    pub name: String,
    pub digest: Fingerprint,
    pub links: Vec<Link>,
}

impl RemoteAttachment {
    /// The owning script, taken from the attachment's `right_script` relation.
    ///
    /// The attachment's own `self` relation does not address it correctly on
    /// the remote API, so delete targets are derived from the owner instead.
    /// When several owner relations are present the last one wins.
    pub fn owning_script_handle(&self) -> Option<ScriptHref> {
        self.links
            .iter()
            .rev()
            .find(|link| link.rel == OWNING_SCRIPT_REL)
            .map(|link| ScriptHref(link.href.clone()))
    }

    /// `<owning script>/attachments/<id>`.
    ///
    /// `listed_under` is the script the snapshot was taken from; it is used
    /// when the attachment carries no owner relation.
    pub fn delete_target(&self, listed_under: &ScriptHref) -> AttachmentHref {
        let owner = self
            .owning_script_handle()
            .unwrap_or_else(|| listed_under.clone());
        AttachmentHref(format!("{}/{}", owner.attachments(), self.id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(links: Vec<Link>) -> RemoteAttachment {
        RemoteAttachment {
            id: AttachmentId("77".into()),
            name: "a.sh".into(),
            digest: Fingerprint::from_bytes([0xab; 16]),
            links,
        }
    }

    #[test]
    fn fingerprint_hex_roundtrip_is_lowercase() {
        let fp: Fingerprint = "D41D8CD98F00B204E9800998ECF8427E".parse().unwrap();
        assert_eq!(fp.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn fingerprint_rejects_wrong_length() {
        let err = "abc".parse::<Fingerprint>().unwrap_err();
        assert!(err.to_string().contains("\"abc\""));
        assert!("zz1d8cd98f00b204e9800998ecf8427e".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn href_parse_accepts_ids_and_hrefs_only() {
        assert_eq!(
            ScriptHref::parse("123"),
            Some(ScriptHref::from("/api/right_scripts/123"))
        );
        assert_eq!(
            ScriptHref::parse("/api/right_scripts/9"),
            Some(ScriptHref::from("/api/right_scripts/9"))
        );
        assert_eq!(ScriptHref::parse("/api/right_scripts/"), None);
        assert_eq!(ScriptHref::parse("/api/right_scripts/9/source"), None);
        assert_eq!(ScriptHref::parse("Install nginx"), None);
        assert_eq!(ScriptHref::parse(""), None);
    }

    #[test]
    fn delete_target_uses_owner_relation_not_self() {
        let a = attachment(vec![
            Link {
                rel: "self".into(),
                href: "/api/right_script_attachments/77".into(),
            },
            Link {
                rel: OWNING_SCRIPT_REL.into(),
                href: "/api/right_scripts/5".into(),
            },
        ]);
        assert_eq!(
            a.owning_script_handle(),
            Some(ScriptHref::from("/api/right_scripts/5"))
        );
        let target = a.delete_target(&ScriptHref::from("/api/right_scripts/1"));
        assert_eq!(target.0, "/api/right_scripts/5/attachments/77");
    }

    #[test]
    fn delete_target_falls_back_to_listing_script() {
        let a = attachment(vec![]);
        assert!(a.owning_script_handle().is_none());
        let target = a.delete_target(&ScriptHref::from("/api/right_scripts/1"));
        assert_eq!(target.0, "/api/right_scripts/1/attachments/77");
    }

    #[test]
    fn revision_label() {
        let mut s = ScriptSummary {
            href: ScriptHref::from_id("1"),
            name: "x".into(),
            description: String::new(),
            revision: 0,
        };
        assert_eq!(s.revision_label(), "HEAD");
        s.revision = 4;
        assert_eq!(s.revision_label(), "4");
        assert!(!s.is_head());
    }
}
