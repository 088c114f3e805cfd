//! JSON payloads of the 1.5 API and their conversion to core types.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use rightst_core::{
    AttachmentId, Fingerprint, GatewayError, Link, RemoteAttachment, ScriptHref, ScriptSummary,
};

#[derive(Debug, Deserialize)]
pub(crate) struct WireLink {
    pub rel: String,
    pub href: String,
}

/// Ids arrive as numbers from most endpoints and as strings from a few.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireScript {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub revision: u32,
    #[serde(default)]
    pub links: Vec<WireLink>,
}

impl WireScript {
    pub fn into_summary(self) -> Result<ScriptSummary, GatewayError> {
        let href = self
            .links
            .iter()
            .find(|l| l.rel == "self")
            .map(|l| ScriptHref(l.href.clone()))
            .ok_or_else(|| {
                GatewayError::Protocol(format!("script '{}' has no self link", self.name))
            })?;
        Ok(ScriptSummary {
            href,
            name: self.name,
            description: self.description.unwrap_or_default(),
            revision: self.revision,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAttachment {
    pub id: WireId,
    pub name: String,
    pub digest: String,
    #[serde(default)]
    pub links: Vec<WireLink>,
}

impl WireAttachment {
    pub fn into_attachment(self) -> Result<RemoteAttachment, GatewayError> {
        let digest: Fingerprint = self
            .digest
            .parse()
            .map_err(|e| GatewayError::Protocol(format!("attachment '{}': {e}", self.name)))?;
        Ok(RemoteAttachment {
            id: AttachmentId(self.id.into_string()),
            name: self.name,
            digest,
            links: self
                .links
                .into_iter()
                .map(|l| Link {
                    rel: l.rel,
                    href: l.href,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToken {
    pub access_token: String,
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body)
        .map_err(|e| GatewayError::Protocol(format!("cannot decode {what}: {e}")))
}

pub(crate) fn decode_scripts(body: &str) -> Result<Vec<ScriptSummary>, GatewayError> {
    decode::<Vec<WireScript>>(body, "script list")?
        .into_iter()
        .map(WireScript::into_summary)
        .collect()
}

pub(crate) fn decode_attachments(body: &str) -> Result<Vec<RemoteAttachment>, GatewayError> {
    decode::<Vec<WireAttachment>>(body, "attachment list")?
        .into_iter()
        .map(WireAttachment::into_attachment)
        .collect()
}
