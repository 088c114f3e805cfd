//! In-memory `ScriptGateway` that records every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rightst_core::{
    AttachmentHref, AttachmentId, Fingerprint, GatewayError, Link, RemoteAttachment,
    ScriptFields, ScriptGateway, ScriptHref, ScriptSummary,
};
use rightst_sync::hash_index::fingerprint_reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListScripts(String),
    GetScript(ScriptHref),
    CreateScript(String),
    UpdateScript(ScriptHref),
    FetchSource(ScriptHref),
    ListAttachments(ScriptHref),
    DeleteAttachment(AttachmentHref),
    CreateAttachment {
        script: ScriptHref,
        name: String,
        digest: Fingerprint,
    },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateScript(_)
                | Call::UpdateScript(_)
                | Call::DeleteAttachment(_)
                | Call::CreateAttachment { .. }
        )
    }
}

struct StoredScript {
    summary: ScriptSummary,
    source: Vec<u8>,
    attachments: Vec<RemoteAttachment>,
}

#[derive(Default)]
struct State {
    scripts: Vec<StoredScript>,
    next_id: u32,
    calls: Vec<Call>,
    fail_when: Option<fn(&Call) -> bool>,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: RefCell<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote script; returns its href.
    pub fn seed_script(&self, name: &str, revision: u32) -> ScriptHref {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let href = ScriptHref::from_id(&state.next_id.to_string());
        state.scripts.push(StoredScript {
            summary: ScriptSummary {
                href: href.clone(),
                name: name.to_string(),
                description: String::new(),
                revision,
            },
            source: Vec::new(),
            attachments: Vec::new(),
        });
        href
    }

    /// Seed a remote attachment with `content`; returns its digest.
    pub fn seed_attachment(&self, script: &ScriptHref, name: &str, content: &[u8]) -> Fingerprint {
        let digest = fingerprint_reader(&mut &content[..]).expect("hash");
        self.store_attachment(script, name, digest);
        digest
    }

    /// Current remote attachments of `script`.
    pub fn attachments(&self, script: &ScriptHref) -> Vec<RemoteAttachment> {
        let state = self.state.borrow();
        state
            .scripts
            .iter()
            .find(|s| &s.summary.href == script)
            .map(|s| s.attachments.clone())
            .unwrap_or_default()
    }

    pub fn source(&self, script: &ScriptHref) -> Vec<u8> {
        let state = self.state.borrow();
        state
            .scripts
            .iter()
            .find(|s| &s.summary.href == script)
            .map(|s| s.source.clone())
            .unwrap_or_default()
    }

    pub fn script_count(&self) -> usize {
        self.state.borrow().scripts.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Make every call matching `predicate` fail with a 500.
    pub fn fail_when(&self, predicate: fn(&Call) -> bool) {
        self.state.borrow_mut().fail_when = Some(predicate);
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        let fail = state.fail_when.is_some_and(|p| p(&call));
        state.calls.push(call);
        if fail {
            return Err(GatewayError::Status {
                status: 500,
                body: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn store_attachment(&self, script: &ScriptHref, name: &str, digest: Fingerprint) {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id.to_string();
        let stored = state
            .scripts
            .iter_mut()
            .find(|s| &s.summary.href == script)
            .expect("attachment for unknown script");
        stored.attachments.push(RemoteAttachment {
            id: AttachmentId(id.clone()),
            name: name.to_string(),
            digest,
            links: vec![
                Link {
                    rel: "self".into(),
                    href: format!("/api/right_script_attachments/{id}"),
                },
                Link {
                    rel: "right_script".into(),
                    href: script.0.clone(),
                },
            ],
        });
    }

    fn not_found(what: impl std::fmt::Display) -> GatewayError {
        GatewayError::Status {
            status: 404,
            body: format!("{what} not found"),
        }
    }
}

impl ScriptGateway for MemoryGateway {
    fn list_scripts(&self, name_filter: &str) -> Result<Vec<ScriptSummary>, GatewayError> {
        self.record(Call::ListScripts(name_filter.to_string()))?;
        let state = self.state.borrow();
        Ok(state
            .scripts
            .iter()
            .filter(|s| s.summary.name.contains(name_filter))
            .map(|s| s.summary.clone())
            .collect())
    }

    fn get_script(&self, script: &ScriptHref) -> Result<ScriptSummary, GatewayError> {
        self.record(Call::GetScript(script.clone()))?;
        let state = self.state.borrow();
        state
            .scripts
            .iter()
            .find(|s| &s.summary.href == script)
            .map(|s| s.summary.clone())
            .ok_or_else(|| Self::not_found(script))
    }

    fn create_script(&self, fields: &ScriptFields) -> Result<ScriptHref, GatewayError> {
        self.record(Call::CreateScript(fields.name.to_string()))?;
        let href = self.seed_script(fields.name.as_str(), 0);
        let mut state = self.state.borrow_mut();
        if let Some(stored) = state.scripts.iter_mut().find(|s| s.summary.href == href) {
            stored.summary.description = fields.description.clone();
            stored.source = fields.source.clone();
        }
        Ok(href)
    }

    fn update_script(&self, script: &ScriptHref, fields: &ScriptFields) -> Result<(), GatewayError> {
        self.record(Call::UpdateScript(script.clone()))?;
        let mut state = self.state.borrow_mut();
        let stored = state
            .scripts
            .iter_mut()
            .find(|s| &s.summary.href == script)
            .ok_or_else(|| Self::not_found(script))?;
        stored.summary.name = fields.name.to_string();
        stored.summary.description = fields.description.clone();
        stored.source = fields.source.clone();
        Ok(())
    }

    fn fetch_source(&self, script: &ScriptHref) -> Result<Vec<u8>, GatewayError> {
        self.record(Call::FetchSource(script.clone()))?;
        let state = self.state.borrow();
        state
            .scripts
            .iter()
            .find(|s| &s.summary.href == script)
            .map(|s| s.source.clone())
            .ok_or_else(|| Self::not_found(script))
    }

    fn list_attachments(&self, script: &ScriptHref) -> Result<Vec<RemoteAttachment>, GatewayError> {
        self.record(Call::ListAttachments(script.clone()))?;
        Ok(self.attachments(script))
    }

    fn delete_attachment(&self, target: &AttachmentHref) -> Result<(), GatewayError> {
        self.record(Call::DeleteAttachment(target.clone()))?;
        let mut state = self.state.borrow_mut();
        for stored in &mut state.scripts {
            let prefix = format!("{}/", stored.summary.href.attachments());
            let Some(id) = target.0.strip_prefix(&prefix) else {
                continue;
            };
            let before = stored.attachments.len();
            stored.attachments.retain(|a| a.id.0 != id);
            if stored.attachments.len() < before {
                return Ok(());
            }
        }
        Err(Self::not_found(target))
    }

    fn create_attachment(
        &self,
        script: &ScriptHref,
        name: &str,
        content: &mut dyn Read,
    ) -> Result<(), GatewayError> {
        let digest =
            fingerprint_reader(content).map_err(|e| GatewayError::Transport(e.to_string()))?;
        self.record(Call::CreateAttachment {
            script: script.clone(),
            name: name.to_string(),
            digest,
        })?;
        self.store_attachment(script, name, digest);
        Ok(())
    }
}

/// Write a script with a metadata block declaring `attachments`.
pub fn write_script(dir: &Path, file: &str, name: &str, attachments: &[&str]) -> PathBuf {
    let mut content = format!("#!/bin/bash\n# ---\n# RightScript Name: {name}\n# Attachments:\n");
    for a in attachments {
        content.push_str(&format!("#   - {a}\n"));
    }
    content.push_str("# ...\necho run\n");
    let path = dir.join(file);
    fs::write(&path, content).expect("write script");
    path
}
