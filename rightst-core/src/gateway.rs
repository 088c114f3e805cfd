//! The remote script gateway: the only way the sync engine reaches the
//! remote platform.
//!
//! Implementations own transport, authentication and timeouts. Every call is
//! synchronous; any error is fatal to the script being processed.

use std::io::Read;

use crate::error::GatewayError;
use crate::types::{AttachmentHref, RemoteAttachment, ScriptFields, ScriptHref, ScriptSummary};

pub trait ScriptGateway {
    /// Scripts whose name matches `name_filter`. The match may be partial;
    /// callers re-check for exact equality.
    fn list_scripts(&self, name_filter: &str) -> Result<Vec<ScriptSummary>, GatewayError>;

    fn get_script(&self, script: &ScriptHref) -> Result<ScriptSummary, GatewayError>;

    fn create_script(&self, fields: &ScriptFields) -> Result<ScriptHref, GatewayError>;

    fn update_script(&self, script: &ScriptHref, fields: &ScriptFields)
        -> Result<(), GatewayError>;

    fn fetch_source(&self, script: &ScriptHref) -> Result<Vec<u8>, GatewayError>;

    /// Full attachment set of `script` in one call.
    fn list_attachments(&self, script: &ScriptHref)
        -> Result<Vec<RemoteAttachment>, GatewayError>;

    fn delete_attachment(&self, target: &AttachmentHref) -> Result<(), GatewayError>;

    /// Upload `content` as a new attachment of `script` named `name`.
    fn create_attachment(
        &self,
        script: &ScriptHref,
        name: &str,
        content: &mut dyn Read,
    ) -> Result<(), GatewayError>;
}
