//! Blocking HTTP client for the RightScale 1.5 API.
//!
//! Every request carries `X-API-Version`, `X-Account` and a bearer token
//! obtained once at [`ApiClient::login`]. The agent holds the per-request
//! timeout; nothing above this layer retries.

use std::io::Read;
use std::time::Duration;

use rightst_core::config::Environment;
use rightst_core::types::SCRIPTS_COLLECTION;
use rightst_core::{
    AttachmentHref, GatewayError, RemoteAttachment, ScriptFields, ScriptGateway, ScriptHref,
    ScriptSummary,
};

use crate::multipart::Multipart;
use crate::wire::{self, WireScript, WireToken};

pub const API_VERSION: &str = "1.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const OAUTH_PATH: &str = "/api/oauth2";

pub struct ApiClient {
    agent: ureq::Agent,
    base: String,
    account: u64,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Exchange the environment's refresh token for an access token.
    pub fn login(env: &Environment) -> Result<Self, GatewayError> {
        Self::login_at(&format!("https://{}", env.host), env.account, &env.refresh_token)
    }

    /// Like [`ApiClient::login`] against an explicit base URL.
    pub fn login_at(base: &str, account: u64, refresh_token: &str) -> Result<Self, GatewayError> {
        let agent = build_agent();
        let base = base.trim_end_matches('/').to_string();
        tracing::debug!("authenticating against {base}");

        let response = agent
            .post(&format!("{base}{OAUTH_PATH}"))
            .set("X-API-Version", API_VERSION)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .map_err(map_ureq_err)?;
        let token: WireToken = wire::decode(&read_body(response)?, "oauth2 token")?;

        Ok(Self::with_agent(agent, base, account, token.access_token))
    }

    /// A client that already holds an access token.
    pub fn with_token(base: &str, account: u64, token: impl Into<String>) -> Self {
        Self::with_agent(
            build_agent(),
            base.trim_end_matches('/').to_string(),
            account,
            token.into(),
        )
    }

    fn with_agent(agent: ureq::Agent, base: String, account: u64, token: String) -> Self {
        Self {
            agent,
            base,
            account,
            token,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        tracing::debug!("{method} {path}");
        self.agent
            .request(method, &format!("{}{path}", self.base))
            .set("X-API-Version", API_VERSION)
            .set("X-Account", &self.account.to_string())
            .set("Authorization", &format!("Bearer {}", self.token))
    }

    /// Strip our own base off an absolute `Location` header.
    fn relative_href(&self, location: &str) -> String {
        location
            .strip_prefix(&self.base)
            .unwrap_or(location)
            .to_string()
    }
}

fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(concat!("right_st/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn map_ureq_err(err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(status, response) => GatewayError::Status {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => GatewayError::Transport(transport.to_string()),
    }
}

fn read_body(response: ureq::Response) -> Result<String, GatewayError> {
    response
        .into_string()
        .map_err(|e| GatewayError::Transport(format!("reading response body: {e}")))
}

fn script_form(fields: &ScriptFields) -> [(&'static str, String); 3] {
    [
        ("right_script[name]", fields.name.to_string()),
        ("right_script[description]", fields.description.clone()),
        (
            "right_script[source]",
            String::from_utf8_lossy(&fields.source).into_owned(),
        ),
    ]
}

fn send_script_form(
    request: ureq::Request,
    fields: &ScriptFields,
) -> Result<ureq::Response, GatewayError> {
    let form = script_form(fields);
    let pairs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();
    request.send_form(&pairs).map_err(map_ureq_err)
}

impl ScriptGateway for ApiClient {
    fn list_scripts(&self, name_filter: &str) -> Result<Vec<ScriptSummary>, GatewayError> {
        let response = self
            .request("GET", SCRIPTS_COLLECTION)
            .query("filter[]", &format!("name=={name_filter}"))
            .call()
            .map_err(map_ureq_err)?;
        wire::decode_scripts(&read_body(response)?)
    }

    fn get_script(&self, script: &ScriptHref) -> Result<ScriptSummary, GatewayError> {
        let response = self
            .request("GET", &script.0)
            .call()
            .map_err(map_ureq_err)?;
        wire::decode::<WireScript>(&read_body(response)?, "script")?.into_summary()
    }

    fn create_script(&self, fields: &ScriptFields) -> Result<ScriptHref, GatewayError> {
        let response = send_script_form(self.request("POST", SCRIPTS_COLLECTION), fields)?;
        let location = response.header("Location").ok_or_else(|| {
            GatewayError::Protocol("create script response has no Location header".into())
        })?;
        Ok(ScriptHref(self.relative_href(location)))
    }

    fn update_script(
        &self,
        script: &ScriptHref,
        fields: &ScriptFields,
    ) -> Result<(), GatewayError> {
        send_script_form(self.request("PUT", &script.0), fields)?;
        Ok(())
    }

    fn fetch_source(&self, script: &ScriptHref) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .request("GET", &script.source())
            .call()
            .map_err(map_ureq_err)?;
        let mut source = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut source)
            .map_err(|e| GatewayError::Transport(format!("reading script source: {e}")))?;
        Ok(source)
    }

    fn list_attachments(
        &self,
        script: &ScriptHref,
    ) -> Result<Vec<RemoteAttachment>, GatewayError> {
        let response = self
            .request("GET", &script.attachments())
            .call()
            .map_err(map_ureq_err)?;
        wire::decode_attachments(&read_body(response)?)
    }

    fn delete_attachment(&self, target: &AttachmentHref) -> Result<(), GatewayError> {
        self.request("DELETE", &target.0)
            .call()
            .map_err(map_ureq_err)?;
        Ok(())
    }

    fn create_attachment(
        &self,
        script: &ScriptHref,
        name: &str,
        content: &mut dyn Read,
    ) -> Result<(), GatewayError> {
        let form = Multipart::new()
            .text("right_script_attachment[name]", name)
            .file("right_script_attachment[content]", name, content)
            .map_err(|e| GatewayError::Transport(format!("reading attachment '{name}': {e}")))?;
        let content_type = form.content_type();
        self.request("POST", &script.attachments())
            .set("Content-Type", &content_type)
            .send_bytes(&form.finish())
            .map_err(map_ureq_err)?;
        Ok(())
    }
}
