//! Script upsert: decide between create and update by exact name at head
//! revision.
//!
//! The gateway's name filter may match partially, so every candidate is
//! re-checked for exact name equality and head revision. More than one
//! survivor is an [`SyncError::AmbiguousTarget`]; nothing is ever picked
//! silently.

use rightst_core::{ScriptFields, ScriptGateway, ScriptHref, ScriptName, ScriptSummary};

use crate::error::{remote_err, SyncError};

/// Result of the resolve step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No head-revision script carries the name.
    Create,
    /// Exactly one head-revision script carries the name.
    Update(ScriptHref),
}

/// What the upsert did (or would do, in dry-run mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(ScriptHref),
    Updated(ScriptHref),
    WouldCreate,
    WouldUpdate(ScriptHref),
}

impl UpsertOutcome {
    /// The remote handle, if the script exists (or now exists) remotely.
    pub fn href(&self) -> Option<&ScriptHref> {
        match self {
            UpsertOutcome::Created(href)
            | UpsertOutcome::Updated(href)
            | UpsertOutcome::WouldUpdate(href) => Some(href),
            UpsertOutcome::WouldCreate => None,
        }
    }
}

/// The single head-revision script named exactly `name`, if any.
pub fn find_head<G: ScriptGateway + ?Sized>(
    gateway: &G,
    name: &str,
) -> Result<Option<ScriptSummary>, SyncError> {
    let candidates = gateway
        .list_scripts(name)
        .map_err(remote_err("list scripts", format_args!("name '{name}'")))?;

    let mut matches: Vec<ScriptSummary> = candidates
        .into_iter()
        .filter(|s| s.name == name && s.is_head())
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(SyncError::AmbiguousTarget {
            name: name.to_string(),
            candidates: matches.into_iter().map(|s| s.href).collect(),
        }),
    }
}

/// Resolve step of the upsert state machine.
pub fn resolve<G: ScriptGateway + ?Sized>(
    gateway: &G,
    name: &ScriptName,
) -> Result<Resolution, SyncError> {
    Ok(match find_head(gateway, name.as_str())? {
        Some(existing) => Resolution::Update(existing.href),
        None => Resolution::Create,
    })
}

/// Resolve a user-supplied `<name_or_href>`.
///
/// Numeric ids and `/api/right_scripts/<id>` hrefs are taken as is; anything
/// else is looked up by exact name at head revision.
pub fn resolve_name_or_href<G: ScriptGateway + ?Sized>(
    gateway: &G,
    param: &str,
) -> Result<ScriptHref, SyncError> {
    if let Some(href) = ScriptHref::parse(param) {
        return Ok(href);
    }
    find_head(gateway, param)?
        .map(|s| s.href)
        .ok_or_else(|| SyncError::NotFound {
            query: param.to_string(),
        })
}

/// Create or update the script described by `fields`.
///
/// In dry-run mode only the resolve step talks to the gateway.
pub fn upsert<G: ScriptGateway + ?Sized>(
    gateway: &G,
    fields: &ScriptFields,
    dry_run: bool,
) -> Result<UpsertOutcome, SyncError> {
    let resolution = resolve(gateway, &fields.name)?;
    let name = &fields.name;

    match (resolution, dry_run) {
        (Resolution::Create, true) => Ok(UpsertOutcome::WouldCreate),
        (Resolution::Update(href), true) => Ok(UpsertOutcome::WouldUpdate(href)),
        (Resolution::Create, false) => {
            let href = gateway
                .create_script(fields)
                .map_err(remote_err("create script", format_args!("'{name}'")))?;
            tracing::info!(%href, "created script '{name}'");
            Ok(UpsertOutcome::Created(href))
        }
        (Resolution::Update(href), false) => {
            gateway
                .update_script(&href, fields)
                .map_err(remote_err("update script", format_args!("'{name}' at {href}")))?;
            tracing::info!(%href, "updated script '{name}'");
            Ok(UpsertOutcome::Updated(href))
        }
    }
}
