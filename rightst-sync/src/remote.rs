//! Read-only remote lookups behind `list`, `show` and `download`.

use std::path::{Path, PathBuf};

use rightst_core::{RemoteAttachment, ScriptGateway, ScriptHref, ScriptSummary};

use crate::error::{io_err, remote_err, SyncError};
use crate::upsert::resolve_name_or_href;
use crate::writer::write_atomic;

/// Downloaded scripts are written executable.
pub const DOWNLOAD_MODE: u32 = 0o755;

/// A script and its current attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDetails {
    pub script: ScriptSummary,
    pub attachments: Vec<RemoteAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub href: ScriptHref,
    pub name: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Scripts whose name matches `filter`, as reported by the gateway.
pub fn list<G: ScriptGateway + ?Sized>(
    gateway: &G,
    filter: &str,
) -> Result<Vec<ScriptSummary>, SyncError> {
    gateway
        .list_scripts(filter)
        .map_err(remote_err("list scripts", format_args!("filter '{filter}'")))
}

/// Look up `<name_or_href>` and fetch its attachments.
pub fn show<G: ScriptGateway + ?Sized>(
    gateway: &G,
    name_or_href: &str,
) -> Result<ScriptDetails, SyncError> {
    let href = resolve_name_or_href(gateway, name_or_href)?;
    let script = gateway
        .get_script(&href)
        .map_err(remote_err("show script", &href))?;
    let attachments = gateway
        .list_attachments(&href)
        .map_err(remote_err("list attachments", &href))?;
    Ok(ScriptDetails {
        script,
        attachments,
    })
}

/// Fetch the source of `<name_or_href>` and write it to `dest`, or to a file
/// in the current directory named after the script.
///
/// Missing parent directories are created for an explicit `dest` only.
pub fn download<G: ScriptGateway + ?Sized>(
    gateway: &G,
    name_or_href: &str,
    dest: Option<&Path>,
) -> Result<Download, SyncError> {
    let href = resolve_name_or_href(gateway, name_or_href)?;
    let script = gateway
        .get_script(&href)
        .map_err(remote_err("show script", &href))?;
    let source = gateway
        .fetch_source(&href)
        .map_err(remote_err("fetch source", &href))?;

    let path = match dest {
        Some(dest) => {
            if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            dest.to_path_buf()
        }
        None => PathBuf::from(download_file_name(&script.name)?),
    };
    write_atomic(&path, &source, Some(DOWNLOAD_MODE))?;
    tracing::info!(%href, "downloaded '{}' to {}", script.name, path.display());

    Ok(Download {
        href,
        name: script.name,
        path,
        bytes: source.len(),
    })
}

/// Single-component file name for a script downloaded without a destination.
///
/// Path separators become `_`; names that still cannot be a plain file in
/// the current directory are rejected.
pub fn download_file_name(script_name: &str) -> Result<String, SyncError> {
    let file_name = script_name.replace(['/', '\\'], "_");
    let file_name = file_name.trim();
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return Err(SyncError::InvalidFileName {
            name: script_name.to_string(),
        });
    }
    Ok(file_name.to_string())
}
