//! Atomic local writes for `scaffold` and `download`.
//!
//! Write flow: content → `<path>.right_st.tmp` sibling → permissions →
//! `rename` onto the final path. The tmp file is removed if the rename fails,
//! leaving the original untouched.

use std::path::{Path, PathBuf};

use rightst_core::metadata;

use crate::error::{io_err, SyncError};

/// Outcome of scaffolding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldResult {
    /// A metadata block was inserted.
    Written { path: PathBuf },
    /// The file already carried a metadata block.
    Unchanged { path: PathBuf },
}

/// Atomically replace `path` with `content`.
///
/// `mode` sets unix permission bits; `None` keeps the existing file's
/// permissions (or the process default for a new file). The parent
/// directory must already exist.
pub fn write_atomic(path: &Path, content: &[u8], mode: Option<u32>) -> Result<(), SyncError> {
    let tmp = tmp_path(path);
    write_atomic_with_tmp(path, content, mode, &tmp)
}

fn write_atomic_with_tmp(
    path: &Path,
    content: &[u8],
    mode: Option<u32>,
    tmp: &Path,
) -> Result<(), SyncError> {
    let existing = std::fs::metadata(path).ok().map(|m| m.permissions());
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    let permissions = match mode {
        Some(mode) => permissions_from_mode(mode),
        None => existing,
    };
    if let Some(permissions) = permissions {
        if let Err(e) = std::fs::set_permissions(tmp, permissions) {
            let _ = std::fs::remove_file(tmp);
            return Err(io_err(tmp, e));
        }
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote: {}", path.display());
    Ok(())
}

/// Insert a metadata block into the script at `path` unless it has one.
///
/// The scaffolded name is the file name without its extension.
pub fn scaffold_file(path: &Path) -> Result<ScaffoldResult, SyncError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let name = file_stem(path);

    let scaffolded =
        metadata::scaffold(&content, &name).map_err(|source| SyncError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
    let Some(scaffolded) = scaffolded else {
        tracing::debug!("metadata already present: {}", path.display());
        return Ok(ScaffoldResult::Unchanged {
            path: path.to_path_buf(),
        });
    };

    write_atomic(path, scaffolded.as_bytes(), None)?;
    tracing::info!("added metadata to {}", path.display());
    Ok(ScaffoldResult::Written {
        path: path.to_path_buf(),
    })
}

/// File name without its extension: `setup.sh` → `setup`.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.right_st.tmp", path.display()))
}

#[cfg(unix)]
fn permissions_from_mode(mode: u32) -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn permissions_from_mode(_mode: u32) -> Option<std::fs::Permissions> {
    None
}
