//! Expand a mixed list of files and directories into a flat file list.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Files are kept in argument order; directories are expanded recursively
/// with entries sorted by name. Symlinks to files are followed, symlinks to
/// directories are not.
pub fn walk_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for path in paths {
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        if meta.is_dir() {
            walk_dir(path, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            walk_dir(&path, files)?;
        } else if file_type.is_file() || path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn expands_directories_sorted_and_recursive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("scripts/nested")).unwrap();
        fs::write(root.join("scripts/b.sh"), "").unwrap();
        fs::write(root.join("scripts/a.sh"), "").unwrap();
        fs::write(root.join("scripts/nested/c.sh"), "").unwrap();
        fs::write(root.join("single.sh"), "").unwrap();

        let files = walk_paths(&[root.join("single.sh"), root.join("scripts")]).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("single.sh"),
                root.join("scripts/a.sh"),
                root.join("scripts/b.sh"),
                root.join("scripts/nested/c.sh"),
            ]
        );
    }

    #[test]
    fn missing_path_is_io_error_with_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = walk_paths(&[missing.clone()]).unwrap_err();
        assert!(matches!(err, SyncError::Io { ref path, .. } if *path == missing));
    }
}
