//! Backup-then-write for rewritten files.
//!
//! The original is copied to `<path><suffix>` first. The new content goes to a
//! temporary file in the same directory which is then renamed over the
//! original, so an interruption leaves either the old or the new file in
//! place, never a truncated one.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while writing a rewritten file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The backup copy could not be made; the original is untouched.
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        /// File being rewritten.
        path: PathBuf,
        /// Backup destination.
        backup: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The temporary file could not be created or written.
    #[error("failed to stage new content for {path}: {source}")]
    Stage {
        /// File being rewritten.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The temporary file could not replace the original.
    #[error("failed to replace {path}: {source}")]
    Persist {
        /// File being rewritten.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Path of the backup for `path`: the suffix appended to the full file name.
#[must_use]
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Backs up `path` and atomically replaces it with `content`.
///
/// Returns the backup path.
///
/// # Errors
///
/// Returns an error if the backup, staging or rename fails. When the backup
/// fails nothing has been written.
pub fn write_with_backup(path: &Path, content: &str, suffix: &str) -> Result<PathBuf, WriteError> {
    let backup = backup_path(path, suffix);
    fs::copy(path, &backup).map_err(|source| WriteError::Backup {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;

    let stage_err = |source| WriteError::Stage {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(stage_err)?;
    staged.write_all(content.as_bytes()).map_err(stage_err)?;
    staged.as_file().sync_all().map_err(stage_err)?;
    if let Ok(metadata) = fs::metadata(path) {
        if let Err(e) = staged.as_file().set_permissions(metadata.permissions()) {
            warn!(path = %path.display(), error = %e, "Could not carry over permissions");
        }
    }

    staged.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    debug!(path = %path.display(), backup = %backup.display(), "File rewritten");
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("pkg/iface.py"), ".bak"),
            PathBuf::from("pkg/iface.py.bak")
        );
    }

    #[test]
    fn writes_after_backup() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("iface.py");
        fs::write(&file, "old\n").expect("Failed to write");

        let backup = write_with_backup(&file, "new\n", ".bak").expect("write");

        assert_eq!(fs::read_to_string(&file).expect("read"), "new\n");
        assert_eq!(fs::read_to_string(&backup).expect("read backup"), "old\n");
        let leftovers = fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn missing_file_fails_before_writing() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = dir.path().join("gone.py");
        let err = write_with_backup(&file, "new\n", ".bak").expect_err("no original");
        assert!(matches!(err, WriteError::Backup { .. }));
        assert!(!file.exists());
    }
}
