//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt the target on failure.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SealerError;

/// Read a whole file, returning an error if it doesn't exist
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, SealerError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SealerError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }

    fs::read(path)
        .map_err(|e| SealerError::Storage(format!("Failed to read {}: {}", path.display(), e)))
}

/// Sibling path used while writing `path`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Follow a symlink so the rename replaces its target, not the link
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all. An existing
/// file keeps its permissions, and a symlink keeps pointing at the rewritten
/// file.
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<(), SealerError> {
    let target = resolve_target(path.as_ref());
    let path = target.as_path();
    let permissions = fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.permissions());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SealerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, contents)
        .and_then(|_| match permissions {
            Some(permissions) => fs::set_permissions(&temp_path, permissions).map_err(|e| {
                SealerError::Storage(format!("Failed to copy file permissions: {}", e))
            }),
            None => Ok(()),
        })
        .and_then(|_| {
            fs::rename(&temp_path, path)
                .map_err(|e| SealerError::Storage(format!("Failed to rename temp file: {}", e)))
        });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(temp_path: &Path, contents: &[u8]) -> Result<(), SealerError> {
    let file = File::create(temp_path)
        .map_err(|e| SealerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|_| writer.flush())
        .map_err(|e| SealerError::Storage(format!("Failed to write data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| SealerError::Storage(format!("Failed to sync data: {}", e)))
}
