//! File system utilities for gearshift.
//!
//! Reads are size-limited; writes go through a temp file in the target
//! directory and an atomic rename so readers never observe a partial file.

pub mod error;
pub mod nonblocking;
pub mod path;
pub mod policy;

pub use error::{FsError, Result};
pub use policy::OutputPolicy;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Default read ceiling (10 MiB).
pub const DEFAULT_MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Size and modification time of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Stat a file.
pub fn stat(path: impl AsRef<Path>) -> Result<FileInfo> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat", path, e))?;
    Ok(FileInfo {
        size: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: u64) -> Result<String> {
    let path = path.as_ref();
    let info = stat(path)?;

    if info.size > max_size {
        return Err(FsError::TooLarge {
            path: path.to_path_buf(),
            size: info.size,
            limit: max_size,
        });
    }

    fs::read_to_string(path).map_err(|e| FsError::from_io("read", path, e))
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);
    ensure_dir(&parent)?;

    let temp_path = temp_path_for(path);
    debug!(target = %path.display(), temp = %temp_path.display(), bytes = contents.len(), "atomic write");

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(FsError::from_io("write", &temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        warn!(target = %path.display(), error = %e, "rename failed, removing temp file");
        let _ = fs::remove_file(&temp_path);
        return Err(FsError::from_io("rename", path, e));
    }

    Ok(())
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| FsError::from_io("create directory", path, e))?;
    }
    Ok(())
}

/// Get the file extension, lowercased.
pub fn extension(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Temp sibling `.{name}.{uuid}.tmp`; unique per write so concurrent
/// writers never share a temp file.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gearshift".to_string());
    parent_dir(path).join(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}
