//! Async counterparts of the read and atomic-write helpers, on `tokio::fs`.

use crate::{parent_dir, temp_path_for, FileInfo, FsError, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Stat a file.
pub async fn stat(path: impl AsRef<Path>) -> Result<FileInfo> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| FsError::from_io("stat", path, e))?;
    Ok(FileInfo {
        size: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

/// Check whether a path exists.
pub async fn exists(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path.as_ref()).await.is_ok()
}

/// Read a file to string with size limit.
pub async fn read_to_string(path: impl AsRef<Path>, max_size: u64) -> Result<String> {
    let path = path.as_ref();
    let info = stat(path).await?;
    if info.size > max_size {
        return Err(FsError::TooLarge {
            path: path.to_path_buf(),
            size: info.size,
            limit: max_size,
        });
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FsError::from_io("read", path, e))
}

/// Write to a file atomically (write to temp, sync, rename).
pub async fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = parent_dir(path);
    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| FsError::from_io("create directory", &parent, e))?;

    let temp_path = temp_path_for(path);
    debug!(target = %path.display(), temp = %temp_path.display(), bytes = contents.len(), "atomic write");

    let written = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(FsError::from_io("write", &temp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        warn!(target = %path.display(), error = %e, "rename failed, removing temp file");
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(FsError::from_io("rename", path, e));
    }

    Ok(())
}

/// Write string to file atomically.
pub async fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes()).await
}
