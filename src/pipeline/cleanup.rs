use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CodeSignerError;

const LOGS_DIR_NAME: &str = "logs";

/// `dirname(command)/logs`, taken from the whole command string.
///
/// The directory part is everything before the last path separator anywhere
/// in the line, arguments included. This only approximates the tool's working
/// directory; it is kept as-is because changing it moves the cleanup target.
pub fn logs_dir_for(command: &str) -> PathBuf {
    let dir = match Path::new(command).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    dir.join(LOGS_DIR_NAME)
}

/// Force-remove `dir`: directories recursively, anything else (a file or
/// symlink at the derived path) as a single entry. A missing path is a no-op.
pub async fn remove_logs_dir(dir: &Path) -> Result<(), CodeSignerError> {
    let removed = match tokio::fs::symlink_metadata(dir).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(dir).await,
        Ok(_) => tokio::fs::remove_file(dir).await,
        Err(e) => Err(e),
    };
    match removed {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %dir.display(), "logs folder already absent");
        }
        Err(source) => {
            return Err(CodeSignerError::Cleanup {
                path: dir.display().to_string(),
                source,
            });
        }
    }
    tracing::info!("CodeSigner logs folder is deleted: {}", dir.display());
    Ok(())
}
