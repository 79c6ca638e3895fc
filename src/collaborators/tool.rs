use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ToolLocation, ToolSetup};
use crate::config::ENV_TOOL_PATH;
use crate::error::CodeSignerError;

#[cfg(windows)]
const DEFAULT_TOOL: &str = "CodeSignTool.bat";
#[cfg(not(windows))]
const DEFAULT_TOOL: &str = "CodeSignTool.sh";

/// Uses a CodeSignTool that an earlier step already unpacked.
pub struct PreinstalledTool {
    path: PathBuf,
}

impl PreinstalledTool {
    /// `configured` wins; otherwise the platform launcher in `fallback_dir`.
    pub fn new(configured: Option<PathBuf>, fallback_dir: &Path) -> Self {
        let path = configured.unwrap_or_else(|| fallback_dir.join(DEFAULT_TOOL));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ToolSetup for PreinstalledTool {
    async fn setup(&self) -> Result<ToolLocation, CodeSignerError> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            CodeSignerError::ToolSetup(format!(
                "CodeSignTool not found at {}: {e}. Set {ENV_TOOL_PATH} to the launcher script.",
                self.path.display()
            ))
        })?;
        if !metadata.is_file() {
            return Err(CodeSignerError::ToolSetup(format!(
                "CodeSignTool path {} is not a file",
                self.path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = metadata.permissions();
            if perms.mode() & 0o111 == 0 {
                perms.set_mode(perms.mode() | 0o755);
                tokio::fs::set_permissions(&self.path, perms).await.map_err(|e| {
                    CodeSignerError::ToolSetup(format!(
                        "cannot make {} executable: {e}",
                        self.path.display()
                    ))
                })?;
            }
        }

        let location = ToolLocation::new(self.path.display().to_string());
        tracing::info!(path = %location, "CodeSignTool ready");
        Ok(location)
    }
}
