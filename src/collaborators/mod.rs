pub mod java;
pub mod mapper;
pub mod scanner;
pub mod tool;

use async_trait::async_trait;

use crate::config::InvocationRequest;
use crate::error::CodeSignerError;
use crate::pipeline::command::Subcommand;

/// Where the signing executable lives after setup. Owned by the pipeline for
/// the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation(String);

impl ToolLocation {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Makes the signing tool available and reports where it is.
#[async_trait]
pub trait ToolSetup: Send + Sync {
    async fn setup(&self) -> Result<ToolLocation, CodeSignerError>;
}

/// Provides a Java runtime the signing tool can run on.
#[async_trait]
pub trait JavaProvisioner: Send + Sync {
    async fn provision(&self) -> Result<(), CodeSignerError>;
}

/// Maps the raw action token (plus named inputs) to the canonical subcommand.
/// Unknown actions must fail here, before anything is spawned.
pub trait InputMapper: Send + Sync {
    fn map(&self, request: &InvocationRequest) -> Result<Subcommand, CodeSignerError>;
}

/// Pre-signing malware scan. `Ok(false)` means the scan did not come back clean.
#[async_trait]
pub trait MalwareScanner: Send + Sync {
    async fn scan(&self, tool: &ToolLocation, action: &str) -> Result<bool, CodeSignerError>;
}
