use std::sync::Arc;

use async_trait::async_trait;

use super::{MalwareScanner, ToolLocation};
use crate::error::CodeSignerError;
use crate::pipeline::classify::{MarkerRules, Verdict};
use crate::pipeline::command::{SigningCommand, Subcommand};
use crate::process::{CommandRunner, split_command_line};

/// Runs the signing tool's own `scan_code` subcommand and judges its output
/// with the same marker rules as signing.
pub struct ToolMalwareScanner {
    subcommand: Subcommand,
    runner: Arc<dyn CommandRunner>,
    markers: MarkerRules,
}

impl ToolMalwareScanner {
    pub fn new(subcommand: Subcommand, runner: Arc<dyn CommandRunner>, markers: MarkerRules) -> Self {
        Self {
            subcommand,
            runner,
            markers,
        }
    }
}

#[async_trait]
impl MalwareScanner for ToolMalwareScanner {
    async fn scan(&self, tool: &ToolLocation, action: &str) -> Result<bool, CodeSignerError> {
        let command = SigningCommand::assemble(tool, &self.subcommand);
        tracing::info!(action = %action, "Malware scan command: {}", command.redacted());

        let result = self.runner.run(&split_command_line(command.line())).await?;
        match self.markers.classify(&result) {
            Verdict::Success => Ok(true),
            Verdict::Failure(rule) => {
                tracing::warn!(marker = %rule.text, "malware scan reported a problem");
                Ok(false)
            }
        }
    }
}
