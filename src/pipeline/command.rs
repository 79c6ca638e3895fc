use std::marker::PhantomData;

use secrecy::{ExposeSecret, SecretString};

use super::gate::ScanClearance;
use crate::collaborators::ToolLocation;
use crate::error::CodeSignerError;
use crate::process::{CommandRunner, ExecutionResult, split_command_line};

/// Canonical subcommand produced by the input mapper.
///
/// Carries the real text (which may hold credentials) and a display form
/// with secret values masked.
pub struct Subcommand {
    text: SecretString,
    display: String,
}

impl Subcommand {
    pub fn new(text: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            text: SecretString::from(text.into()),
            display: display.into(),
        }
    }

    /// A subcommand without secrets; displayed verbatim.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

impl std::fmt::Debug for Subcommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subcommand").field(&self.display).finish()
    }
}

/// Typestate: command line built, malware gate not yet evaluated.
pub struct Assembled;

/// Typestate: gate evaluated (passed or not applicable); ready to run.
pub struct Cleared;

/// The single command line one run executes.
///
/// `SigningCommand<Assembled>` → `clear(ScanClearance)` → `SigningCommand<Cleared>`
///
/// `execute()` only exists on `Cleared`, and consumes the command, so a run
/// cannot execute it twice.
pub struct SigningCommand<State> {
    line: SecretString,
    redacted: String,
    _state: PhantomData<State>,
}

impl<State> SigningCommand<State> {
    /// Command line with secrets masked, safe for logs.
    pub fn redacted(&self) -> &str {
        &self.redacted
    }

    /// Full command line, secrets included.
    pub(crate) fn line(&self) -> &str {
        self.line.expose_secret()
    }
}

impl<State> std::fmt::Debug for SigningCommand<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningCommand").field(&self.redacted).finish()
    }
}

impl SigningCommand<Assembled> {
    /// Prefix the resolved tool location to the canonical subcommand.
    pub fn assemble(tool: &ToolLocation, subcommand: &Subcommand) -> Self {
        let line = format!("{} {}", tool.as_str(), subcommand.text.expose_secret());
        let redacted = format!("{} {}", tool.as_str(), subcommand.display);
        Self {
            line: SecretString::from(line),
            redacted,
            _state: PhantomData,
        }
    }

    /// Consume the gate's clearance. Only the gate can mint one.
    pub fn clear(self, _clearance: ScanClearance) -> SigningCommand<Cleared> {
        SigningCommand {
            line: self.line,
            redacted: self.redacted,
            _state: PhantomData,
        }
    }
}

impl SigningCommand<Cleared> {
    /// Run the command once and capture its output. Returns the command back
    /// in its spent form so cleanup can still derive paths from it.
    pub async fn execute(
        self,
        runner: &dyn CommandRunner,
    ) -> Result<(ExecutionResult, SpentCommand), CodeSignerError> {
        let argv = split_command_line(self.line.expose_secret());
        let result = runner.run(&argv).await?;
        Ok((
            result,
            SpentCommand { line: self.line },
        ))
    }
}

/// A command that has already been executed. Cannot be run again.
pub struct SpentCommand {
    line: SecretString,
}

impl SpentCommand {
    pub(crate) fn line(&self) -> &str {
        self.line.expose_secret()
    }
}
