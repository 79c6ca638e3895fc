use std::io::Write;
use std::path::PathBuf;

use crate::config::Inputs;
use crate::error::CodeSignerError;
use crate::pipeline::Outcome;

/// Name of the output carrying the execution result.
pub const OUTPUT_NAME: &str = "CodeSigner";

/// Reports an `Outcome` to the Actions runner through workflow commands.
pub struct Reporter<W: Write> {
    output_file: Option<PathBuf>,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(output_file: Option<PathBuf>, out: W) -> Self {
        Self { output_file, out }
    }

    /// Report to the current job: the runner's output file, if any, plus `out`.
    pub fn from_inputs(inputs: &Inputs, out: W) -> Self {
        Self::new(inputs.github_output(), out)
    }

    /// Publish the outcome. Returns `true` when the run succeeded.
    pub fn report(&mut self, outcome: &Outcome) -> Result<bool, CodeSignerError> {
        match outcome {
            Outcome::Success(result) => {
                let value = serde_json::to_string(result)
                    .map_err(|e| CodeSignerError::Workflow(std::io::Error::other(e)))?;
                self.set_output(OUTPUT_NAME, &value)?;
                Ok(true)
            }
            Outcome::Failure(message) => {
                self.set_failed(message)?;
                Ok(false)
            }
        }
    }

    pub fn set_output(&mut self, name: &str, value: &str) -> Result<(), CodeSignerError> {
        match &self.output_file {
            Some(path) => {
                let delimiter = delimiter_for(value);
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                writeln!(file, "{name}<<{delimiter}")?;
                writeln!(file, "{value}")?;
                writeln!(file, "{delimiter}")?;
            }
            None => {
                writeln!(
                    self.out,
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                )?;
            }
        }
        Ok(())
    }

    pub fn set_failed(&mut self, message: &str) -> Result<(), CodeSignerError> {
        writeln!(self.out, "::error::{}", escape_data(message))?;
        Ok(())
    }
}

/// Heredoc delimiter that does not occur in `value`.
fn delimiter_for(value: &str) -> String {
    loop {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::now_v7());
        if !value.contains(&delimiter) {
            return delimiter;
        }
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
