pub mod classify;
pub mod cleanup;
pub mod command;
pub mod gate;
pub mod resolver;

use classify::{GENERIC_FAILURE, MarkerRules, Verdict};
use command::SigningCommand;
use gate::GateDecision;
use resolver::JavaEnvironment;

use crate::collaborators::{InputMapper, JavaProvisioner, MalwareScanner, ToolSetup};
use crate::config::InvocationRequest;
use crate::error::CodeSignerError;
use crate::process::{CommandRunner, ExecutionResult};

/// Terminal state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(ExecutionResult),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<CodeSignerError> for Outcome {
    fn from(err: CodeSignerError) -> Self {
        Outcome::Failure(err.to_string())
    }
}

/// External collaborators one run depends on.
pub struct Collaborators<'a> {
    pub tool_setup: &'a dyn ToolSetup,
    pub java: &'a dyn JavaProvisioner,
    pub mapper: &'a dyn InputMapper,
    pub scanner: &'a dyn MalwareScanner,
    pub runner: &'a dyn CommandRunner,
}

/// Forward-only signing pipeline:
/// map input → resolve Java → set up tool → assemble → gate → execute →
/// cleanup → classify.
pub struct Pipeline<'a> {
    collaborators: Collaborators<'a>,
    markers: MarkerRules,
}

impl<'a> Pipeline<'a> {
    pub fn new(collaborators: Collaborators<'a>, markers: MarkerRules) -> Self {
        Self {
            collaborators,
            markers,
        }
    }

    /// Run once. Every abort path ends in exactly one `Outcome`.
    pub async fn run(&self, request: &InvocationRequest, java: &JavaEnvironment) -> Outcome {
        match self.try_run(request, java).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "pipeline aborted");
                err.into()
            }
        }
    }

    async fn try_run(
        &self,
        request: &InvocationRequest,
        java: &JavaEnvironment,
    ) -> Result<Outcome, CodeSignerError> {
        let c = &self.collaborators;
        tracing::debug!(action = %request.action, "running CodeSigner");

        let subcommand = c.mapper.map(request)?;
        tracing::info!("Input Commands: {}", subcommand.display());

        resolver::resolve(java, c.java).await?;

        let tool = c.tool_setup.setup().await?;

        let assembled = SigningCommand::assemble(&tool, &subcommand);
        tracing::info!("CodeSigner Command: {}", assembled.redacted());

        let clearance =
            match gate::evaluate(&request.action, &request.malware_scan, &tool, c.scanner).await? {
                GateDecision::Pass(clearance) => clearance,
                GateDecision::Block => return Ok(Outcome::Failure(GENERIC_FAILURE.to_owned())),
            };

        tracing::debug!(scanned = clearance.scanned, "malware gate cleared");
        let (result, spent) = assembled.clear(clearance).execute(c.runner).await?;

        if request.clean_logs {
            cleanup::remove_logs_dir(&cleanup::logs_dir_for(spent.line())).await?;
        }

        match self.markers.classify(&result) {
            Verdict::Success => Ok(Outcome::Success(result)),
            Verdict::Failure(rule) => {
                tracing::warn!(
                    marker = %rule.text,
                    exit_code = result.exit_code,
                    "failure marker found in output"
                );
                Ok(Outcome::Failure(GENERIC_FAILURE.to_owned()))
            }
        }
    }
}
