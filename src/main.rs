use std::process::ExitCode;
use std::sync::Arc;

use codesigner::collaborators::java::SystemJavaProvisioner;
use codesigner::collaborators::mapper::ActionMapper;
use codesigner::collaborators::scanner::ToolMalwareScanner;
use codesigner::collaborators::tool::PreinstalledTool;
use codesigner::config::Inputs;
use codesigner::error::CodeSignerError;
use codesigner::pipeline::classify::MarkerRules;
use codesigner::pipeline::resolver::JavaEnvironment;
use codesigner::pipeline::{Collaborators, Outcome, Pipeline};
use codesigner::process::{CommandRunner, ProcessRunner};
use codesigner::workflow::Reporter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Local runs only; on a runner the inputs are already in the environment.
    dotenvy::dotenv().ok();
    codesigner::telemetry::init_tracing()?;

    let inputs = Inputs::from_env();
    let outcome = match run(&inputs).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            err.into()
        }
    };

    let mut reporter = Reporter::from_inputs(&inputs, std::io::stdout());
    if reporter.report(&outcome)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Read inputs and wire the default collaborators. Errors here happen before
/// the pipeline starts and are reported the same way as pipeline failures.
async fn run(inputs: &Inputs) -> Result<Outcome, CodeSignerError> {
    tracing::debug!("Running ESigner.com CodeSign Action");

    let request = inputs.request()?;
    let java = JavaEnvironment::from_inputs(inputs);

    let markers = match inputs.markers_file() {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading failure markers");
            MarkerRules::load(&path)?
        }
        None => MarkerRules::default(),
    };

    let cwd = std::env::current_dir().map_err(|e| {
        CodeSignerError::ToolSetup(format!("cannot determine working directory: {e}"))
    })?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);
    let mapper = ActionMapper;
    let tool_setup = PreinstalledTool::new(inputs.tool_path(), &cwd);
    let provisioner = SystemJavaProvisioner::new(java.home.clone(), runner.clone());
    let scanner = ToolMalwareScanner::new(
        mapper.subcommand("scan_code", &request)?,
        runner.clone(),
        markers.clone(),
    );

    let pipeline = Pipeline::new(
        Collaborators {
            tool_setup: &tool_setup,
            java: &provisioner,
            mapper: &mapper,
            scanner: &scanner,
            runner: runner.as_ref(),
        },
        markers,
    );

    Ok(pipeline.run(&request, &java).await)
}
