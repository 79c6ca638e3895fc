use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeSignerError {
    #[error("{0}")]
    ToolSetup(String),

    #[error("{0}")]
    JavaProvisioning(String),

    #[error("unknown command: {0}")]
    UnknownAction(String),

    #[error("invalid input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("{0}")]
    Scan(String),

    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("empty command line")]
    EmptyCommand,

    #[error("failed to remove {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("marker rules load error: {0}")]
    MarkerLoad(String),

    #[error("marker rules validation error: {0}")]
    MarkerValidation(String),

    #[error("workflow command failed: {0}")]
    Workflow(#[from] std::io::Error),
}
