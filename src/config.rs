use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::CodeSignerError;

pub const INPUT_COMMAND: &str = "command";
pub const INPUT_ARGS: &str = "args";
pub const INPUT_MALWARE_BLOCK: &str = "malware_block";
pub const INPUT_CLEAN_LOGS: &str = "clean_logs";
pub const INPUT_USERNAME: &str = "username";
pub const INPUT_PASSWORD: &str = "password";
pub const INPUT_CREDENTIAL_ID: &str = "credential_id";
pub const INPUT_TOTP_SECRET: &str = "totp_secret";
pub const INPUT_PROGRAM_NAME: &str = "program_name";
pub const INPUT_FILE_PATH: &str = "file_path";
pub const INPUT_DIR_PATH: &str = "dir_path";
pub const INPUT_OUTPUT_PATH: &str = "output_path";
pub const INPUT_OVERRIDE: &str = "override";

pub const ENV_JAVA_VERSION: &str = "JAVA_VERSION";
pub const ENV_JAVA_HOME: &str = "JAVA_HOME";
pub const ENV_TOOL_PATH: &str = "CODESIGNTOOL_PATH";
pub const ENV_MARKERS_FILE: &str = "CODESIGNER_MARKERS";
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads task inputs and environment values through an injectable lookup.
///
/// Task inputs arrive as `INPUT_<NAME>` variables, uppercased with spaces
/// replaced by underscores.
pub struct Inputs {
    lookup: Lookup,
}

impl std::fmt::Debug for Inputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inputs").finish_non_exhaustive()
    }
}

impl Inputs {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Raw environment value.
    pub fn env(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    /// Trimmed input value; empty when unset.
    pub fn input(&self, name: &str) -> String {
        let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
        self.env(&key)
            .map(|v| v.trim().to_owned())
            .unwrap_or_default()
    }

    fn optional_input(&self, name: &str) -> Option<String> {
        Some(self.input(name)).filter(|v| !v.is_empty())
    }

    /// Boolean input per the YAML 1.2 core schema. Empty reads as `false`.
    pub fn bool_input(&self, name: &str) -> Result<bool, CodeSignerError> {
        match self.input(name).as_str() {
            "" | "false" | "False" | "FALSE" => Ok(false),
            "true" | "True" | "TRUE" => Ok(true),
            other => Err(CodeSignerError::InvalidInput {
                name: name.to_owned(),
                reason: format!(
                    "'{other}' is not a boolean; use one of true | True | TRUE | false | False | FALSE"
                ),
            }),
        }
    }

    /// Build the immutable request for this run.
    pub fn request(&self) -> Result<InvocationRequest, CodeSignerError> {
        let action = self.input(INPUT_COMMAND);
        if action.is_empty() {
            return Err(CodeSignerError::InvalidInput {
                name: INPUT_COMMAND.to_owned(),
                reason: "input required and not supplied".to_owned(),
            });
        }

        Ok(InvocationRequest {
            action,
            args: self.input(INPUT_ARGS),
            malware_scan: self.input(INPUT_MALWARE_BLOCK),
            clean_logs: self.bool_input(INPUT_CLEAN_LOGS)?,
            options: SignerOptions {
                username: self.optional_input(INPUT_USERNAME),
                password: self.optional_input(INPUT_PASSWORD).map(SecretString::from),
                credential_id: self.optional_input(INPUT_CREDENTIAL_ID),
                totp_secret: self.optional_input(INPUT_TOTP_SECRET).map(SecretString::from),
                program_name: self.optional_input(INPUT_PROGRAM_NAME),
                file_path: self.optional_input(INPUT_FILE_PATH),
                dir_path: self.optional_input(INPUT_DIR_PATH),
                output_path: self.optional_input(INPUT_OUTPUT_PATH),
                override_output: self.bool_input(INPUT_OVERRIDE)?,
            },
        })
    }

    /// Explicitly configured tool location, if any.
    pub fn tool_path(&self) -> Option<PathBuf> {
        self.env(ENV_TOOL_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn markers_file(&self) -> Option<PathBuf> {
        self.env(ENV_MARKERS_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Runner-provided file for step outputs. Unset on older runners.
    pub fn github_output(&self) -> Option<PathBuf> {
        self.env(ENV_GITHUB_OUTPUT)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

/// One run's inputs. Never mutated after construction.
#[derive(Debug)]
pub struct InvocationRequest {
    pub action: String,
    pub args: String,
    pub malware_scan: String,
    pub clean_logs: bool,
    pub options: SignerOptions,
}

impl InvocationRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: String::new(),
            malware_scan: String::new(),
            clean_logs: false,
            options: SignerOptions::default(),
        }
    }
}

/// Named options forwarded to the signing tool.
#[derive(Debug, Default)]
pub struct SignerOptions {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub credential_id: Option<String>,
    pub totp_secret: Option<SecretString>,
    pub program_name: Option<String>,
    pub file_path: Option<String>,
    pub dir_path: Option<String>,
    pub output_path: Option<String>,
    pub override_output: bool,
}
