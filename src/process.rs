use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;

use crate::error::CodeSignerError;

/// Captured output of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Process boundary. The pipeline never spawns anything except through this trait.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv[0]` with the remaining arguments and capture both streams in full.
    async fn run(&self, argv: &[String]) -> Result<ExecutionResult, CodeSignerError>;
}

/// Spawns real child processes via `tokio::process::Command`. No shell, no timeout.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String]) -> Result<ExecutionResult, CodeSignerError> {
        let (program, args) = argv.split_first().ok_or(CodeSignerError::EmptyCommand)?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CodeSignerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let result = ExecutionResult {
            // Killed by a signal.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            program = %program,
            exit_code = result.exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            "process finished"
        );
        Ok(result)
    }
}

/// Split a command string into program and arguments.
///
/// Whitespace separates arguments, double quotes group them, and `\"` inside
/// quotes is a literal quote. Any other backslash is kept as-is, so Windows
/// paths survive unchanged.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    fn push_char(current: &mut String, escaped: &mut bool, c: char) {
        if *escaped && c != '"' {
            current.push('\\');
        }
        current.push(c);
        *escaped = false;
    }

    for c in line.chars() {
        match c {
            '"' if !escaped => in_quotes = !in_quotes,
            '"' => push_char(&mut current, &mut escaped, c),
            '\\' if escaped => push_char(&mut current, &mut escaped, c),
            '\\' if in_quotes => escaped = true,
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => push_char(&mut current, &mut escaped, c),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces() {
        assert_eq!(
            split_command_line("/opt/tool/CodeSignTool.sh sign -username=alice"),
            vec!["/opt/tool/CodeSignTool.sh", "sign", "-username=alice"]
        );
    }

    #[test]
    fn collapses_repeated_spaces() {
        assert_eq!(split_command_line("  a   b  "), vec!["a", "b"]);
    }

    #[test]
    fn quotes_group_arguments() {
        assert_eq!(
            split_command_line(r#"tool sign "-input_file_path=C:\My Files\app.exe""#),
            vec!["tool", "sign", r"-input_file_path=C:\My Files\app.exe"]
        );
    }

    #[test]
    fn escaped_quote_inside_quotes() {
        assert_eq!(
            split_command_line(r#"tool "say \"hi\"""#),
            vec!["tool", r#"say "hi""#]
        );
    }

    #[test]
    fn backslash_outside_quotes_is_literal() {
        assert_eq!(
            split_command_line(r"C:\tools\CodeSignTool.bat sign"),
            vec![r"C:\tools\CodeSignTool.bat", "sign"]
        );
    }

    #[test]
    fn empty_line_yields_nothing() {
        assert!(split_command_line("").is_empty());
        assert!(split_command_line("   ").is_empty());
    }

    #[tokio::test]
    async fn empty_argv_is_rejected() {
        let err = ProcessRunner.run(&[]).await.unwrap_err();
        assert!(matches!(err, CodeSignerError::EmptyCommand));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let argv = vec!["/nonexistent/codesigner-test-binary".to_owned()];
        let err = ProcessRunner.run(&argv).await.unwrap_err();
        assert!(matches!(err, CodeSignerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let argv: Vec<String> = ["sh", "-c", "echo out; echo err >&2; exit 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = ProcessRunner.run(&argv).await.unwrap();
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn serializes_camel_case() {
        let result = ExecutionResult {
            exit_code: 0,
            stdout: "ok".into(),
            stderr: String::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["exitCode"], 0);
        assert_eq!(json["stdout"], "ok");
    }
}
