use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::CodeSignerError;
use crate::process::ExecutionResult;

const MAX_MARKERS_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

/// Fixed message for output-pattern failures. The tool's own text is not surfaced.
pub const GENERIC_FAILURE: &str = "Something Went Wrong. Please try again.";

// --- TOML deserialization structs (private, map 1:1 to TOML schema) ---

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkersFile {
    #[serde(default)]
    markers: Vec<MarkerConfig>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkerConfig {
    text: String,
    #[serde(default)]
    streams: StreamsValue,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum StreamsValue {
    #[default]
    Both,
    Stdout,
    Stderr,
}

impl From<StreamsValue> for Streams {
    fn from(value: StreamsValue) -> Self {
        match value {
            StreamsValue::Both => Streams::Both,
            StreamsValue::Stdout => Streams::Stdout,
            StreamsValue::Stderr => Streams::Stderr,
        }
    }
}

// --- Rule set ---

/// Which captured streams a marker is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Streams {
    Both,
    Stdout,
    Stderr,
}

impl Streams {
    fn covers_stdout(self) -> bool {
        matches!(self, Streams::Both | Streams::Stdout)
    }

    fn covers_stderr(self) -> bool {
        matches!(self, Streams::Both | Streams::Stderr)
    }
}

/// Case-sensitive substring marking a failed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub text: String,
    pub streams: Streams,
}

impl MarkerRule {
    pub fn new(text: impl Into<String>, streams: Streams) -> Self {
        Self {
            text: text.into(),
            streams,
        }
    }

    fn matches(&self, result: &ExecutionResult) -> bool {
        (self.streams.covers_stdout() && result.stdout.contains(&self.text))
            || (self.streams.covers_stderr() && result.stderr.contains(&self.text))
    }
}

/// Classification verdict. Exit code plays no part in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// First rule that matched, in rule order.
    Failure(MarkerRule),
}

/// Ordered marker rules used to decide success from captured text.
#[derive(Debug, Clone)]
pub struct MarkerRules {
    rules: Vec<MarkerRule>,
}

impl Default for MarkerRules {
    fn default() -> Self {
        Self {
            rules: vec![
                MarkerRule::new("Error", Streams::Both),
                MarkerRule::new("Exception", Streams::Both),
                MarkerRule::new("Missing required option", Streams::Both),
                MarkerRule::new("Unmatched arguments from", Streams::Both),
                MarkerRule::new("Unmatched argument", Streams::Stderr),
            ],
        }
    }
}

impl FromStr for MarkerRules {
    type Err = CodeSignerError;

    /// Parse marker rules from a TOML string.
    fn from_str(content: &str) -> Result<Self, CodeSignerError> {
        let file: MarkersFile =
            toml::from_str(content).map_err(|e| CodeSignerError::MarkerLoad(e.to_string()))?;

        let rules = file
            .markers
            .into_iter()
            .enumerate()
            .map(|(idx, marker)| {
                if marker.text.is_empty() {
                    return Err(CodeSignerError::MarkerValidation(format!(
                        "marker #{}: text must not be empty",
                        idx + 1
                    )));
                }
                Ok(MarkerRule::new(marker.text, marker.streams.into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            return Err(CodeSignerError::MarkerValidation(
                "at least one marker is required".to_owned(),
            ));
        }

        Ok(Self { rules })
    }
}

impl MarkerRules {
    /// Load marker rules from a TOML file. Checks file size before reading.
    pub fn load(path: &Path) -> Result<Self, CodeSignerError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CodeSignerError::MarkerLoad(format!("cannot read {}: {e}", path.display()))
        })?;

        if metadata.len() > MAX_MARKERS_FILE_SIZE {
            return Err(CodeSignerError::MarkerLoad(format!(
                "markers file exceeds {MAX_MARKERS_FILE_SIZE} byte limit"
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CodeSignerError::MarkerLoad(format!("cannot read {}: {e}", path.display()))
        })?;

        content.parse()
    }

    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    pub fn classify(&self, result: &ExecutionResult) -> Verdict {
        self.rules
            .iter()
            .find(|rule| rule.matches(result))
            .map_or(Verdict::Success, |rule| Verdict::Failure(rule.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            exit_code,
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }
    }

    #[test]
    fn clean_output_succeeds() {
        let rules = MarkerRules::default();
        assert_eq!(
            rules.classify(&output(0, "Signed successfully", "")),
            Verdict::Success
        );
    }

    #[test]
    fn exit_code_is_ignored() {
        let rules = MarkerRules::default();
        assert_eq!(rules.classify(&output(1, "done", "")), Verdict::Success);
        assert!(matches!(
            rules.classify(&output(0, "java.lang.Exception: boom", "")),
            Verdict::Failure(_)
        ));
    }

    #[test]
    fn shared_markers_match_either_stream() {
        let rules = MarkerRules::default();
        for marker in [
            "Error",
            "Exception",
            "Missing required option",
            "Unmatched arguments from",
        ] {
            let text = format!("prefix {marker} suffix");
            assert!(
                matches!(rules.classify(&output(0, &text, "")), Verdict::Failure(_)),
                "stdout {marker}"
            );
            assert!(
                matches!(rules.classify(&output(0, "", &text)), Verdict::Failure(_)),
                "stderr {marker}"
            );
        }
    }

    #[test]
    fn unmatched_argument_is_stderr_only() {
        let rules = MarkerRules::default();
        assert_eq!(
            rules.classify(&output(0, "Unmatched argument --foo", "")),
            Verdict::Success
        );
        assert_eq!(
            rules.classify(&output(0, "", "Unmatched argument --foo")),
            Verdict::Failure(MarkerRule::new("Unmatched argument", Streams::Stderr))
        );
    }

    #[test]
    fn markers_are_case_sensitive() {
        let rules = MarkerRules::default();
        assert_eq!(
            rules.classify(&output(0, "no error here, no exception", "")),
            Verdict::Success
        );
        assert!(matches!(
            rules.classify(&output(0, "ErrorCode=0", "")),
            Verdict::Failure(_)
        ));
    }

    #[test]
    fn first_matching_rule_is_reported() {
        let rules = MarkerRules::default();
        assert_eq!(
            rules.classify(&output(0, "Exception", "Error")),
            Verdict::Failure(MarkerRule::new("Error", Streams::Both))
        );
    }

    #[test]
    fn parse_rules_from_toml() {
        let toml = r#"
[[markers]]
text = "FAILED"

[[markers]]
text = "denied"
streams = "stderr"
"#;
        let rules: MarkerRules = toml.parse().unwrap();
        assert_eq!(
            rules.rules(),
            &[
                MarkerRule::new("FAILED", Streams::Both),
                MarkerRule::new("denied", Streams::Stderr),
            ]
        );
        assert_eq!(rules.classify(&output(0, "denied", "")), Verdict::Success);
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[[markers]]
text = "Error"
regex = true
"#;
        let err = MarkerRules::from_str(toml).unwrap_err();
        assert!(matches!(err, CodeSignerError::MarkerLoad(_)));
    }

    #[test]
    fn invalid_stream_rejected() {
        let toml = r#"
[[markers]]
text = "Error"
streams = "stdin"
"#;
        let err = MarkerRules::from_str(toml).unwrap_err();
        assert!(matches!(err, CodeSignerError::MarkerLoad(_)));
    }

    #[test]
    fn empty_marker_text_rejected() {
        let toml = r#"
[[markers]]
text = ""
"#;
        let err = MarkerRules::from_str(toml).unwrap_err();
        assert!(matches!(err, CodeSignerError::MarkerValidation(_)));
    }

    #[test]
    fn empty_rule_list_rejected() {
        let err = MarkerRules::from_str("").unwrap_err();
        assert!(matches!(err, CodeSignerError::MarkerValidation(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.toml");
        std::fs::write(&path, "[[markers]]\ntext = \"BOOM\"\n").unwrap();
        let rules = MarkerRules::load(&path).unwrap();
        assert!(matches!(
            rules.classify(&output(0, "", "BOOM")),
            Verdict::Failure(_)
        ));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = MarkerRules::load(Path::new("/nonexistent/markers.toml")).unwrap_err();
        assert!(matches!(err, CodeSignerError::MarkerLoad(_)));
    }
}
