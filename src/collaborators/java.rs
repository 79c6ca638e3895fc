use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use super::JavaProvisioner;
use crate::error::CodeSignerError;
use crate::pipeline::resolver::MIN_JAVA_VERSION;
use crate::process::CommandRunner;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"version "(\d+)(?:\.(\d+))?"#).expect("static regex is valid")
});

/// Accepts a Java runtime already present on the runner.
///
/// Looks for `$JAVA_HOME/bin/java` first, then `java` on the PATH, and
/// succeeds only if its `-version` output reports a supported major version.
pub struct SystemJavaProvisioner {
    java_home: String,
    runner: Arc<dyn CommandRunner>,
}

impl SystemJavaProvisioner {
    pub fn new(java_home: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            java_home: java_home.into(),
            runner,
        }
    }

    fn candidates(&self) -> Vec<String> {
        let mut candidates = Vec::new();
        if !self.java_home.is_empty() {
            let bin = Path::new(&self.java_home).join("bin").join("java");
            candidates.push(bin.display().to_string());
        }
        candidates.push("java".to_owned());
        candidates
    }
}

#[async_trait]
impl JavaProvisioner for SystemJavaProvisioner {
    async fn provision(&self) -> Result<(), CodeSignerError> {
        let mut found = Vec::new();
        for java in self.candidates() {
            let argv = vec![java.clone(), "-version".to_owned()];
            let result = match self.runner.run(&argv).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::debug!(java = %java, error = %e, "java candidate not runnable");
                    continue;
                }
            };

            // `java -version` prints to stderr.
            let reported = parse_java_major(&result.stderr).or_else(|| parse_java_major(&result.stdout));
            match reported {
                Some(major) if major >= MIN_JAVA_VERSION => {
                    tracing::info!(java = %java, version = major, "using installed JDK");
                    return Ok(());
                }
                Some(major) => found.push(format!("{java} ({major})")),
                None => found.push(format!("{java} (unknown version)")),
            }
        }

        let detail = if found.is_empty() {
            "no java executable found".to_owned()
        } else {
            format!("found {}", found.join(", "))
        };
        Err(CodeSignerError::JavaProvisioning(format!(
            "Java {MIN_JAVA_VERSION} or newer is required: {detail}. \
             Install a JDK (for example with actions/setup-java) before this step."
        )))
    }
}

/// Major version from `java -version` output: `1.8.0_382` is 8, `17.0.2` is 17.
pub fn parse_java_major(output: &str) -> Option<i64> {
    let caps = VERSION_RE.captures(output)?;
    let first: i64 = caps.get(1)?.as_str().parse().ok()?;
    if first == 1 {
        caps.get(2).and_then(|m| m.as_str().parse().ok())
    } else {
        Some(first)
    }
}
