use crate::collaborators::JavaProvisioner;
use crate::config::{ENV_JAVA_HOME, ENV_JAVA_VERSION, Inputs};
use crate::error::CodeSignerError;

/// Lowest Java major version the signing tool runs on.
pub const MIN_JAVA_VERSION: i64 = 11;

/// Java installation reported by the environment. Read once, never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaEnvironment {
    pub major_version: i64,
    pub home: String,
}

impl JavaEnvironment {
    pub fn new(major_version: i64, home: impl Into<String>) -> Self {
        Self {
            major_version,
            home: home.into(),
        }
    }

    /// Unset or unparsable versions read as 0 so provisioning still runs.
    pub fn from_inputs(inputs: &Inputs) -> Self {
        let major_version = inputs
            .env(ENV_JAVA_VERSION)
            .map(|raw| parse_leading_int(&raw))
            .unwrap_or(0);
        let home = inputs.env(ENV_JAVA_HOME).unwrap_or_default();
        Self { major_version, home }
    }

    pub fn needs_provisioning(&self) -> bool {
        self.major_version < MIN_JAVA_VERSION
    }
}

/// Leading-integer parse: `"17.0.2"` is 17, `"11abc"` is 11, `"abc"` is 0.
///
/// A digit run that overflows `i64` also reads as 0, so a garbage version
/// provisions Java instead of being taken as satisfied.
pub fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end]
        .parse::<i64>()
        .map(|v| sign * v)
        .unwrap_or(0)
}

/// Provision Java when the detected version is too old, otherwise just report it.
pub async fn resolve(
    java: &JavaEnvironment,
    provisioner: &dyn JavaProvisioner,
) -> Result<(), CodeSignerError> {
    tracing::info!(home = %java.home, "JDK home: {}", java.home);
    tracing::info!(version = java.major_version, "JDK version: {}", java.major_version);

    if java.needs_provisioning() {
        tracing::info!(
            minimum = MIN_JAVA_VERSION,
            "JDK {} is below the minimum, provisioning",
            java.major_version
        );
        provisioner.provision().await?;
    } else {
        tracing::info!("JDK is already installed {}", java.home);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct CountingProvisioner {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl JavaProvisioner for CountingProvisioner {
        async fn provision(&self) -> Result<(), CodeSignerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CodeSignerError::JavaProvisioning("no JDK for you".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("17"), 17);
        assert_eq!(parse_leading_int("17.0.2"), 17);
        assert_eq!(parse_leading_int("  11abc"), 11);
        assert_eq!(parse_leading_int("-3"), -3);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("-"), 0);
    }

    #[test]
    fn overflowing_version_provisions() {
        assert_eq!(parse_leading_int("99999999999999999999"), 0);
        let inputs = Inputs::from_lookup(|key| {
            (key == "JAVA_VERSION").then(|| "99999999999999999999".to_owned())
        });
        assert!(JavaEnvironment::from_inputs(&inputs).needs_provisioning());
    }

    #[test]
    fn missing_version_is_zero() {
        let inputs = Inputs::from_lookup(|_| None);
        let java = JavaEnvironment::from_inputs(&inputs);
        assert_eq!(java, JavaEnvironment::new(0, ""));
        assert!(java.needs_provisioning());
    }

    #[test]
    fn reads_version_and_home() {
        let inputs = Inputs::from_lookup(|key| match key {
            "JAVA_VERSION" => Some("21.0.1".into()),
            "JAVA_HOME" => Some("/usr/lib/jvm/21".into()),
            _ => None,
        });
        let java = JavaEnvironment::from_inputs(&inputs);
        assert_eq!(java, JavaEnvironment::new(21, "/usr/lib/jvm/21"));
        assert!(!java.needs_provisioning());
    }

    #[tokio::test]
    async fn old_or_unknown_versions_provision_once() {
        for version in [i64::MIN, -1, 0, 8, 10] {
            let provisioner = CountingProvisioner::default();
            resolve(&JavaEnvironment::new(version, ""), &provisioner)
                .await
                .unwrap();
            assert_eq!(provisioner.calls.load(Ordering::SeqCst), 1, "version {version}");
        }
    }

    #[tokio::test]
    async fn supported_versions_never_provision() {
        for version in [11, 17, 21, 1000] {
            let provisioner = CountingProvisioner::default();
            resolve(&JavaEnvironment::new(version, "/jdk"), &provisioner)
                .await
                .unwrap();
            assert_eq!(provisioner.calls.load(Ordering::SeqCst), 0, "version {version}");
        }
    }

    #[tokio::test]
    async fn provisioning_failure_propagates() {
        let provisioner = CountingProvisioner {
            fail: true,
            ..Default::default()
        };
        let err = resolve(&JavaEnvironment::new(8, ""), &provisioner)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no JDK for you");
        assert_eq!(provisioner.calls.load(Ordering::SeqCst), 1);
    }
}
