use secrecy::ExposeSecret;

use super::InputMapper;
use crate::config::{InvocationRequest, SignerOptions};
use crate::error::CodeSignerError;
use crate::pipeline::command::Subcommand;

/// Named options the signing tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opt {
    Username,
    Password,
    CredentialId,
    TotpSecret,
    ProgramName,
    InputFile,
    InputDir,
    OutputDir,
    Override,
}

use Opt::*;

/// Known actions and the options each one accepts, in emission order.
const ACTIONS: &[(&str, &[Opt])] = &[
    ("get_credential_ids", &[Username, Password]),
    ("credential_info", &[Username, Password, CredentialId]),
    (
        "sign",
        &[Username, Password, CredentialId, TotpSecret, ProgramName, InputFile, OutputDir, Override],
    ),
    (
        "batch_sign",
        &[Username, Password, CredentialId, TotpSecret, InputDir, OutputDir],
    ),
    (
        "hash",
        &[Username, Password, CredentialId, TotpSecret, ProgramName, InputFile],
    ),
    (
        "scan_code",
        &[Username, Password, CredentialId, TotpSecret, ProgramName, InputFile, InputDir],
    ),
];

/// Maps action tokens onto CodeSignTool subcommands with `-name=value` options.
#[derive(Debug, Default)]
pub struct ActionMapper;

impl ActionMapper {
    /// Build the subcommand for `action` using the request's options and
    /// trailing arguments.
    pub fn subcommand(
        &self,
        action: &str,
        request: &InvocationRequest,
    ) -> Result<Subcommand, CodeSignerError> {
        let (name, opts) = ACTIONS
            .iter()
            .find(|(name, _)| *name == action)
            .ok_or_else(|| CodeSignerError::UnknownAction(action.to_owned()))?;

        let mut text = vec![name.to_string()];
        let mut display = vec![name.to_string()];
        for opt in *opts {
            if let Some((real, shown)) = render(*opt, &request.options) {
                text.push(real);
                display.push(shown);
            }
        }
        if !request.args.is_empty() {
            text.push(request.args.clone());
            display.push(request.args.clone());
        }

        Ok(Subcommand::new(text.join(" "), display.join(" ")))
    }
}

impl InputMapper for ActionMapper {
    fn map(&self, request: &InvocationRequest) -> Result<Subcommand, CodeSignerError> {
        self.subcommand(&request.action, request)
    }
}

/// Real and display renderings of one option, if it was provided.
fn render(opt: Opt, options: &SignerOptions) -> Option<(String, String)> {
    fn plain(name: &str, value: &Option<String>) -> Option<(String, String)> {
        value.as_ref().map(|v| {
            let arg = format!("-{name}={v}");
            (arg.clone(), arg)
        })
    }

    fn secret(name: &str, value: &Option<secrecy::SecretString>) -> Option<(String, String)> {
        value.as_ref().map(|v| {
            (
                format!("-{name}={}", v.expose_secret()),
                format!("-{name}=***"),
            )
        })
    }

    match opt {
        Username => plain("username", &options.username),
        Password => secret("password", &options.password),
        CredentialId => plain("credential_id", &options.credential_id),
        TotpSecret => secret("totp_secret", &options.totp_secret),
        ProgramName => plain("program_name", &options.program_name),
        InputFile => plain("input_file_path", &options.file_path),
        InputDir => plain("input_dir_path", &options.dir_path),
        OutputDir => plain("output_dir_path", &options.output_path),
        Override => options
            .override_output
            .then(|| ("-override".to_owned(), "-override".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn request(action: &str) -> InvocationRequest {
        let mut request = InvocationRequest::new(action);
        request.options = SignerOptions {
            username: Some("alice".into()),
            password: Some(SecretString::from("hunter2".to_owned())),
            credential_id: Some("cred-1".into()),
            totp_secret: Some(SecretString::from("TOTP".to_owned())),
            file_path: Some("dist/app.exe".into()),
            dir_path: Some("dist".into()),
            output_path: Some("signed".into()),
            override_output: true,
            ..Default::default()
        };
        request
    }

    #[test]
    fn sign_includes_file_options() {
        let sub = ActionMapper.map(&request("sign")).unwrap();
        assert_eq!(
            sub.display(),
            "sign -username=alice -password=*** -credential_id=cred-1 -totp_secret=*** \
             -input_file_path=dist/app.exe -output_dir_path=signed -override"
        );
    }

    #[test]
    fn batch_sign_uses_directory() {
        let sub = ActionMapper.map(&request("batch_sign")).unwrap();
        assert!(sub.display().contains("-input_dir_path=dist"));
        assert!(!sub.display().contains("-input_file_path"));
        assert!(!sub.display().contains("-override"));
    }

    #[test]
    fn credential_ids_only_needs_login() {
        let sub = ActionMapper.map(&request("get_credential_ids")).unwrap();
        assert_eq!(sub.display(), "get_credential_ids -username=alice -password=***");
    }

    #[test]
    fn secrets_reach_the_real_text() {
        let tool = crate::collaborators::ToolLocation::new("tool");
        let sub = ActionMapper.map(&request("credential_info")).unwrap();
        let cmd = crate::pipeline::command::SigningCommand::assemble(&tool, &sub);
        assert_eq!(
            cmd.line(),
            "tool credential_info -username=alice -password=hunter2 -credential_id=cred-1"
        );
    }

    #[test]
    fn trailing_args_are_appended() {
        let mut request = InvocationRequest::new("sign");
        request.args = "-jvm_max_memory=2048M".into();
        let sub = ActionMapper.map(&request).unwrap();
        assert_eq!(sub.display(), "sign -jvm_max_memory=2048M");
    }

    #[test]
    fn missing_options_are_skipped() {
        let sub = ActionMapper.map(&InvocationRequest::new("sign")).unwrap();
        assert_eq!(sub.display(), "sign");
    }

    #[test]
    fn unknown_action_rejected() {
        let err = ActionMapper.map(&InvocationRequest::new("Sign")).unwrap_err();
        assert!(matches!(err, CodeSignerError::UnknownAction(a) if a == "Sign"));
    }
}
