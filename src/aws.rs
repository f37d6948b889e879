use std::path::Path;

use clap::ValueEnum;
use colored::Colorize;
use log::info;

use crate::{
    cli::AwsArgs,
    config::{Settings, non_empty},
    error::AppResult,
    exec::CommandRunner,
    onepassword::{self, ItemRef},
    source, storage,
    sts::{self, SessionCredentials},
};

/// Where refreshed session credentials end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// A profile in the shared credentials file
    File,
    /// The temporary credentials item in 1Password
    #[value(name = "op")]
    OnePassword,
}

/// Destination with every default resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination<'a> {
    File { path: &'a Path, profile: String },
    OnePassword(ItemRef),
}

impl<'a> Destination<'a> {
    pub fn resolve(
        target: Target,
        profile_flag: Option<&str>,
        settings: &Settings,
        credentials_path: &'a Path,
    ) -> Self {
        match target {
            Target::File => Destination::File {
                path: credentials_path,
                profile: non_empty(profile_flag)
                    .map(str::to_string)
                    .unwrap_or_else(|| settings.profile()),
            },
            Target::OnePassword => Destination::OnePassword(ItemRef {
                item: settings.op_session_item(),
                vault: settings.op_vault(),
            }),
        }
    }
}

/// Saves session credentials to the resolved destination
pub fn store(
    runner: &impl CommandRunner,
    destination: &Destination<'_>,
    credentials: &SessionCredentials,
) -> AppResult<()> {
    match destination {
        Destination::File { path, profile } => {
            storage::update_profile(path, profile, &credentials.profile_fields())
        }
        Destination::OnePassword(item) => {
            onepassword::store_session_credentials(runner, item, credentials)
        }
    }
}

/// Runs `credkit aws`: gather keys and token, call STS, store the result
pub fn refresh(runner: &impl CommandRunner, settings: &Settings, args: &AwsArgs) -> AppResult<()> {
    let credentials_path = match &args.credentials_file {
        Some(path) => path.clone(),
        None => storage::credentials_path()?,
    };
    let destination = Destination::resolve(
        args.target,
        args.profile.as_deref(),
        settings,
        &credentials_path,
    );
    let duration = args.duration.or(settings.duration_seconds);

    let request = source::gather(args.source, args.serial_number.as_deref(), settings, runner)?;
    let credentials = sts::get_session_token(runner, &request, duration)?;
    store(runner, &destination, &credentials)?;

    match &destination {
        Destination::File { path, profile } => {
            info!("credentials file: {}", path.display());
            println!(
                "{} [{}] {} {}",
                "updated profile".green(),
                profile,
                "expires".green(),
                credentials.expiration
            );
        }
        Destination::OnePassword(item) => println!(
            "{} '{}' {} {}",
            "AWS credentials have been refreshed in".green(),
            item.item,
            "expires".green(),
            credentials.expiration
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::exec::fake::ScriptedRunner;

    const RESPONSE: &str = r#"{"Credentials": {
        "AccessKeyId": "ASIATEMP",
        "SecretAccessKey": "tempsecret",
        "SessionToken": "token",
        "Expiration": "2026-10-17T06:00:00+00:00"
    }}"#;

    const MANAGEMENT_ITEM: &str = r#"{"fields": [
        {"label": "AccessKeyId", "value": "AKIAEXAMPLE"},
        {"label": "SecretAccessKey", "value": "longtermsecret"},
        {"label": "SerialNumber", "value": "arn:aws:iam::123456789012:mfa/dev"},
        {"label": "one-time password", "totp": "654321"}
    ]}"#;

    fn args(target: Target, credentials_file: &Path) -> AwsArgs {
        AwsArgs {
            source: source::Source::OnePassword,
            target,
            profile: None,
            serial_number: None,
            duration: None,
            credentials_file: Some(credentials_file.to_path_buf()),
        }
    }

    #[test]
    fn profile_flag_overrides_settings() {
        let settings = Settings {
            profile: Some("work".to_string()),
            ..Settings::default()
        };
        let path = Path::new("/tmp/credentials");
        assert_eq!(
            Destination::resolve(Target::File, Some("ci"), &settings, path),
            Destination::File {
                path,
                profile: "ci".to_string()
            }
        );
        assert_eq!(
            Destination::resolve(Target::File, None, &settings, path),
            Destination::File {
                path,
                profile: "work".to_string()
            }
        );
    }

    #[test]
    fn refreshes_file_profile_from_one_password() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials");
        fs::write(&path, "[default]\naws_access_key_id = OLD\n[other]\nfoo = 1\n").expect("seed");

        let runner = ScriptedRunner::new([MANAGEMENT_ITEM, RESPONSE]);
        refresh(&runner, &Settings::default(), &args(Target::File, &path)).expect("refresh");

        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "[default]\naws_access_key_id = ASIATEMP\naws_secret_access_key = tempsecret\naws_session_token = token\n\n[other]\nfoo = 1\n"
        );

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, "op");
        assert_eq!(calls[1].program, "aws");
        assert!(calls[1].args.contains(&"654321".to_string()));
    }

    #[test]
    fn refreshes_one_password_item() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials");

        let runner = ScriptedRunner::new([MANAGEMENT_ITEM, RESPONSE, ""]);
        refresh(&runner, &Settings::default(), &args(Target::OnePassword, &path))
            .expect("refresh");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].args[..3], ["item", "edit", "AWS Temp Cred"]);
        assert!(!path.exists());
    }

    #[test]
    fn sts_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials");
        fs::write(&path, "[default]\naws_access_key_id = OLD\n").expect("seed");

        let runner = ScriptedRunner::new([MANAGEMENT_ITEM, "not json"]);
        assert!(refresh(&runner, &Settings::default(), &args(Target::File, &path)).is_err());
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "[default]\naws_access_key_id = OLD\n"
        );
    }
}
