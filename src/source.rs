//! Where the long-term keys, MFA serial and one-time code come from.

use clap::ValueEnum;
use log::info;

use crate::{
    config::{Settings, env_var, non_empty},
    error::{AppError, AppResult},
    exec::CommandRunner,
    onepassword::{self, ItemRef},
    sts::{AccessKeys, MfaRequest},
    validation::{
        prompt_secret_until_valid, prompt_until_valid, validate_access_key_id,
        validate_mfa_token, validate_secret_access_key, validate_serial_number,
    },
};

pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const MFA_SERIAL_ENV: &str = "AWS_MFA_SERIAL";
pub const MFA_TOKEN_ENV: &str = "AWS_MFA_TOKEN";

/// Input source for an STS session request
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Read keys from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
    Env,
    /// Ask for everything on the terminal
    Prompt,
    /// Read the management item from 1Password
    #[value(name = "op")]
    OnePassword,
}

/// Resolves a value the user may supply on the command line, in the
/// settings file, or not at all.
fn preset_serial(flag: Option<&str>, settings: &Settings) -> Option<String> {
    non_empty(flag)
        .or_else(|| non_empty(settings.mfa_serial.as_deref()))
        .map(str::to_string)
}

/// Gathers an [`MfaRequest`] from the selected source
///
/// # Arguments
/// * `source` - Where keys and token come from
/// * `serial_flag` - `--serial-number` value, if given
/// * `settings` - Loaded settings file
/// * `runner` - Used for the 1Password CLI
pub fn gather(
    source: Source,
    serial_flag: Option<&str>,
    settings: &Settings,
    runner: &impl CommandRunner,
) -> AppResult<MfaRequest> {
    let request = match source {
        Source::Env => from_env(serial_flag, settings, env_var)?,
        Source::Prompt => from_prompt(serial_flag, settings)?,
        Source::OnePassword => {
            let item = ItemRef {
                item: settings.op_management_item(),
                vault: settings.op_vault(),
            };
            let mut request = onepassword::fetch_management_credentials(runner, &item)?;
            if let Some(serial) = non_empty(serial_flag) {
                request.serial_number = serial.to_string();
            }
            request
        }
    };
    info!("using MFA device {}", request.serial_number);
    Ok(request)
}

/// Reads keys and serial from the environment; the one-time code falls back
/// to a prompt when `AWS_MFA_TOKEN` is unset
///
/// `lookup` stands in for `std::env::var` so the resolution order can be
/// exercised without touching the process environment.
pub fn from_env<L>(
    serial_flag: Option<&str>,
    settings: &Settings,
    lookup: L,
) -> AppResult<MfaRequest>
where
    L: Fn(&str) -> Option<String>,
{
    let require = |key: &str| {
        lookup(key)
            .ok_or_else(|| AppError::Config(format!("environment variable {key} is not set")))
    };

    let keys = AccessKeys {
        access_key_id: require(ACCESS_KEY_ENV)?,
        secret_access_key: require(SECRET_KEY_ENV)?,
    };

    let serial_number = match non_empty(serial_flag) {
        Some(serial) => serial.to_string(),
        None => match lookup(MFA_SERIAL_ENV) {
            Some(serial) => serial,
            None => preset_serial(None, settings).ok_or_else(|| {
                AppError::Config(format!(
                    "no MFA serial: pass --serial-number, set {MFA_SERIAL_ENV}, or add mfa_serial to the settings file"
                ))
            })?,
        },
    };
    validate_serial_number(&serial_number)?;

    let token_code = match lookup(MFA_TOKEN_ENV) {
        Some(token) => {
            validate_mfa_token(token.trim())?;
            token.trim().to_string()
        }
        None => prompt_until_valid("Enter MFA token:", validate_mfa_token)?,
    };

    Ok(MfaRequest {
        keys,
        serial_number,
        token_code,
    })
}

/// Asks for token, access key, secret key and, if not configured, the serial
pub fn from_prompt(serial_flag: Option<&str>, settings: &Settings) -> AppResult<MfaRequest> {
    let token_code = prompt_until_valid("Enter MFA token:", validate_mfa_token)?;
    let access_key_id = prompt_until_valid("Enter AWS access key:", validate_access_key_id)?;
    let secret_access_key =
        prompt_secret_until_valid("Enter AWS secret access key:", validate_secret_access_key)?;

    let serial_number = match preset_serial(serial_flag, settings) {
        Some(serial) => serial,
        None => prompt_until_valid("Enter MFA serial number:", validate_serial_number)?,
    };

    Ok(MfaRequest {
        keys: AccessKeys {
            access_key_id,
            secret_access_key,
        },
        serial_number,
        token_code,
    })
}
