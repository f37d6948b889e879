use log::info;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::exec::{CommandRunner, CommandSpec};
use crate::sts::{AccessKeys, MfaRequest, SessionCredentials};

const ACCESS_KEY_LABEL: &str = "AccessKeyId";
const SECRET_KEY_LABEL: &str = "SecretAccessKey";
const SERIAL_LABEL: &str = "SerialNumber";
const SESSION_TOKEN_LABEL: &str = "SessionToken";
const OTP_LABEL: &str = "one-time password";

/// Location of an item inside a 1Password vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub item: String,
    pub vault: String,
}

#[derive(Debug, Deserialize)]
struct ItemDocument {
    #[serde(default)]
    fields: Vec<ItemField>,
}

#[derive(Debug, Deserialize)]
struct ItemField {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    totp: Option<String>,
}

/// Extracts long-term keys, MFA serial and the current one-time code from
/// the JSON printed by `op item get --format json`
pub fn parse_management_item(raw: &str) -> AppResult<MfaRequest> {
    let document: ItemDocument = serde_json::from_str(raw)?;

    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut serial_number = None;
    let mut token_code = None;

    for field in document.fields {
        match field.label.as_deref() {
            Some(ACCESS_KEY_LABEL) => access_key_id = field.value,
            Some(SECRET_KEY_LABEL) => secret_access_key = field.value,
            Some(SERIAL_LABEL) => serial_number = field.value,
            Some(OTP_LABEL) => token_code = field.totp,
            _ => {}
        }
    }

    Ok(MfaRequest {
        keys: AccessKeys {
            access_key_id: required(access_key_id, ACCESS_KEY_LABEL)?,
            secret_access_key: required(secret_access_key, SECRET_KEY_LABEL)?,
        },
        serial_number: required(serial_number, SERIAL_LABEL)?,
        token_code: required(token_code, OTP_LABEL)?,
    })
}

fn required(value: Option<String>, label: &str) -> AppResult<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("1Password item has no '{label}' field")))
}

/// Reads the management credentials item
pub fn fetch_management_credentials(
    runner: &impl CommandRunner,
    item: &ItemRef,
) -> AppResult<MfaRequest> {
    let spec = CommandSpec::new("op")
        .args(["item", "get"])
        .arg(&item.item)
        .arg("--vault")
        .arg(&item.vault)
        .args(["--format", "json"])
        .inherit_stdin();
    let stdout = runner.run(&spec)?;
    info!("read '{}' from 1Password vault '{}'", item.item, item.vault);
    parse_management_item(&stdout)
}

/// Builds the `op item edit` call that stores fresh session credentials
pub fn store_command(item: &ItemRef, credentials: &SessionCredentials) -> CommandSpec {
    CommandSpec::new("op")
        .args(["item", "edit"])
        .arg(&item.item)
        .arg("--vault")
        .arg(&item.vault)
        .arg(format!("{ACCESS_KEY_LABEL}={}", credentials.access_key_id))
        .arg(format!("{SECRET_KEY_LABEL}={}", credentials.secret_access_key))
        .arg(format!("{SESSION_TOKEN_LABEL}={}", credentials.session_token))
        .inherit_stdin()
}

/// Writes session credentials into the temporary credentials item
pub fn store_session_credentials(
    runner: &impl CommandRunner,
    item: &ItemRef,
    credentials: &SessionCredentials,
) -> AppResult<()> {
    runner.run(&store_command(item, credentials))?;
    info!("updated '{}' in 1Password vault '{}'", item.item, item.vault);
    Ok(())
}
