use log::info;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::exec::{CommandRunner, CommandSpec};

/// Shortest session STS will issue, in seconds
pub const MIN_DURATION_SECONDS: u32 = 900;
/// Longest session STS will issue for an IAM user, in seconds
pub const MAX_DURATION_SECONDS: u32 = 129_600;

/// Long-term IAM user keys used to call STS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Everything `get-session-token` needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaRequest {
    pub keys: AccessKeys,
    /// MFA device serial number (ARN)
    pub serial_number: String,
    /// Current one-time code
    pub token_code: String,
}

/// Temporary credentials returned by STS
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
}

impl SessionCredentials {
    /// Fields as written into a credentials file profile
    pub fn profile_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("aws_access_key_id", self.access_key_id.as_str()),
            ("aws_secret_access_key", self.secret_access_key.as_str()),
            ("aws_session_token", self.session_token.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSessionTokenResponse {
    credentials: SessionCredentials,
}

/// Checks a requested session length against the limits STS accepts
pub fn validate_duration(seconds: u32) -> AppResult<u32> {
    if (MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(AppError::Validation(format!(
            "session duration must be between {MIN_DURATION_SECONDS} and {MAX_DURATION_SECONDS} seconds, got {seconds}"
        )))
    }
}

/// Builds the `aws sts get-session-token` invocation
///
/// Keys are handed to the child explicitly and any session token or profile
/// selection inherited from the shell is stripped, so an expired session
/// cannot shadow the long-term keys.
pub fn session_token_command(request: &MfaRequest, duration: Option<u32>) -> CommandSpec {
    let mut spec = CommandSpec::new("aws")
        .args(["sts", "get-session-token"])
        .arg("--serial-number")
        .arg(&request.serial_number)
        .arg("--token-code")
        .arg(&request.token_code)
        .args(["--output", "json"])
        .env("AWS_ACCESS_KEY_ID", &request.keys.access_key_id)
        .env("AWS_SECRET_ACCESS_KEY", &request.keys.secret_access_key)
        .env_remove("AWS_SESSION_TOKEN")
        .env_remove("AWS_PROFILE");

    if let Some(seconds) = duration {
        spec = spec.arg("--duration-seconds").arg(seconds.to_string());
    }
    spec
}

/// Decodes the JSON body printed by `get-session-token`
pub fn parse_session_token_response(raw: &str) -> AppResult<SessionCredentials> {
    let response: GetSessionTokenResponse = serde_json::from_str(raw)?;
    Ok(response.credentials)
}

/// Exchanges long-term keys plus an MFA code for session credentials
pub fn get_session_token(
    runner: &impl CommandRunner,
    request: &MfaRequest,
    duration: Option<u32>,
) -> AppResult<SessionCredentials> {
    let duration = duration.map(validate_duration).transpose()?;
    let stdout = runner.run(&session_token_command(request, duration))?;
    let credentials = parse_session_token_response(&stdout)?;
    info!("session credentials issued, expiring {}", credentials.expiration);
    Ok(credentials)
}
