use colored::Colorize;
use inquire::{Password, PasswordDisplayMode, Text};
use validator::ValidateLength;

use crate::error::{AppError, AppResult};

/// Number of digits in an MFA one-time code
const MFA_TOKEN_LENGTH: u64 = 6;
/// Shortest access key id IAM issues
const MIN_ACCESS_KEY_LENGTH: u64 = 16;
/// Longest access key id IAM issues
const MAX_ACCESS_KEY_LENGTH: u64 = 128;

/// Prompts user for input until valid input is provided
///
/// Validation failures are printed and the prompt repeats. Any other error,
/// including the user cancelling, is returned.
pub fn prompt_until_valid<F>(prompt_message: &str, input_validation: F) -> AppResult<String>
where
    F: Fn(&str) -> AppResult<()>,
{
    loop {
        let input = Text::new(prompt_message)
            .prompt()
            .map_err(AppError::from_prompt)?;
        if let Some(value) = accept(&input, &input_validation)? {
            break Ok(value);
        }
    }
}

/// Same as [`prompt_until_valid`] with the typed characters masked
pub fn prompt_secret_until_valid<F>(prompt_message: &str, input_validation: F) -> AppResult<String>
where
    F: Fn(&str) -> AppResult<()>,
{
    loop {
        let input = Password::new(prompt_message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map_err(AppError::from_prompt)?;
        if let Some(value) = accept(&input, &input_validation)? {
            break Ok(value);
        }
    }
}

/// Trims and validates one answer; `None` means "ask again"
fn accept<F>(input: &str, input_validation: &F) -> AppResult<Option<String>>
where
    F: Fn(&str) -> AppResult<()>,
{
    let input = input.trim();
    match input_validation(input) {
        Ok(()) => Ok(Some(input.to_string())),
        Err(AppError::Validation(msg)) => {
            eprintln!("{}", msg.red());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// Validate input helper functions

/// Validates an MFA one-time code
pub fn validate_mfa_token(token: &str) -> AppResult<()> {
    if token.is_empty() {
        Err(AppError::Validation("mfa token is required".to_string()))
    } else if !token.to_string().validate_length(None, None, Some(MFA_TOKEN_LENGTH))
        || !token.chars().all(|c| c.is_ascii_digit())
    {
        Err(AppError::Validation(format!(
            "mfa token must be {MFA_TOKEN_LENGTH} digits"
        )))
    } else {
        Ok(())
    }
}

/// Validates an AWS access key id
pub fn validate_access_key_id(key: &str) -> AppResult<()> {
    if key.is_empty() {
        Err(AppError::Validation("AWS access key is required".to_string()))
    } else if !key.to_string().validate_length(
        Some(MIN_ACCESS_KEY_LENGTH),
        Some(MAX_ACCESS_KEY_LENGTH),
        None,
    ) {
        Err(AppError::Validation(format!(
            "AWS access key must be {MIN_ACCESS_KEY_LENGTH} to {MAX_ACCESS_KEY_LENGTH} characters"
        )))
    } else if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        Err(AppError::Validation(
            "AWS access key may only contain letters and digits".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validates an AWS secret access key
pub fn validate_secret_access_key(secret: &str) -> AppResult<()> {
    if secret.is_empty() {
        Err(AppError::Validation("AWS secret access key is required".to_string()))
    } else {
        Ok(())
    }
}

/// Validates an MFA device serial number
pub fn validate_serial_number(serial: &str) -> AppResult<()> {
    if serial.is_empty() {
        Err(AppError::Validation("MFA serial number is required".to_string()))
    } else if serial.chars().any(char::is_whitespace) {
        Err(AppError::Validation(
            "MFA serial number cannot contain whitespace".to_string(),
        ))
    } else {
        Ok(())
    }
}
