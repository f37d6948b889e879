use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    /// External program could not be started
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// External program exited with a failure status
    #[error("`{program}` failed: {stderr}")]
    Command { program: String, stderr: String },
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Missing or unusable configuration
    #[error("configuration error: {0}")]
    Config(String),
    /// User backed out of an interactive prompt
    #[error("canceled")]
    Canceled,
}

impl AppError {
    /// Maps prompt cancellation (Esc / Ctrl-C) onto [`AppError::Canceled`]
    pub fn from_prompt(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => Self::Canceled,
            other => Self::Inquire(other),
        }
    }
}
