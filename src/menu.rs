use colored::Colorize;
use inquire::Select;

use crate::error::{AppError, AppResult};

/// Arrow-key menu over the identities; Esc yields [`AppError::Canceled`]
pub fn select_identity(identities: &[String]) -> AppResult<String> {
    let prompt = format!("{}", "select identity (esc to quit):".blue());
    Select::new(&prompt, identities.to_vec())
        .with_page_size(15)
        .prompt()
        .map_err(AppError::from_prompt)
}
