pub mod aws;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod menu;
pub mod onepassword;
pub mod profile;
pub mod source;
pub mod ssh;
pub mod storage;
pub mod sts;
pub mod validation;

use std::path::Path;

use cli::{Cli, Commands, ConfigCommand};
use error::AppResult;
use exec::SystemRunner;

/// Dispatches a parsed command line
pub fn run(cli: Cli) -> AppResult<()> {
    let settings_path = config::settings_path()?;

    match cli.command {
        Commands::Aws(args) => {
            let settings = config::load(&settings_path)?;
            aws::refresh(&SystemRunner, &settings, &args)
        }
        Commands::Ssh(args) => {
            let settings = config::load(&settings_path)?;
            ssh::select_and_add(&SystemRunner, &settings, &args)
        }
        Commands::Config { command } => {
            println!("{}", render_config(&command, &settings_path)?);
            Ok(())
        }
    }
}

/// Output of `credkit config`. `path` never reads the file, so it still
/// works when the file is broken.
pub fn render_config(command: &ConfigCommand, settings_path: &Path) -> AppResult<String> {
    match command {
        ConfigCommand::Path => Ok(settings_path.display().to_string()),
        ConfigCommand::Show => {
            let settings = config::load(settings_path)?;
            Ok(serde_json::to_string_pretty(&settings.effective()?)?)
        }
    }
}
