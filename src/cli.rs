use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{aws::Target, source::Source};

/// CLI arguments parser using `clap`
#[derive(Parser, Debug)]
#[command(
    name = "credkit",
    version,
    about = "Refresh AWS MFA session credentials and pick SSH identities"
)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Subcommand chosen to execute
    #[command(subcommand)]
    pub command: Commands,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetches MFA session credentials from STS and stores them
    Aws(AwsArgs),
    /// Starts an ssh-agent and adds the selected identity
    Ssh(SshArgs),
    /// Inspects the settings file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
pub struct AwsArgs {
    /// Where long-term keys and the MFA code come from
    #[arg(long, value_enum, default_value_t = Source::Prompt)]
    pub source: Source,
    /// Where the session credentials are written
    #[arg(long, value_enum, default_value_t = Target::File)]
    pub target: Target,
    /// Credentials file profile to write (default from settings, else `default`)
    #[arg(long)]
    pub profile: Option<String>,
    /// MFA device serial number (ARN)
    #[arg(long)]
    pub serial_number: Option<String>,
    /// Session length in seconds (900-129600)
    #[arg(long)]
    pub duration: Option<u32>,
    /// Credentials file to update (default $AWS_SHARED_CREDENTIALS_FILE, else ~/.aws/credentials)
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SshArgs {
    /// Identity file name inside the SSH directory; omit for a menu
    pub identity: Option<String>,
    /// Directory holding identities (default ~/.ssh)
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Print `export` lines for the new agent on stdout
    #[arg(long)]
    pub print_env: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Prints the settings file location
    Path,
    /// Prints the effective settings as JSON
    Show,
}
