use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

use credkit::{cli::Cli, error::AppError};

/// Log level for the given number of `-v` flags; `RUST_LOG` still wins
fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(level_for(cli.verbose))
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match credkit::run(cli) {
        Ok(()) => {}
        Err(AppError::Canceled) => {
            eprintln!("{}", "canceled".yellow());
            std::process::exit(130);
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            std::process::exit(1);
        }
    }
}
