use std::{fs, path::PathBuf};

use clap::Parser;
use credkit::cli::{Cli, ConfigCommand};
use credkit::config::{self, CONFIG_ENV};
use credkit::error::AppError;
use credkit::storage::{self, CREDENTIALS_FILE_ENV};

// Environment overrides are process-wide, so every case that sets one lives
// in this single test.
#[test]
fn environment_overrides_and_config_commands() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings_file = dir.path().join("settings.json");
    let credentials_file = dir.path().join("aws-credentials");

    unsafe {
        std::env::set_var(CONFIG_ENV, &settings_file);
        std::env::set_var(CREDENTIALS_FILE_ENV, &credentials_file);
    }

    assert_eq!(config::settings_path().expect("settings path"), settings_file);
    assert_eq!(storage::credentials_path().expect("credentials path"), credentials_file);

    // a broken settings file must not hide its own location
    fs::write(&settings_file, "{not json").expect("write settings");
    let cli = Cli::try_parse_from(["credkit", "config", "path"]).expect("cli parse should work");
    credkit::run(cli).expect("config path ignores file contents");
    assert_eq!(
        credkit::render_config(&ConfigCommand::Path, &settings_file).expect("render path"),
        settings_file.display().to_string()
    );

    let cli = Cli::try_parse_from(["credkit", "config", "show"]).expect("cli parse should work");
    assert!(matches!(credkit::run(cli), Err(AppError::Config(_))));

    fs::write(
        &settings_file,
        r#"{"profile": "work", "ssh_dir": "/keys", "duration_seconds": 3600}"#,
    )
    .expect("write settings");
    let shown: serde_json::Value = serde_json::from_str(
        &credkit::render_config(&ConfigCommand::Show, &settings_file).expect("render show"),
    )
    .expect("show prints json");
    assert_eq!(shown["profile"], "work");
    assert_eq!(shown["op_vault"], "Employee");
    assert_eq!(shown["duration_seconds"], 3600);
    assert_eq!(PathBuf::from(shown["ssh_dir"].as_str().expect("ssh_dir")), PathBuf::from("/keys"));

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var(CREDENTIALS_FILE_ENV);
    }
}
