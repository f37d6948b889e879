use std::{
    env, fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Directory under the platform config dir holding the settings file
const APP_DIR: &str = "credkit";
/// Settings file name
const SETTINGS_FILE: &str = "config.json";
/// Overrides the settings file location
pub const CONFIG_ENV: &str = "CREDKIT_CONFIG";

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_OP_VAULT: &str = "Employee";
pub const DEFAULT_OP_MANAGEMENT_ITEM: &str = "AWS Mgmt Cred";
pub const DEFAULT_OP_SESSION_ITEM: &str = "AWS Temp Cred";

/// Optional defaults read from the settings file. No secrets live here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Credentials file profile to write
    pub profile: Option<String>,
    /// MFA device serial number (ARN)
    pub mfa_serial: Option<String>,
    /// Requested session length in seconds
    pub duration_seconds: Option<u32>,
    pub op_vault: Option<String>,
    pub op_management_item: Option<String>,
    pub op_session_item: Option<String>,
    /// Directory holding SSH identities
    pub ssh_dir: Option<PathBuf>,
}

impl Settings {
    pub fn profile(&self) -> String {
        non_empty(self.profile.as_deref()).unwrap_or(DEFAULT_PROFILE).to_string()
    }

    pub fn op_vault(&self) -> String {
        non_empty(self.op_vault.as_deref()).unwrap_or(DEFAULT_OP_VAULT).to_string()
    }

    pub fn op_management_item(&self) -> String {
        non_empty(self.op_management_item.as_deref())
            .unwrap_or(DEFAULT_OP_MANAGEMENT_ITEM)
            .to_string()
    }

    pub fn op_session_item(&self) -> String {
        non_empty(self.op_session_item.as_deref())
            .unwrap_or(DEFAULT_OP_SESSION_ITEM)
            .to_string()
    }

    /// Copy with every default filled in, as shown by `credkit config show`
    pub fn effective(&self) -> AppResult<Self> {
        Ok(Self {
            profile: Some(self.profile()),
            mfa_serial: non_empty(self.mfa_serial.as_deref()).map(str::to_string),
            duration_seconds: self.duration_seconds,
            op_vault: Some(self.op_vault()),
            op_management_item: Some(self.op_management_item()),
            op_session_item: Some(self.op_session_item()),
            ssh_dir: Some(self.ssh_dir()?),
        })
    }

    /// SSH identity directory, `~/.ssh` unless configured
    pub fn ssh_dir(&self) -> AppResult<PathBuf> {
        match &self.ssh_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join(".ssh")),
        }
    }
}

/// Treats blank strings the same as unset
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Non-empty environment variable lookup
pub fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| AppError::Config("failed to find the home directory".to_string()))
}

/// Gets the path to the settings file
pub fn settings_path() -> AppResult<PathBuf> {
    if let Some(path) = env_var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_root = dirs::config_dir()
        .ok_or_else(|| AppError::Config("unable to resolve config directory".to_string()))?;
    Ok(config_root.join(APP_DIR).join(SETTINGS_FILE))
}

/// Loads settings, falling back to defaults when the file does not exist
pub fn load(path: &Path) -> AppResult<Settings> {
    if !path.exists() {
        debug!("no settings file at {}", path.display());
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings = serde_json::from_str(&raw).map_err(|err| {
        AppError::Config(format!("invalid settings file {}: {err}", path.display()))
    })?;
    debug!("loaded settings from {}", path.display());
    Ok(settings)
}
