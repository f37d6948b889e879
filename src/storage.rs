use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    config::{self, env_var},
    error::AppResult,
    profile,
};

/// Standard override for the shared credentials file location
pub const CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Gets the path to the shared AWS credentials file
pub fn credentials_path() -> AppResult<PathBuf> {
    if let Some(path) = env_var(CREDENTIALS_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(config::home_dir()?.join(".aws").join("credentials"))
}

/// Reads the credentials file; a missing file reads as empty
pub fn read_credentials(path: &Path) -> AppResult<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            Ok(String::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Overwrites the credentials file in full, owner-readable only on Unix
///
/// # Arguments
/// * `path` - Credentials file location
/// * `contents` - Complete new file text
pub fn write_credentials(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Replaces or appends one profile block in the credentials file
///
/// # Arguments
/// * `path` - Credentials file location
/// * `profile_name` - Profile to rewrite, e.g. `default`
/// * `fields` - Key/value lines for the profile, in order
pub fn update_profile<K, V>(path: &Path, profile_name: &str, fields: &[(K, V)]) -> AppResult<()>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let current = read_credentials(path)?;
    let updated = profile::merge(&current, profile_name, fields);
    write_credentials(path, &updated)?;
    info!("wrote profile [{profile_name}] to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let contents = read_credentials(&dir.path().join("credentials")).expect("read");
        assert!(contents.is_empty());
    }

    #[test]
    fn creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".aws").join("credentials");

        update_profile(&path, "default", &[("aws_access_key_id", "AKIA1")]).expect("update");

        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "\n[default]\naws_access_key_id = AKIA1\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials");
        write_credentials(&path, "[default]\n").expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
