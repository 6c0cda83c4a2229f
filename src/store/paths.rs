//! Filesystem layout resolution (§6).

use std::path::PathBuf;

use crate::config::{APP_DIR_NAME, CONFIG_FILE_NAME, LEGACY_SETTINGS_FILE, LEGACY_VAULTS_FILE};
use crate::error::{CoreError, Result};

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| CoreError::FileAccessFailed {
        path: PathBuf::from("$HOME"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "could not resolve home directory"),
    })
}

pub fn app_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(APP_DIR_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn legacy_settings_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(LEGACY_SETTINGS_FILE))
}

pub fn legacy_vaults_path() -> Result<PathBuf> {
    Ok(home_dir()?.join(LEGACY_VAULTS_FILE))
}

pub fn backup_path(original: &std::path::Path) -> PathBuf {
    let mut name = original.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}
