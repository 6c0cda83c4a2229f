//! Encrypted Config Store (component C4 of the specification).
//!
//! `config.enc` holds the AEAD seal, under the Master Key, of the
//! JSON-encoded [`Config`]. [`load`] and [`save`] are the only operations
//! that touch the file; `save` always goes through a temp-file-then-rename
//! so a crash mid-write leaves either the old or the new config intact,
//! never a partial blob (§5's shared-resource discipline).

pub mod migrate;
mod paths;

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::aead;
use crate::config::{CONFIG_VERSION, KEY_LEN};
use crate::error::{CoreError, Result};
use crate::mnemonic::{self, Mnemonic};
use crate::secret::DataKey;

/// A named bundle of S3 connection settings (§3).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub name: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

/// Optional global defaults, used when no vault is active (§3).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
}

/// The structured record sealed inside `config.enc` (§3).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: u32,
    /// Hex-free raw bytes; JSON-serialized as a plain byte array. Must be
    /// exactly [`KEY_LEN`] bytes — checked on load.
    pub data_key: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_vault_name: Option<String>,
    #[serde(default)]
    pub vaults: Vec<Vault>,
    #[serde(default)]
    pub settings: AppSettings,
}

impl Config {
    #[must_use]
    pub fn fresh(data_key: &DataKey) -> Self {
        Self {
            version: CONFIG_VERSION,
            data_key: data_key.expose().to_vec(),
            active_vault_name: None,
            vaults: Vec::new(),
            settings: AppSettings::default(),
        }
    }

    /// Looks up a vault, returning `VaultNotFound` if `name` does not exist.
    pub fn vault(&self, name: &str) -> Result<&Vault> {
        self.vaults.iter().find(|v| v.name == name).ok_or_else(|| CoreError::VaultNotFound(name.to_string()))
    }

    fn data_key(&self) -> Result<DataKey> {
        if self.data_key.len() != KEY_LEN {
            return Err(CoreError::IntegrityCheckFailed(format!("dataKey has {} bytes, expected {KEY_LEN}", self.data_key.len())));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&self.data_key);
        Ok(DataKey::new(bytes))
    }
}

fn random_key() -> [u8; KEY_LEN] {
    let mut bytes = [0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

async fn ensure_app_dir() -> Result<std::path::PathBuf> {
    let dir = paths::app_dir()?;
    tokio::fs::create_dir_all(&dir).await.map_err(|e| CoreError::file_access(&dir, e))?;
    tokio::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
        .await
        .map_err(|e| CoreError::file_access(&dir, e))?;
    Ok(dir)
}

/// Loads the encrypted configuration, deriving the Master Key from
/// `mnemonic`. Bootstraps a fresh empty configuration (or runs legacy
/// migration) if none exists yet (§4.4).
pub async fn load(mnemonic: &Mnemonic) -> Result<(Config, DataKey)> {
    ensure_app_dir().await?;
    let path = paths::config_path()?;

    if !path.exists() {
        let legacy_settings = paths::legacy_settings_path()?;
        let legacy_vaults = paths::legacy_vaults_path()?;
        if legacy_settings.exists() || legacy_vaults.exists() {
            return migrate::migrate(mnemonic).await;
        }

        let data_key = DataKey::new(random_key());
        let config = Config::fresh(&data_key);
        save(&config, mnemonic).await?;
        return Ok((config, data_key));
    }

    let blob = tokio::fs::read(&path).await.map_err(|e| CoreError::file_access(&path, e))?;
    let master = mnemonic::derive_master_key(mnemonic);
    let plaintext = aead::open(master.expose(), &blob).map_err(|_| CoreError::DecryptionFailed)?;
    let config: Config =
        serde_json::from_slice(&plaintext).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))?;

    if config.version > CONFIG_VERSION {
        return Err(CoreError::UnsupportedVersion(config.version));
    }

    let data_key = config.data_key()?;
    Ok((config, data_key))
}

/// Seals `config` under the Master Key derived from `mnemonic` and
/// atomically rewrites `config.enc` (§4.4).
pub async fn save(config: &Config, mnemonic: &Mnemonic) -> Result<()> {
    ensure_app_dir().await?;
    let master = mnemonic::derive_master_key(mnemonic);
    let json = serde_json::to_vec(config).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))?;
    let blob = aead::seal(master.expose(), &json);
    atomic_write(&paths::config_path()?, &blob).await
}

/// Re-wraps the Config under a new mnemonic; the `dataKey` field is copied
/// verbatim so existing stored objects remain decryptable (§4.4).
pub async fn rotate_master(old_mnemonic: &Mnemonic, new_mnemonic: &Mnemonic) -> Result<()> {
    let (config, _) = load(old_mnemonic).await?;
    save(&config, new_mnemonic).await
}

/// The resolved path of `config.enc`, for display purposes. Does not touch
/// the filesystem or require a mnemonic.
pub fn config_file_path() -> Result<std::path::PathBuf> {
    paths::config_path()
}

async fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().expect("config path always has a parent directory");
    let tmp_path = dir.join(format!(".{}.tmp", std::process::id()));

    let mut file = tokio::fs::File::create(&tmp_path).await.map_err(|e| CoreError::file_access(&tmp_path, e))?;
    file.write_all(contents).await.map_err(|e| CoreError::file_access(&tmp_path, e))?;
    file.sync_all().await.map_err(|e| CoreError::file_access(&tmp_path, e))?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await.map_err(|e| CoreError::file_access(path, e))?;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| CoreError::file_access(path, e))?;
    Ok(())
}
