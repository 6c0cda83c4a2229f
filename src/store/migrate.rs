//! Legacy-format migration (§4.4).
//!
//! Lifts a plaintext `~/.cybs3.json` settings file and/or an AEAD-sealed
//! `~/.cybs3.vaults` file (sealed under the *directly* derived key, with no
//! two-tier Master/Data split) into the current [`Config`] format. The
//! post-migration Data Key is set to `derive_master_key(mnemonic)` itself —
//! not a fresh random key — so objects uploaded before the migration, which
//! were encrypted under that directly-derived key, remain decryptable. This
//! is the asymmetry documented as an open question in §9: for migrated
//! installs, rotating the mnemonic changes which key decrypts old objects,
//! because the "Data Key" was in fact derived from the old mnemonic.

use serde::Deserialize;

use crate::aead;
use crate::error::{CoreError, Result};
use crate::mnemonic::{self, Mnemonic};
use crate::secret::DataKey;

use super::{save, AppSettings, Config, Vault};

#[derive(Deserialize, Default)]
struct LegacySettings {
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    bucket: Option<String>,
}

#[derive(Deserialize)]
struct LegacyVault {
    name: String,
    endpoint: String,
    #[serde(rename = "accessKey")]
    access_key: String,
    #[serde(rename = "secretKey")]
    secret_key: String,
    region: String,
}

#[derive(Deserialize)]
struct LegacyVaultsFile {
    #[allow(dead_code)]
    version: u32,
    vaults: Vec<LegacyVault>,
}

impl From<LegacyVault> for Vault {
    fn from(v: LegacyVault) -> Self {
        Vault { name: v.name, endpoint: v.endpoint, access_key: v.access_key, secret_key: v.secret_key, region: v.region, bucket: None }
    }
}

pub async fn migrate(mnemonic: &Mnemonic) -> Result<(Config, DataKey)> {
    let settings_path = super::paths::legacy_settings_path()?;
    let vaults_path = super::paths::legacy_vaults_path()?;

    let mut settings = AppSettings::default();
    if settings_path.exists() {
        let raw = tokio::fs::read(&settings_path).await.map_err(|e| CoreError::file_access(&settings_path, e))?;
        let legacy: LegacySettings = serde_json::from_slice(&raw).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))?;
        settings.default_region = legacy.region;
        settings.default_bucket = legacy.bucket;
    }

    let mut vaults = Vec::new();
    if vaults_path.exists() {
        let raw = tokio::fs::read(&vaults_path).await.map_err(|e| CoreError::file_access(&vaults_path, e))?;
        let derived = mnemonic::derive_master_key(mnemonic);
        let plaintext = aead::open(derived.expose(), &raw).map_err(|_| CoreError::DecryptionFailed)?;
        let legacy: LegacyVaultsFile = serde_json::from_slice(&plaintext).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))?;
        vaults = legacy.vaults.into_iter().map(Vault::from).collect();
    }

    let derived = mnemonic::derive_master_key(mnemonic);
    let data_key = DataKey::new(*derived.expose());

    let config = Config { version: crate::config::CONFIG_VERSION, data_key: data_key.expose().to_vec(), active_vault_name: None, vaults, settings };

    save(&config, mnemonic).await?;

    if settings_path.exists() {
        let backup = super::paths::backup_path(&settings_path);
        tokio::fs::rename(&settings_path, &backup).await.map_err(|e| CoreError::file_access(&settings_path, e))?;
    }
    if vaults_path.exists() {
        let backup = super::paths::backup_path(&vaults_path);
        tokio::fs::rename(&vaults_path, &backup).await.map_err(|e| CoreError::file_access(&vaults_path, e))?;
    }

    Ok((config, data_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static HOME_LOCK: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn migrates_settings_and_vaults_preserving_decryptability() {
        let _guard = HOME_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("HOME", dir.path()) };

        let mnemonic = mnemonic::generate_mnemonic().unwrap();

        let settings_path = dir.path().join(".cybs3.json");
        tokio::fs::write(&settings_path, br#"{"region":"eu-west-1","bucket":"b"}"#).await.unwrap();

        let legacy_vaults_json = br#"{"version":1,"vaults":[{"name":"v","endpoint":"e","accessKey":"a","secretKey":"s","region":"r"}]}"#;
        let derived = mnemonic::derive_master_key(&mnemonic);
        let sealed = aead::seal(derived.expose(), legacy_vaults_json);
        let vaults_path = dir.path().join(".cybs3.vaults");
        tokio::fs::write(&vaults_path, &sealed).await.unwrap();

        let (config, data_key) = super::super::load(&mnemonic).await.unwrap();

        assert_eq!(config.vaults.len(), 1);
        assert_eq!(config.vaults[0].name, "v");
        assert_eq!(config.settings.default_region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.settings.default_bucket.as_deref(), Some("b"));
        assert_eq!(data_key.expose(), derived.expose());

        assert!(!settings_path.exists());
        assert!(!vaults_path.exists());
        assert!(settings_path.with_file_name(".cybs3.json.bak").exists());
        assert!(vaults_path.with_file_name(".cybs3.vaults.bak").exists());

        let config_path = super::super::paths::config_path().unwrap();
        assert!(config_path.exists());
    }
}
