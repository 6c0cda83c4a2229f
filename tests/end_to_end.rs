//! Cross-module scenarios from §8: fresh install, mnemonic rotation, and
//! legacy-format migration, each driven through the public library API the
//! way the CLI layer would, rather than through any one module in isolation.

use std::sync::Mutex;

use cybs3::{aead, mnemonic, store};

// The store resolves paths from `$HOME`; these tests redirect it into a
// sandbox directory and must not run concurrently with each other.
static HOME_LOCK: Mutex<()> = Mutex::new(());

fn sandbox_home() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    unsafe { std::env::set_var("HOME", dir.path()) };
    dir
}

#[tokio::test]
async fn fresh_install_yields_empty_config_with_high_entropy_data_key() {
    let _guard = HOME_LOCK.lock().unwrap();
    let _home = sandbox_home();

    let phrase = mnemonic::generate_mnemonic().unwrap().words().join(" ");
    let m = mnemonic::validate_mnemonic(&phrase).unwrap();

    let (config, data_key) = store::load(&m).await.unwrap();
    assert_eq!(config.version, 2);
    assert!(config.vaults.is_empty());
    assert!(config.active_vault_name.is_none());

    // Rough Shannon-entropy check over the 32-byte key: a constant or
    // low-entropy key would fail this by a wide margin.
    let bytes = data_key.expose();
    let mut counts = [0u32; 256];
    for b in bytes {
        counts[*b as usize] += 1;
    }
    let len = bytes.len() as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = f64::from(c) / len;
            -p * p.log2()
        })
        .sum();
    assert!(entropy > 3.0, "expected reasonable per-symbol entropy for a random key, got {entropy}");
}

#[tokio::test]
async fn rotating_the_mnemonic_preserves_the_data_key_and_locks_out_the_old_one() {
    let _guard = HOME_LOCK.lock().unwrap();
    let _home = sandbox_home();

    let old = mnemonic::generate_mnemonic().unwrap();
    let (mut config, data_key) = store::load(&old).await.unwrap();
    config.vaults.push(store::Vault {
        name: "primary".into(),
        endpoint: "s3.example.com".into(),
        access_key: "ak".into(),
        secret_key: "sk".into(),
        region: "us-west-2".into(),
        bucket: Some("bucket".into()),
    });
    store::save(&config, &old).await.unwrap();

    let new = mnemonic::generate_mnemonic().unwrap();
    store::rotate_master(&old, &new).await.unwrap();

    assert!(matches!(store::load(&old).await, Err(cybs3::error::CoreError::DecryptionFailed)));

    let (reloaded, reloaded_key) = store::load(&new).await.unwrap();
    assert_eq!(reloaded.vaults.len(), 1);
    assert_eq!(reloaded.vaults[0].name, "primary");
    assert_eq!(reloaded_key.expose(), data_key.expose());
}

#[tokio::test]
async fn legacy_install_migrates_and_old_objects_stay_decryptable() {
    let _guard = HOME_LOCK.lock().unwrap();
    let home = sandbox_home();

    let m = mnemonic::generate_mnemonic().unwrap();

    let settings_path = home.path().join(".cybs3.json");
    tokio::fs::write(&settings_path, br#"{"region":"eu-west-1","bucket":"b"}"#).await.unwrap();

    let legacy_vaults_json =
        br#"{"version":1,"vaults":[{"name":"v","endpoint":"e","accessKey":"a","secretKey":"s","region":"r"}]}"#;
    let derived = mnemonic::derive_master_key(&m);

    // An object "uploaded" before migration, sealed under the directly
    // derived key exactly as the pre-migration tool would have done.
    let pre_migration_plaintext = b"archived before migration";
    let pre_migration_object = aead::seal(derived.expose(), pre_migration_plaintext);

    let sealed_vaults = aead::seal(derived.expose(), legacy_vaults_json);
    tokio::fs::write(home.path().join(".cybs3.vaults"), &sealed_vaults).await.unwrap();

    let (config, data_key) = store::load(&m).await.unwrap();
    assert_eq!(config.vaults.len(), 1);
    assert_eq!(config.settings.default_region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.settings.default_bucket.as_deref(), Some("b"));

    // The defining migration property: the post-migration Data Key still
    // opens objects sealed before migration under the directly-derived key.
    let recovered = aead::open(data_key.expose(), &pre_migration_object).unwrap();
    assert_eq!(recovered, pre_migration_plaintext);

    assert!(home.path().join(".cybs3.json.bak").exists());
    assert!(home.path().join(".cybs3.vaults.bak").exists());
}
