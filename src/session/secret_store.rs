//! OS-native secret storage, as an external collaborator (§9).
//!
//! The specification treats the keychain as something outside the core's
//! concern, reachable only through this trait. No platform-native backend
//! ships in this crate; [`FileSecretStore`] is the documented fallback for
//! platforms without one, and it always reports `exists() == false` so the
//! mnemonic-source priority chain in [`super::resolve_mnemonic`] falls
//! through to the interactive prompt rather than silently failing.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn save(&self, key: &str, value: &str) -> Result<()>;
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn delete(&self, key: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Declines every lookup. A real build would plug in a platform-native
/// keychain (Keychain Services, Secret Service, Credential Manager) behind
/// this same trait; none is implemented here (§1: out of scope).
pub struct FileSecretStore;

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn save(&self, _key: &str, _value: &str) -> Result<()> {
        Err(crate::error::CoreError::SecretStore("no native secret store integration on this platform".into()))
    }

    async fn load(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }
}
