//! Session Resolver (component C5 of the specification).
//!
//! Resolves, in priority order, everything a command needs to run: the
//! mnemonic, the Config and Data Key (via [`crate::store`]), the active
//! vault, the effective S3 settings, and the parsed endpoint. None of this
//! touches the network; [`Session`] is a pure input-resolution result that
//! [`crate::s3`] is built against.

mod resolver;
mod secret_store;

pub use resolver::{
    parse_endpoint, resolve_effective_settings, select_active_vault, CliOverrides, EffectiveSettings, EnvS3Settings,
    ResolvedEndpoint,
};
pub use secret_store::{FileSecretStore, SecretStore};

use crate::config::ENV_MNEMONIC;
use crate::error::{CoreError, Result};
use crate::mnemonic::{self, Mnemonic};
use crate::secret::DataKey;
use crate::store::{self, Config};

/// Everything resolved and ready to drive a command: the unlocked
/// configuration, the Data Key that decrypts object bodies, and the S3
/// connection parameters in effect for this invocation.
pub struct Session {
    pub config: Config,
    pub data_key: DataKey,
    pub settings: EffectiveSettings,
}

/// Source of a candidate mnemonic phrase. The CLI layer supplies the
/// interactive-prompt variant; this module only defines the trait and the
/// non-interactive sources (§4.5).
pub trait MnemonicSource {
    /// Returns `Ok(None)` when this source has nothing to offer, so the
    /// caller can fall through to the next source in priority order.
    fn try_mnemonic(&self) -> Result<Option<String>>;
}

/// Reads [`ENV_MNEMONIC`] from the process environment.
pub struct EnvMnemonicSource;

impl MnemonicSource for EnvMnemonicSource {
    fn try_mnemonic(&self) -> Result<Option<String>> {
        match std::env::var(ENV_MNEMONIC) {
            Ok(phrase) if !phrase.trim().is_empty() => Ok(Some(phrase)),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(CoreError::InvalidMnemonic(format!("{ENV_MNEMONIC} is not valid UTF-8")))
            }
        }
    }
}

/// Tries each source in order, returning the first phrase offered, parsed
/// and validated as a [`Mnemonic`]. Fails with `MnemonicRequired` if every
/// source declines (§4.5 step 1).
pub fn resolve_mnemonic(sources: &[&dyn MnemonicSource]) -> Result<Mnemonic> {
    for source in sources {
        if let Some(phrase) = source.try_mnemonic()? {
            return mnemonic::validate_mnemonic(&phrase);
        }
    }
    Err(CoreError::MnemonicRequired)
}

/// Runs the full resolution chain: mnemonic sources, Config + Data Key load,
/// active vault selection, and effective settings (§4.5 steps 1-4).
pub async fn resolve_session(
    sources: &[&dyn MnemonicSource],
    overrides: &CliOverrides,
    env: &EnvS3Settings,
) -> Result<Session> {
    let mnemonic = resolve_mnemonic(sources)?;
    let (config, data_key) = store::load(&mnemonic).await?;

    let active_vault = select_active_vault(&config, overrides.vault.as_deref())?;
    let settings = resolve_effective_settings(&config, active_vault, overrides, env)?;

    Ok(Session { config, data_key, settings })
}
