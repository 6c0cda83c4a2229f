//! Active vault selection, the effective-S3-settings cascade, and endpoint
//! parsing (§4.5 steps 3-5). Kept as pure functions over explicit inputs so
//! they're testable without touching the environment or the filesystem; the
//! CLI layer is the only caller that reads `std::env` or `clap` matches and
//! funnels them in here as plain structs.

use crate::config::{DEFAULT_ENDPOINT, DEFAULT_REGION};
use crate::error::{CoreError, Result};
use crate::store::{Config, Vault};

/// Command-line overrides for a single invocation. `None` means "the flag
/// was not passed"; an explicit empty string is never produced by `clap`.
#[derive(Default, Clone)]
pub struct CliOverrides {
    pub vault: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
}

/// The `AWS_*` environment variables consumed by the settings cascade,
/// read once by the caller so resolution stays a pure function of its
/// arguments.
#[derive(Default, Clone)]
pub struct EnvS3Settings {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
}

impl EnvS3Settings {
    #[must_use]
    pub fn from_process_env() -> Self {
        let get = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            access_key: get("AWS_ACCESS_KEY_ID"),
            secret_key: get("AWS_SECRET_ACCESS_KEY"),
            region: get("AWS_REGION"),
            bucket: get("AWS_BUCKET"),
        }
    }
}

/// S3 connection parameters in effect for one invocation, after the
/// first-match-wins cascade has been applied to every field independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub endpoint: ResolvedEndpoint,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
}

/// Resolves which vault is active for this invocation (§4.5 step 3):
/// an explicit `--vault` name takes precedence over `config.activeVaultName`;
/// with neither, no vault is active. An explicit name that doesn't resolve
/// to a stored vault is a fatal `VaultNotFound`, never a silent fallthrough.
pub fn select_active_vault<'c>(config: &'c Config, explicit: Option<&str>) -> Result<Option<&'c Vault>> {
    if let Some(name) = explicit {
        return config.vault(name).map(Some);
    }
    if let Some(name) = &config.active_vault_name {
        return config.vault(name).map(Some);
    }
    Ok(None)
}

fn first_non_empty(candidates: [Option<&str>; 4]) -> Option<String> {
    candidates.into_iter().flatten().find(|s| !s.is_empty()).map(str::to_owned)
}

/// Applies the first-match-wins cascade to every S3 setting independently
/// (§4.5 step 4): CLI flag > environment variable > active vault field >
/// `config.settings.default*` > hard-coded fallback. Endpoint and region
/// always resolve (the hard-coded fallbacks guarantee it); access/secret key
/// fail with `AuthenticationFailed` if nothing at all supplies them.
pub fn resolve_effective_settings(
    config: &Config,
    active_vault: Option<&Vault>,
    overrides: &CliOverrides,
    env: &EnvS3Settings,
) -> Result<EffectiveSettings> {
    let settings = &config.settings;

    let endpoint_raw = first_non_empty([
        overrides.endpoint.as_deref(),
        None,
        active_vault.map(|v| v.endpoint.as_str()),
        settings.default_endpoint.as_deref(),
    ])
    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let access_key = first_non_empty([
        overrides.access_key.as_deref(),
        env.access_key.as_deref(),
        active_vault.map(|v| v.access_key.as_str()),
        settings.default_access_key.as_deref(),
    ])
    .ok_or(CoreError::AuthenticationFailed)?;

    let secret_key = first_non_empty([
        overrides.secret_key.as_deref(),
        env.secret_key.as_deref(),
        active_vault.map(|v| v.secret_key.as_str()),
        settings.default_secret_key.as_deref(),
    ])
    .ok_or(CoreError::AuthenticationFailed)?;

    let region = first_non_empty([
        overrides.region.as_deref(),
        env.region.as_deref(),
        active_vault.map(|v| v.region.as_str()),
        settings.default_region.as_deref(),
    ])
    .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let bucket = first_non_empty([
        overrides.bucket.as_deref(),
        env.bucket.as_deref(),
        active_vault.and_then(|v| v.bucket.as_deref()),
        settings.default_bucket.as_deref(),
    ]);

    let endpoint = parse_endpoint(&endpoint_raw)?;

    Ok(EffectiveSettings { endpoint, access_key, secret_key, region, bucket })
}

/// Parses an endpoint string into host/port/scheme (§4.5 step 5). A scheme
/// is prepended (`https://`) when absent; port defaults to 443 for `https`
/// and 80 for `http` when not given explicitly.
pub fn parse_endpoint(raw: &str) -> Result<ResolvedEndpoint> {
    let with_scheme = if raw.contains("://") { raw.to_string() } else { format!("https://{raw}") };

    let url = reqwest::Url::parse(&with_scheme).map_err(|_| CoreError::InvalidUrl(raw.to_string()))?;
    let use_ssl = match url.scheme() {
        "https" => true,
        "http" => false,
        other => return Err(CoreError::InvalidUrl(format!("unsupported scheme {other:?} in {raw:?}"))),
    };
    let host = url.host_str().ok_or_else(|| CoreError::InvalidUrl(raw.to_string()))?.to_string();
    let port = url.port().unwrap_or(if use_ssl { 443 } else { 80 });

    Ok(ResolvedEndpoint { host, port, use_ssl })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AppSettings;

    fn vault(name: &str) -> Vault {
        Vault {
            name: name.to_string(),
            endpoint: "vault.example.com".into(),
            access_key: "vault-ak".into(),
            secret_key: "vault-sk".into(),
            region: "eu-west-1".into(),
            bucket: Some("vault-bucket".into()),
        }
    }

    fn config_with(vaults: Vec<Vault>, active: Option<&str>, settings: AppSettings) -> Config {
        Config {
            version: 2,
            data_key: vec![0u8; 32],
            active_vault_name: active.map(str::to_owned),
            vaults,
            settings,
        }
    }

    #[test]
    fn explicit_vault_name_overrides_active_vault_name() {
        let config = config_with(vec![vault("a"), vault("b")], Some("a"), AppSettings::default());
        let resolved = select_active_vault(&config, Some("b")).unwrap();
        assert_eq!(resolved.unwrap().name, "b");
    }

    #[test]
    fn unresolvable_explicit_vault_is_fatal() {
        let config = config_with(vec![vault("a")], None, AppSettings::default());
        let err = select_active_vault(&config, Some("missing")).unwrap_err();
        assert!(matches!(err, CoreError::VaultNotFound(name) if name == "missing"));
    }

    #[test]
    fn no_vault_selected_when_neither_source_supplies_one() {
        let config = config_with(vec![], None, AppSettings::default());
        assert!(select_active_vault(&config, None).unwrap().is_none());
    }

    #[test]
    fn cli_override_wins_over_every_other_source() {
        let mut settings = AppSettings::default();
        settings.default_region = Some("ap-south-1".into());
        let config = config_with(vec![vault("a")], Some("a"), settings);
        let v = select_active_vault(&config, None).unwrap();

        let overrides = CliOverrides { region: Some("us-west-2".into()), ..Default::default() };
        let env = EnvS3Settings { region: Some("eu-central-1".into()), ..Default::default() };

        let effective = resolve_effective_settings(&config, v, &overrides, &env).unwrap();
        assert_eq!(effective.region, "us-west-2");
    }

    #[test]
    fn env_wins_over_vault_field_when_no_cli_override() {
        let config = config_with(vec![vault("a")], Some("a"), AppSettings::default());
        let v = select_active_vault(&config, None).unwrap();

        let overrides = CliOverrides::default();
        let env = EnvS3Settings { region: Some("eu-central-1".into()), ..Default::default() };

        let effective = resolve_effective_settings(&config, v, &overrides, &env).unwrap();
        assert_eq!(effective.region, "eu-central-1");
    }

    #[test]
    fn falls_back_to_hard_coded_region_and_endpoint_when_nothing_else_supplies_them() {
        let config = config_with(vec![], None, AppSettings::default());
        let overrides = CliOverrides {
            access_key: Some("ak".into()),
            secret_key: Some("sk".into()),
            ..Default::default()
        };
        let env = EnvS3Settings::default();

        let effective = resolve_effective_settings(&config, None, &overrides, &env).unwrap();
        assert_eq!(effective.region, DEFAULT_REGION);
        assert_eq!(effective.endpoint.host, DEFAULT_ENDPOINT);
        assert!(effective.endpoint.use_ssl);
        assert_eq!(effective.endpoint.port, 443);
    }

    #[test]
    fn missing_credentials_everywhere_is_authentication_failed() {
        let config = config_with(vec![], None, AppSettings::default());
        let err =
            resolve_effective_settings(&config, None, &CliOverrides::default(), &EnvS3Settings::default()).unwrap_err();
        assert!(matches!(err, CoreError::AuthenticationFailed));
    }

    #[test]
    fn bucket_is_optional_and_can_be_absent() {
        let config = config_with(vec![], None, AppSettings::default());
        let overrides = CliOverrides {
            access_key: Some("ak".into()),
            secret_key: Some("sk".into()),
            ..Default::default()
        };
        let effective =
            resolve_effective_settings(&config, None, &overrides, &EnvS3Settings::default()).unwrap();
        assert_eq!(effective.bucket, None);
    }

    #[test]
    fn parse_endpoint_defaults_to_https_and_443() {
        let r = parse_endpoint("s3.example.com").unwrap();
        assert_eq!(r.host, "s3.example.com");
        assert_eq!(r.port, 443);
        assert!(r.use_ssl);
    }

    #[test]
    fn parse_endpoint_respects_explicit_http_scheme_and_port() {
        let r = parse_endpoint("http://localhost:9000").unwrap();
        assert_eq!(r.host, "localhost");
        assert_eq!(r.port, 9000);
        assert!(!r.use_ssl);
    }

    #[test]
    fn parse_endpoint_rejects_unsupported_scheme() {
        let err = parse_endpoint("ftp://example.com").unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl(_)));
    }
}
