//! CLI composition layer (component C8 of the specification).
//!
//! Thin `clap` subcommands over the library's core operations: each
//! variant's body is "resolve a session, call one core operation, print the
//! result." No encryption, signing, or storage logic lives here — it all
//! stays in `cybs3`'s library crate, which never touches stdout/stderr
//! itself (§7's propagation policy).

mod buckets;
mod config_cmd;
mod files;
mod keys;
mod vaults;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cybs3::session::{CliOverrides, EnvS3Settings, EnvMnemonicSource, MnemonicSource};

/// Reads one line from stdin after printing `label`. The one piece of
/// "terminal UI" this binary owns; everything past this line is core logic.
pub(crate) fn prompt_line(label: &str) -> Result<String> {
    use std::io::Write as _;
    print!("{label}");
    std::io::stdout().flush().context("failed to flush stdout")?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// A non-interactive prompt fallback is intentionally absent here; prompting
/// on stdin is the lowest-priority mnemonic source (§4.5 step 1).
struct InteractiveMnemonicSource;

impl MnemonicSource for InteractiveMnemonicSource {
    fn try_mnemonic(&self) -> cybs3::error::Result<Option<String>> {
        let line = prompt_line("Enter your 12-word mnemonic: ")
            .map_err(|e| cybs3::error::CoreError::FileAccessFailed { path: "<stdin>".into(), source: std::io::Error::other(e.to_string()) })?;
        if line.is_empty() {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

#[derive(Parser)]
#[command(name = "cybs3", version, about = "End-to-end encrypted client for S3-compatible object storage.")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Named vault to use for this invocation, overriding the active vault.
    #[arg(long, global = true)]
    vault: Option<String>,

    /// S3 endpoint override (host, or host:port, or a full URL).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[arg(long, global = true)]
    access_key: Option<String>,

    #[arg(long, global = true)]
    secret_key: Option<String>,

    #[arg(long, global = true)]
    region: Option<String>,

    #[arg(long, global = true)]
    bucket: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mnemonic and Master Key lifecycle.
    #[command(subcommand)]
    Keys(keys::KeysCommand),
    /// Named S3 credential bundles.
    #[command(subcommand)]
    Vaults(vaults::VaultsCommand),
    /// Bucket-level operations.
    #[command(subcommand)]
    Buckets(buckets::BucketsCommand),
    /// Object upload/download/list/delete.
    #[command(subcommand)]
    Files(files::FilesCommand),
    /// Local configuration inspection and migration.
    #[command(subcommand)]
    Config(config_cmd::ConfigCommand),
}

impl Cli {
    /// Installs the global `tracing` subscriber and parses `std::env::args`.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).finish();
        tracing::subscriber::set_global_default(subscriber).context("failed to install tracing subscriber")?;
        Ok(Self::parse())
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            vault: self.vault.clone(),
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            region: self.region.clone(),
            bucket: self.bucket.clone(),
        }
    }

    pub async fn execute(self) -> Result<()> {
        let overrides = self.overrides();
        let env = EnvS3Settings::from_process_env();
        let sources: [&dyn MnemonicSource; 2] = [&EnvMnemonicSource, &InteractiveMnemonicSource];

        match self.command {
            Commands::Keys(cmd) => keys::run(cmd).await,
            Commands::Vaults(cmd) => vaults::run(cmd, &sources).await,
            Commands::Buckets(cmd) => buckets::run(cmd, &sources, &overrides, &env).await,
            Commands::Files(cmd) => files::run(cmd, &sources, &overrides, &env).await,
            Commands::Config(cmd) => config_cmd::run(cmd, &sources).await,
        }
    }
}
