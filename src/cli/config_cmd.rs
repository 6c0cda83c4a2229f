//! `cybs3 config ...` — local configuration inspection.

use anyhow::Result;
use clap::Subcommand;

use cybs3::session::MnemonicSource;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Prints the on-disk config path, version, and vault/settings summary.
    Show,
    /// Prints the resolved filesystem paths without unlocking anything.
    Path,
}

pub async fn run(cmd: ConfigCommand, sources: &[&dyn MnemonicSource]) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mnemonic = cybs3::session::resolve_mnemonic(sources)?;
            let (config, _data_key) = cybs3::store::load(&mnemonic).await?;
            println!("version: {}", config.version);
            println!("active vault: {}", config.active_vault_name.as_deref().unwrap_or("(none)"));
            println!("vaults: {}", config.vaults.len());
            for vault in &config.vaults {
                println!("  - {} ({})", vault.name, vault.endpoint);
            }
            println!(
                "default region: {}",
                config.settings.default_region.as_deref().unwrap_or("(none)")
            );
            println!(
                "default bucket: {}",
                config.settings.default_bucket.as_deref().unwrap_or("(none)")
            );
        }
        ConfigCommand::Path => {
            println!("{}", cybs3::store::config_file_path()?.display());
        }
    }
    Ok(())
}
