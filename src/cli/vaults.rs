//! `cybs3 vaults ...` — named S3 credential bundles stored in the Config.

use anyhow::Result;
use clap::Subcommand;
use cybs3::session::MnemonicSource;
use cybs3::store::Vault;

#[derive(Subcommand)]
pub enum VaultsCommand {
    /// Adds a vault, replacing any existing vault with the same name.
    Add {
        name: String,
        endpoint: String,
        access_key: String,
        secret_key: String,
        region: String,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Lists vault names and endpoints. Never prints secret keys.
    List,
    /// Removes a vault by name.
    Remove { name: String },
    /// Sets the active vault used when no `--vault` override is given.
    Use { name: String },
}

pub async fn run(cmd: VaultsCommand, sources: &[&dyn MnemonicSource]) -> Result<()> {
    let mnemonic = cybs3::session::resolve_mnemonic(sources)?;
    let (mut config, _data_key) = cybs3::store::load(&mnemonic).await?;

    match cmd {
        VaultsCommand::Add { name, endpoint, access_key, secret_key, region, bucket } => {
            config.vaults.retain(|v| v.name != name);
            config.vaults.push(Vault { name, endpoint, access_key, secret_key, region, bucket });
            cybs3::store::save(&config, &mnemonic).await?;
            println!("vault saved");
        }
        VaultsCommand::List => {
            for vault in &config.vaults {
                let marker = if config.active_vault_name.as_deref() == Some(vault.name.as_str()) { "*" } else { " " };
                println!("{marker} {} ({})", vault.name, vault.endpoint);
            }
        }
        VaultsCommand::Remove { name } => {
            config.vaults.retain(|v| v.name != name);
            if config.active_vault_name.as_deref() == Some(name.as_str()) {
                config.active_vault_name = None;
            }
            cybs3::store::save(&config, &mnemonic).await?;
            println!("vault removed");
        }
        VaultsCommand::Use { name } => {
            config.vault(&name)?;
            config.active_vault_name = Some(name);
            cybs3::store::save(&config, &mnemonic).await?;
            println!("active vault updated");
        }
    }
    Ok(())
}
