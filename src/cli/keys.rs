//! `cybs3 keys ...` — mnemonic and Master Key lifecycle.

use anyhow::Result;
use clap::Subcommand;

use super::prompt_line;

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Generates a fresh 12-word mnemonic. Prints it; stores nothing.
    Generate,
    /// Validates a mnemonic phrase's word list and checksum.
    Validate {
        /// The 12-word phrase, space-separated.
        phrase: String,
    },
    /// Re-wraps the local configuration under a new mnemonic.
    Rotate,
}

pub async fn run(cmd: KeysCommand) -> Result<()> {
    match cmd {
        KeysCommand::Generate => {
            let mnemonic = cybs3::mnemonic::generate_mnemonic()?;
            println!("{}", mnemonic.words().join(" "));
        }
        KeysCommand::Validate { phrase } => {
            cybs3::mnemonic::validate_mnemonic(&phrase)?;
            println!("valid");
        }
        KeysCommand::Rotate => {
            let old_phrase = prompt_line("Current mnemonic: ")?;
            let new_phrase = prompt_line("New mnemonic: ")?;
            let old = cybs3::mnemonic::validate_mnemonic(&old_phrase)?;
            let new = cybs3::mnemonic::validate_mnemonic(&new_phrase)?;
            cybs3::store::rotate_master(&old, &new).await?;
            println!("master key rotated");
        }
    }
    Ok(())
}
