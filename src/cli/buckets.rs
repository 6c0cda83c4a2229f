//! `cybs3 buckets ...` — bucket-level operations against the active vault.

use anyhow::Result;
use clap::Subcommand;

use cybs3::s3::S3Client;
use cybs3::session::{CliOverrides, EnvS3Settings, MnemonicSource};

#[derive(Subcommand)]
pub enum BucketsCommand {
    /// Lists every bucket visible to the active credentials.
    List,
    /// Creates a bucket.
    Create { name: String },
    /// Deletes a bucket. The bucket must already be empty.
    Delete { name: String },
}

pub async fn run(
    cmd: BucketsCommand,
    sources: &[&dyn MnemonicSource],
    overrides: &CliOverrides,
    env: &EnvS3Settings,
) -> Result<()> {
    let session = cybs3::session::resolve_session(sources, overrides, env).await?;
    let client = S3Client::new(session.settings)?;

    match cmd {
        BucketsCommand::List => {
            for bucket in client.list_buckets().await? {
                println!("{bucket}");
            }
        }
        BucketsCommand::Create { name } => {
            client.create_bucket(&name).await?;
            println!("bucket created");
        }
        BucketsCommand::Delete { name } => {
            client.delete_bucket(&name).await?;
            println!("bucket deleted");
        }
    }
    Ok(())
}
