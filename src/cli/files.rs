//! `cybs3 files ...` — object upload/download/list/delete, end to end
//! encrypted client-side against the active vault's bucket.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tokio::io::AsyncWriteExt;

use cybs3::codec::{ByteSource, ChunkDecoder, ChunkEncoder, FileSource};
use cybs3::s3::S3Client;
use cybs3::session::{CliOverrides, EnvS3Settings, MnemonicSource};

#[derive(Subcommand)]
pub enum FilesCommand {
    /// Encrypts and uploads a local file as an object.
    Upload {
        local_path: String,
        key: String,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Downloads and decrypts an object to a local file.
    Download {
        key: String,
        local_path: String,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Lists object keys under an optional prefix.
    List {
        #[arg(default_value = "")]
        prefix: String,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Deletes an object.
    Delete {
        key: String,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Server-side copies an object to a new key, optionally in another bucket.
    Copy {
        src_key: String,
        dst_key: String,
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        dst_bucket: Option<String>,
    },
}

pub async fn run(
    cmd: FilesCommand,
    sources: &[&dyn MnemonicSource],
    overrides: &CliOverrides,
    env: &EnvS3Settings,
) -> Result<()> {
    let session = cybs3::session::resolve_session(sources, overrides, env).await?;
    let key_bytes = *session.data_key.expose();
    let default_bucket = session.settings.bucket.clone();
    let client = S3Client::new(session.settings)?;

    let resolve_bucket = |explicit: Option<String>| -> Result<String> {
        explicit.or_else(|| default_bucket.clone()).context("no bucket given and no default bucket configured")
    };

    match cmd {
        FilesCommand::Upload { local_path, key, bucket } => {
            let bucket = resolve_bucket(bucket)?;
            let plaintext_len = tokio::fs::metadata(&local_path).await.context("reading local file metadata")?.len();
            let ciphertext_len = cybs3::codec::ciphertext_length_for(plaintext_len);
            let file_source = FileSource::open(&local_path).await?;
            let encoder = ChunkEncoder::new(key_bytes, file_source);
            client.put_object_stream(&bucket, &key, encoder, ciphertext_len).await?;
            println!("uploaded {local_path} to {bucket}/{key}");
        }
        FilesCommand::Download { key, local_path, bucket } => {
            let bucket = resolve_bucket(bucket)?;
            let response = client.get_object_stream(&bucket, &key).await?;
            let mut decoder = ChunkDecoder::new(key_bytes, response);
            let mut file = tokio::fs::File::create(&local_path).await.context("creating local output file")?;
            while let Some(chunk) = decoder.next_chunk().await? {
                file.write_all(&chunk).await.context("writing decrypted bytes to local file")?;
            }
            file.flush().await.context("flushing local output file")?;
            println!("downloaded {bucket}/{key} to {local_path}");
        }
        FilesCommand::List { prefix, bucket } => {
            let bucket = resolve_bucket(bucket)?;
            let mut token = None;
            loop {
                let page = client.list_objects(&bucket, &prefix, Some("/"), token.as_deref()).await?;
                for object in &page.objects {
                    if object.is_directory {
                        println!("{}", object.key);
                    } else {
                        println!("{}\t{}", object.key, object.size);
                    }
                }
                match page.next_token {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }
        }
        FilesCommand::Delete { key, bucket } => {
            let bucket = resolve_bucket(bucket)?;
            client.delete_object(&bucket, &key).await?;
            println!("deleted {bucket}/{key}");
        }
        FilesCommand::Copy { src_key, dst_key, bucket, dst_bucket } => {
            let src_bucket = resolve_bucket(bucket)?;
            let dst_bucket = dst_bucket.unwrap_or_else(|| src_bucket.clone());
            if src_key == dst_key && src_bucket == dst_bucket {
                bail!("source and destination are the same object");
            }
            client.copy_object(&src_bucket, &src_key, &dst_bucket, &dst_key).await?;
            println!("copied {src_bucket}/{src_key} to {dst_bucket}/{dst_key}");
        }
    }
    Ok(())
}
