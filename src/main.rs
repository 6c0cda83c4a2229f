//! `cybs3` — end-to-end encrypted command-line client for S3-compatible
//! object storage. This binary is a thin `clap` composition over the
//! `cybs3` library crate; see `src/cli/` for the subcommand bodies and
//! `src/lib.rs` for the core this binary drives.

mod cli;

use std::process;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::init() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e:?}");
            process::exit(1);
        }
    };

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}
