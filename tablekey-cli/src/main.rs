//! tablekey: encode and decode opaque ids, validate schema definitions.
//!
//! Usage:
//!   tablekey encode u1 o42
//!   tablekey decode PH6EgLQgt6Xq9IlZ
//!   tablekey check-schema orders.toml
//!   tablekey keys orders.toml '{"userId":"u1","orderId":"o42"}'
//!
//! The codec secret comes from `--config <file>` (a `[codec]` table) or the
//! `TABLEKEY_SECRET` / `TABLEKEY_SCHEME` environment variables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablekey_cli::{check_schema, decode, derive_keys, encode, load_codec, log_directives};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tablekey")]
#[command(about = "Composite keys and opaque ids for single-table designs")]
struct Args {
    /// Codec config file (TOML with a [codec] table)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a partition value and optional sort value into an opaque id
    Encode { partition: String, sort: Option<String> },

    /// Decode an opaque id into its key tuple
    Decode { id: String },

    /// Validate a schema definition file (TOML or JSON)
    CheckSchema { schema: PathBuf },

    /// Derive every key attribute of a JSON item
    Keys {
        schema: PathBuf,
        item: String,

        /// Also print the item's opaque id
        #[arg(long)]
        hash_id: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let directives = log_directives(args.verbose, std::env::var("RUST_LOG").ok());
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(directives))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let output = match &args.command {
        Command::Encode { partition, sort } => {
            let codec = load_codec(args.config.as_deref())?;
            encode(&codec, partition, sort.as_deref())?
        }
        Command::Decode { id } => {
            let codec = load_codec(args.config.as_deref())?;
            decode(&codec, id)?
        }
        Command::CheckSchema { schema } => check_schema(schema)?,
        Command::Keys { schema, item, hash_id } => {
            let codec = if *hash_id {
                Some(load_codec(args.config.as_deref())?)
            } else {
                None
            };
            derive_keys(schema, item, codec)?
        }
    };
    println!("{output}");
    Ok(())
}
