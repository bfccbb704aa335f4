//! `compat` — command-line front end for the compatibility store.
//!
//! # Usage
//!
//! ```
//! compat person add Ana Tester --dob 1990-04-02
//! compat person partner 1 --with 2 --season 3
//! compat rate person 1 4 8.5 --season 3
//! compat scores --season 3
//! ```
//!
//! Settings come from `compat.toml` (or `--config`) and `COMPAT_*`
//! environment variables. Output is JSON on stdout; logs go to stderr.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use compat_store_sqlite::SqliteStore;
use settings::CliConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "compat", version, about = "Season-scoped compatibility ratings")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "compat.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from config.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = CliConfig::load(&cli.config)?;
  if let Some(store) = &cli.store {
    cfg.store_path = settings::expand_tilde(store);
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::debug!(path = ?cfg.store_path, "opened store");

  let output = commands::run(&store, &cfg, cli.command).await?;
  println!(
    "{}",
    serde_json::to_string_pretty(&output).context("failed to serialise output")?
  );

  Ok(())
}
