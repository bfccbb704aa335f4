//! Settings for the `compat` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use compat_core::season::SeasonNum;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// Season used by roster, rating and score commands when `--season` is
  /// omitted.
  #[serde(default)]
  pub default_season: Option<SeasonNum>,
}

fn default_store_path() -> PathBuf { PathBuf::from("compat.db") }

impl CliConfig {
  /// Layer the optional TOML file at `path` under `COMPAT_*` environment
  /// variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("COMPAT").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  /// An explicit `--season` wins over the configured default.
  pub fn season_or_default(&self, season: Option<SeasonNum>) -> Option<SeasonNum> {
    season.or(self.default_season)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
