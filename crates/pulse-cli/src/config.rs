use anyhow::{Context, Result};
use pulse_core::Config as CoreConfig;
use std::env;
use std::path::PathBuf;

/// Directory used when neither `--data-dir` nor `PULSE_DATA_DIR` is given
const DEFAULT_DATA_DIR: &str = ".market-pulse";

#[derive(Debug, Clone)]
pub struct Config {
  pub core: CoreConfig,
  pub data_dir: PathBuf,
}

impl Config {
  pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self> {
    let core = CoreConfig::from_env().context("Invalid PULSE_* configuration")?;

    let data_dir = match data_dir {
      Some(dir) => dir,
      None => env::var("HOME")
        .map(|home| PathBuf::from(home).join(DEFAULT_DATA_DIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
    };

    Ok(Self { core, data_dir })
  }
}
