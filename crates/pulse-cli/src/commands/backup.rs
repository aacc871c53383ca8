use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use pulse_models::layout::BACKUP_VERSION;
use pulse_models::Backup;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ExportArgs {
  /// Output file (default: dashboard-backup-YYYY-MM-DD.json)
  #[arg(short, long)]
  output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
  /// Backup file to restore
  file: PathBuf,

  /// Do not ask before overwriting the current settings
  #[arg(short, long)]
  yes: bool,
}

pub fn export(args: ExportArgs, config: Config) -> Result<()> {
  let state = DashboardStore::new(&config.data_dir).load()?;
  let now = Utc::now();
  let backup = state.to_backup(now);

  let output = args.output.unwrap_or_else(|| default_backup_name(now.format("%Y-%m-%d").to_string()));
  fs::write(&output, backup.to_json_pretty()?).with_context(|| format!("Failed to write {}", output.display()))?;

  info!("Backup written to {}", output.display());
  Ok(())
}

pub fn import(args: ImportArgs, config: Config) -> Result<()> {
  let text = fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
  let backup = Backup::parse(&text)?;

  if !backup.version.is_empty() && backup.version != BACKUP_VERSION {
    warn!("Backup version {} differs from {}, restoring what is recognised", backup.version, BACKUP_VERSION);
  }

  if !args.yes && !confirm("Restore settings from file? Current settings will be overwritten.")? {
    bail!("Import cancelled");
  }

  let store = DashboardStore::new(&config.data_dir);
  store.update(|state| state.apply_backup(backup))?;
  info!("Restored dashboard state from {}", args.file.display());
  Ok(())
}

fn default_backup_name(date: String) -> PathBuf {
  PathBuf::from(format!("dashboard-backup-{}.json", date))
}

fn confirm(question: &str) -> Result<bool> {
  print!("{} [y/N] ", question);
  io::stdout().flush()?;

  let mut answer = String::new();
  io::stdin().lock().read_line(&mut answer)?;
  Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
