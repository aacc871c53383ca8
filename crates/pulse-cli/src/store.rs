//! On-disk dashboard state: one JSON file in the data directory

use anyhow::{Context, Result};
use pulse_models::DashboardState;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const STATE_FILE: &str = "dashboard.json";

#[derive(Debug, Clone)]
pub struct DashboardStore {
  path: PathBuf,
}

impl DashboardStore {
  pub fn new(data_dir: &Path) -> Self {
    Self { path: data_dir.join(STATE_FILE) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Saved state, or the defaults when nothing was saved yet
  pub fn load(&self) -> Result<DashboardState> {
    if !self.path.exists() {
      debug!("No saved state at {}, using defaults", self.path.display());
      return Ok(DashboardState::default());
    }

    let text = fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Corrupt dashboard state in {}", self.path.display()))
  }

  /// Write through a temporary file so a crash never leaves half a file
  pub fn save(&self, state: &DashboardState) -> Result<()> {
    if let Some(dir) = self.path.parent() {
      fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(state)?)
      .with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;

    debug!("Saved dashboard state to {}", self.path.display());
    Ok(())
  }

  /// Load, change and save in one step
  pub fn update<F>(&self, change: F) -> Result<DashboardState>
  where
    F: FnOnce(&mut DashboardState),
  {
    let mut state = self.load()?;
    change(&mut state);
    self.save(&state)?;
    Ok(state)
  }
}
