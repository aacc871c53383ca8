//! Dashboard arrangement, favorites, display preferences and backups.
//!
//! These are plain data; reading and writing them to disk is the job of the
//! front end that owns the data directory.

use crate::catalog::{Catalog, CatalogItem, ItemKind};
use chrono::{DateTime, Utc};
use pulse_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Version tag written into every backup
pub const BACKUP_VERSION: &str = "1.0";

/// One card position in a saved layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
  pub name: String,
  #[serde(default)]
  pub symbol: String,
  #[serde(default, rename = "type")]
  pub kind: ItemKind,
  #[serde(default)]
  pub region: String,
}

impl From<&CatalogItem> for LayoutEntry {
  fn from(item: &CatalogItem) -> Self {
    LayoutEntry { name: item.name.clone(), symbol: item.symbol.clone(), kind: item.kind, region: String::new() }
  }
}

/// Resolve a saved layout against the catalog.
///
/// Saved order wins; saved entries no longer in the catalog are dropped and
/// catalog items the layout has never seen are appended in catalog order.
/// Without a saved layout the catalog order is used as is.
pub fn resolve_layout(saved: Option<&[LayoutEntry]>, catalog: &Catalog) -> Vec<CatalogItem> {
  let Some(saved) = saved else {
    return catalog.iter().cloned().collect();
  };

  let mut resolved: Vec<CatalogItem> = Vec::with_capacity(catalog.len());
  for entry in saved {
    if let Some(item) = catalog.find_by_name(&entry.name) {
      if !resolved.iter().any(|r| r.name == item.name) {
        resolved.push(item.clone());
      }
    }
  }

  let appended: Vec<CatalogItem> =
    catalog.iter().filter(|item| !resolved.iter().any(|r| r.name == item.name)).cloned().collect();
  resolved.extend(appended);
  resolved
}

/// Ordered, duplicate-free list of favorite card ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Favorites(Vec<String>);

impl Favorites {
  pub fn new() -> Self {
    Favorites(Vec::new())
  }

  /// Returns false when the id was already a favorite
  pub fn add(&mut self, id: impl Into<String>) -> bool {
    let id = id.into();
    if self.contains(&id) {
      return false;
    }
    self.0.push(id);
    true
  }

  /// Returns false when the id was not a favorite
  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.0.len();
    self.0.retain(|f| f != id);
    before != self.0.len()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.0.iter().any(|f| f == id)
  }

  pub fn ids(&self) -> &[String] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<Vec<String>> for Favorites {
  fn from(ids: Vec<String>) -> Self {
    let mut favorites = Favorites::new();
    for id in ids {
      favorites.add(id);
    }
    favorites
  }
}

impl From<Favorites> for Vec<String> {
  fn from(favorites: Favorites) -> Self {
    favorites.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
  #[default]
  Simple,
  Mini,
  Rich,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Ja,
  En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Dark,
  Light,
}

impl Theme {
  pub fn toggled(self) -> Self {
    match self {
      Theme::Dark => Theme::Light,
      Theme::Light => Theme::Dark,
    }
  }
}

/// Display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
  #[serde(default)]
  pub mode: DisplayMode,
  #[serde(default)]
  pub lang: Language,
  #[serde(default)]
  pub theme: Theme,
}

/// Settings section of a backup; each value is optional so partial backups
/// only overwrite what they carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
  #[serde(default)]
  pub mode: Option<DisplayMode>,
  #[serde(default)]
  pub lang: Option<Language>,
  #[serde(default)]
  pub theme: Option<Theme>,
}

/// Portable JSON backup of the whole dashboard state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
  #[serde(default)]
  pub layout: Option<Vec<LayoutEntry>>,
  #[serde(default)]
  pub favorites: Option<Favorites>,
  #[serde(default)]
  pub settings: Option<BackupSettings>,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub date: String,
}

impl Backup {
  pub fn parse(text: &str) -> Result<Self> {
    serde_json::from_str(text).map_err(|e| Error::Parse(format!("Invalid backup file: {}", e)))
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}

/// Everything the dashboard persists between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
  #[serde(default)]
  pub layout: Option<Vec<LayoutEntry>>,
  #[serde(default)]
  pub favorites: Favorites,
  #[serde(default)]
  pub preferences: Preferences,
}

impl DashboardState {
  /// Cards in display order
  pub fn display_items(&self, catalog: &Catalog) -> Vec<CatalogItem> {
    resolve_layout(self.layout.as_deref(), catalog)
  }

  /// Store the current order of `items` as the saved layout
  pub fn save_layout(&mut self, items: &[CatalogItem]) {
    self.layout = Some(items.iter().map(LayoutEntry::from).collect());
  }

  /// Forget layout and favorites, keep preferences
  pub fn reset(&mut self) {
    self.layout = None;
    self.favorites = Favorites::new();
  }

  pub fn to_backup(&self, now: DateTime<Utc>) -> Backup {
    Backup {
      layout: Some(self.layout.clone().unwrap_or_default()),
      favorites: Some(self.favorites.clone()),
      settings: Some(BackupSettings {
        mode: Some(self.preferences.mode),
        lang: Some(self.preferences.lang),
        theme: Some(self.preferences.theme),
      }),
      version: BACKUP_VERSION.to_string(),
      date: now.to_rfc3339(),
    }
  }

  /// Overwrite the sections the backup carries, leave the rest alone
  pub fn apply_backup(&mut self, backup: Backup) {
    if let Some(layout) = backup.layout {
      self.layout = Some(layout);
    }
    if let Some(favorites) = backup.favorites {
      self.favorites = favorites;
    }
    if let Some(settings) = backup.settings {
      if let Some(mode) = settings.mode {
        self.preferences.mode = mode;
      }
      if let Some(lang) = settings.lang {
        self.preferences.lang = lang;
      }
      if let Some(theme) = settings.theme {
        self.preferences.theme = theme;
      }
    }
  }
}
