use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::Result;
use clap::{Args, ValueEnum};
use pulse_models::{DisplayMode, Language, Preferences, Theme};
use tracing::info;

#[derive(Args, Debug)]
pub struct PrefsArgs {
  /// Card display mode
  #[arg(long, value_enum)]
  mode: Option<ModeArg>,

  /// Interface language
  #[arg(long, value_enum)]
  lang: Option<LangArg>,

  /// Color theme
  #[arg(long, value_enum, conflicts_with = "toggle_theme")]
  theme: Option<ThemeArg>,

  /// Switch between dark and light
  #[arg(long)]
  toggle_theme: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
  Simple,
  Mini,
  Rich,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LangArg {
  Ja,
  En,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
  Dark,
  Light,
}

impl From<ModeArg> for DisplayMode {
  fn from(arg: ModeArg) -> Self {
    match arg {
      ModeArg::Simple => DisplayMode::Simple,
      ModeArg::Mini => DisplayMode::Mini,
      ModeArg::Rich => DisplayMode::Rich,
    }
  }
}

impl From<LangArg> for Language {
  fn from(arg: LangArg) -> Self {
    match arg {
      LangArg::Ja => Language::Ja,
      LangArg::En => Language::En,
    }
  }
}

impl From<ThemeArg> for Theme {
  fn from(arg: ThemeArg) -> Self {
    match arg {
      ThemeArg::Dark => Theme::Dark,
      ThemeArg::Light => Theme::Light,
    }
  }
}

impl PrefsArgs {
  fn changes_anything(&self) -> bool {
    self.mode.is_some() || self.lang.is_some() || self.theme.is_some() || self.toggle_theme
  }

  fn apply(&self, prefs: &mut Preferences) {
    if let Some(mode) = self.mode {
      prefs.mode = mode.into();
    }
    if let Some(lang) = self.lang {
      prefs.lang = lang.into();
    }
    if let Some(theme) = self.theme {
      prefs.theme = theme.into();
    }
    if self.toggle_theme {
      prefs.theme = prefs.theme.toggled();
    }
  }
}

pub fn execute(args: PrefsArgs, config: Config) -> Result<()> {
  let store = DashboardStore::new(&config.data_dir);

  let state = if args.changes_anything() {
    let state = store.update(|state| args.apply(&mut state.preferences))?;
    info!("Preferences saved to {}", store.path().display());
    state
  } else {
    store.load()?
  };

  println!("{}", serde_json::to_string_pretty(&state.preferences)?);
  Ok(())
}
