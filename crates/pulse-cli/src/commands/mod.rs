pub mod backup;
pub mod catalog;
pub mod fetch;
pub mod layout;
pub mod prefs;
pub mod watch;

use pulse_feed::{CardView, ChangeDirection, Liveness, PriceFlash};
use pulse_models::{DisplayMode, Language};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Text shown instead of the counter on a card whose data is stale
pub(crate) fn closed_label(lang: Language) -> &'static str {
  match lang {
    Language::Ja => "休場中",
    Language::En => "closed",
  }
}

pub(crate) fn sparkline(values: &[f64]) -> String {
  let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
  let span = max - min;

  values
    .iter()
    .map(|v| {
      let level = if span > 0.0 { ((v - min) / span * 7.0).round() as usize } else { 3 };
      SPARK_LEVELS[level.min(7)]
    })
    .collect()
}

/// One terminal line for a card
pub(crate) fn card_line(view: &CardView, mode: DisplayMode) -> String {
  let lamp = match view.liveness {
    Liveness::Live => '●',
    Liveness::Stale => '○',
  };
  let price = view.price.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "--".to_string());
  let flash = match view.flash {
    Some(PriceFlash::Up) => " ↑",
    Some(PriceFlash::Down) => " ↓",
    None => "",
  };

  let mut line = format!("{} {:<10} {:>12}{}", lamp, view.name, price, flash);
  if mode == DisplayMode::Mini {
    return line;
  }

  let arrow = match view.direction {
    ChangeDirection::Up => '▲',
    ChangeDirection::Down => '▼',
  };
  line.push_str(&format!(
    "  {} {} {}",
    arrow,
    view.change.as_deref().unwrap_or("--"),
    view.change_percent.as_deref().unwrap_or("")
  ));

  if mode == DisplayMode::Rich {
    if !view.sparkline.is_empty() {
      line.push_str(&format!("  {}", sparkline(&view.sparkline)));
    }
    line.push_str(&format!("  {}", view.timestamp.as_deref().unwrap_or("--:--:--")));
  }
  line
}
