use crate::commands::{card_line, closed_label};
use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pulse_client::HttpSourceAdapter;
use pulse_feed::{
  CardIndicator, CardPresenter, CardSink, CardTick, Liveness, LivenessClock, MarketDataService, StalenessEvaluator,
  TokioScheduler,
};
use pulse_models::{Catalog, CatalogItem, DisplayMode, Language};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

#[derive(Args, Debug)]
pub struct WatchArgs {
  /// Only watch these cards (names as shown by `layout show`)
  #[arg(short, long, value_delimiter = ',')]
  cards: Vec<String>,
}

/// One progress bar per card: prefix is the lamp and name, message the counter
struct BarSink {
  bars: HashMap<String, ProgressBar>,
  closed: &'static str,
}

impl BarSink {
  fn new(multi: &MultiProgress, items: &[CatalogItem], lang: Language) -> Result<Self> {
    let style = ProgressStyle::with_template("{prefix:<14} {bar:24.green/white} {msg}")
      .context("Invalid progress template")?
      .progress_chars("━━─");

    let bars = items
      .iter()
      .map(|item| {
        let bar = multi.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bar.set_prefix(format!("● {}", item.name));
        bar.set_message("00:00");
        (item.name.clone(), bar)
      })
      .collect();

    Ok(Self { bars, closed: closed_label(lang) })
  }

  fn finish(&self) {
    for bar in self.bars.values() {
      bar.finish_and_clear();
    }
  }
}

impl CardSink for BarSink {
  fn publish(&self, tick: &CardTick) {
    let Some(bar) = self.bars.get(&tick.name) else {
      return;
    };

    match &tick.indicator {
      CardIndicator::Live { label, progress } => {
        bar.set_position((progress * 100.0).round() as u64);
        bar.set_message(label.clone());
      }
      CardIndicator::Frozen => {
        bar.set_position(0);
        bar.set_message(self.closed);
      }
    }
  }

  fn classified(&self, name: &str, liveness: Liveness) {
    if let Some(bar) = self.bars.get(name) {
      let lamp = if liveness.is_live() { '●' } else { '○' };
      bar.set_prefix(format!("{} {}", lamp, name));
    }
  }
}

pub async fn execute(args: WatchArgs, config: Config) -> Result<()> {
  let state = DashboardStore::new(&config.data_dir).load()?;
  let cards: Vec<CatalogItem> = state
    .display_items(&Catalog::builtin())
    .into_iter()
    .filter(|item| item.is_sheet())
    .filter(|item| args.cards.is_empty() || args.cards.contains(&item.name))
    .collect();

  let adapter = Arc::new(HttpSourceAdapter::new(&config.core)?);
  let service = Arc::new(MarketDataService::new(adapter, config.core.clone())?);

  let multi = MultiProgress::new();
  let sink = Arc::new(BarSink::new(&multi, &cards, state.preferences.lang)?);
  let liveness = Arc::new(
    LivenessClock::new(service.clone(), Arc::new(TokioScheduler::new()), sink.clone())
      .with_cards(cards.iter().map(|item| item.name.clone())),
  );

  let updates = {
    let presenter = Mutex::new(CardPresenter::new(StalenessEvaluator::from_config(&config.core)));
    let weak = Arc::downgrade(&service);
    let multi = multi.clone();
    let cards = cards.clone();
    let mode = state.preferences.mode;
    service.on_data_updated(move || {
      if let Some(service) = weak.upgrade() {
        print_cards(&multi, &presenter, &service, &cards, mode);
      }
    })
  };

  let run = liveness.start()?;

  // First cycle right away; the clock takes over from here
  let outcome = service.refresh().await;
  liveness.reset_countdown();
  info!("Initial fetch: {:?}", outcome);

  tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;

  run.stop();
  service.unsubscribe(updates);
  sink.finish();
  info!("Stopped watching");
  Ok(())
}

fn print_cards(
  multi: &MultiProgress,
  presenter: &Mutex<CardPresenter>,
  service: &MarketDataService,
  cards: &[CatalogItem],
  mode: DisplayMode,
) {
  let snapshot = service.snapshot();
  let now = service.now();
  let views = match presenter.lock() {
    Ok(mut presenter) => presenter.present_layout(cards, &snapshot, now),
    Err(_) => return,
  };

  let status = service.status();
  let source = status.last_source.map(|s| s.to_string()).unwrap_or_default();
  let mut lines = vec![format!("── {} · {} records · {:?}", source, status.records, status.phase)];
  lines.extend(views.iter().map(|view| card_line(view, mode)));

  if let Err(e) = multi.println(lines.join("\n")) {
    error!("Failed to print cards: {}", e);
  }
}
