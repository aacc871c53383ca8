use crate::commands::card_line;
use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::{bail, Result};
use clap::Args;
use pulse_client::HttpSourceAdapter;
use pulse_feed::{CardPresenter, CardView, MarketDataService, RefreshOutcome, StalenessEvaluator};
use pulse_models::Catalog;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub struct FetchArgs {
  /// Print every cached record, not just the cards in the layout
  #[arg(short, long)]
  all: bool,

  /// Print the raw records as JSON
  #[arg(long)]
  json: bool,
}

pub async fn execute(args: FetchArgs, config: Config) -> Result<()> {
  let adapter = Arc::new(HttpSourceAdapter::new(&config.core)?);
  let service = MarketDataService::new(adapter, config.core.clone())?;

  let (source, count) = match service.refresh().await {
    RefreshOutcome::Updated { source, records } => (source, records),
    RefreshOutcome::Failed { primary, fallback } => match primary {
      Some(primary) => bail!("No source answered: {}; {}", primary, fallback),
      None => bail!("No source answered: {}", fallback),
    },
    RefreshOutcome::Skipped => bail!("A refresh was already running"),
  };
  info!("Fetched {} records from {}", count, source);

  let snapshot = service.snapshot();
  let mut records: Vec<_> = snapshot.values().collect();
  records.sort_by(|a, b| a.name.cmp(&b.name));

  if args.json {
    println!("{}", serde_json::to_string_pretty(&records)?);
    return Ok(());
  }

  let state = DashboardStore::new(&config.data_dir).load()?;
  let mut presenter = CardPresenter::new(StalenessEvaluator::from_config(&config.core));
  let now = service.now();

  let views: Vec<CardView> = if args.all {
    records.into_iter().map(|record| presenter.present(record, now)).collect()
  } else {
    presenter.present_layout(&state.display_items(&Catalog::builtin()), &snapshot, now)
  };

  println!("Source: {} ({} records)", source, count);
  for view in &views {
    println!("{}", card_line(view, state.preferences.mode));
  }

  Ok(())
}
