use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::Result;
use clap::Args;
use pulse_models::Catalog;

#[derive(Args, Debug)]
pub struct CatalogArgs {
  /// Only list cards fed by the data sources
  #[arg(short, long)]
  sheets: bool,
}

pub fn execute(args: CatalogArgs, config: Config) -> Result<()> {
  let catalog = Catalog::builtin();
  let state = DashboardStore::new(&config.data_dir).load()?;

  println!("{:<2} {:<14} {:<16} {:<7} SYMBOL", "", "ID", "NAME", "TYPE");
  for item in catalog.iter().filter(|item| !args.sheets || item.is_sheet()) {
    let star = if state.favorites.contains(&item.id) { "★" } else { "" };
    println!("{:<2} {:<14} {:<16} {:<7} {}", star, item.id, item.name, item.kind, item.symbol);
  }

  Ok(())
}
