use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;

mod commands;
use commands::{
  backup::{ExportArgs, ImportArgs},
  catalog::CatalogArgs,
  fetch::FetchArgs,
  layout::LayoutCommand,
  prefs::PrefsArgs,
  watch::WatchArgs,
};

mod config;
mod store;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "pulse")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Directory holding the saved dashboard state
  #[arg(long, global = true, env = "PULSE_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Run one fetch cycle and print the cards
  Fetch(FetchArgs),
  /// Keep the cards live until Ctrl-C
  Watch(WatchArgs),
  /// List the known instruments
  Catalog(CatalogArgs),
  /// Inspect or change the saved layout and favorites
  Layout(LayoutCommand),
  /// Show or change display preferences
  Prefs(PrefsArgs),
  /// Write a backup of layout, favorites and preferences
  Export(ExportArgs),
  /// Restore a backup written by `export`
  Import(ImportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let config = config::Config::from_env(cli.data_dir)?;

  // Execute command
  match cli.command {
    Commands::Fetch(args) => commands::fetch::execute(args, config).await?,
    Commands::Watch(args) => commands::watch::execute(args, config).await?,
    Commands::Catalog(args) => commands::catalog::execute(args, config)?,
    Commands::Layout(cmd) => commands::layout::execute(cmd, config)?,
    Commands::Prefs(args) => commands::prefs::execute(args, config)?,
    Commands::Export(args) => commands::backup::export(args, config)?,
    Commands::Import(args) => commands::backup::import(args, config)?,
  }

  Ok(())
}
