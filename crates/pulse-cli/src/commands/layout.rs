use crate::config::Config;
use crate::store::DashboardStore;
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use pulse_models::{Catalog, CatalogItem, DashboardState};
use tracing::info;

#[derive(Args, Debug)]
pub struct LayoutCommand {
  #[command(subcommand)]
  command: LayoutSubcommands,
}

#[derive(Subcommand, Debug)]
enum LayoutSubcommands {
  /// Print the cards in display order
  Show,

  /// Move a card to a new position (0 based)
  Move {
    /// Card name as shown by `layout show`
    name: String,

    /// Target position
    #[arg(long)]
    to: usize,
  },

  /// Mark a card as favorite
  FavoriteAdd {
    /// Card id
    id: String,
  },

  /// Remove a card from the favorites
  FavoriteRemove {
    /// Card id
    id: String,
  },

  /// Forget the saved order and all favorites
  Reset,
}

pub fn execute(cmd: LayoutCommand, config: Config) -> Result<()> {
  let store = DashboardStore::new(&config.data_dir);
  let catalog = Catalog::builtin();

  match cmd.command {
    LayoutSubcommands::Show => {
      let state = store.load()?;
      for (position, item) in state.display_items(&catalog).iter().enumerate() {
        let star = if state.favorites.contains(&item.id) { "★" } else { " " };
        println!("{:>3} {} {:<16} {:<7} {}", position, star, item.name, item.kind, item.id);
      }
    }
    LayoutSubcommands::Move { name, to } => {
      let mut state = store.load()?;
      let items = move_card(&state, &catalog, &name, to)?;
      state.save_layout(&items);
      store.save(&state)?;
      info!("Moved {} to position {}", name, to.min(items.len() - 1));
    }
    LayoutSubcommands::FavoriteAdd { id } => {
      catalog.find_by_id(&id).ok_or_else(|| anyhow!("Unknown card id: {}", id))?;
      let mut added = false;
      store.update(|state| added = state.favorites.add(id.clone()))?;
      if added {
        info!("Added {} to favorites", id);
      } else {
        info!("{} is already a favorite", id);
      }
    }
    LayoutSubcommands::FavoriteRemove { id } => {
      let mut removed = false;
      store.update(|state| removed = state.favorites.remove(&id))?;
      if removed {
        info!("Removed {} from favorites", id);
      } else {
        info!("{} was not a favorite", id);
      }
    }
    LayoutSubcommands::Reset => {
      store.update(DashboardState::reset)?;
      info!("Layout and favorites reset");
    }
  }

  Ok(())
}

/// Current display order with `name` moved to `to`, clamped to the end
fn move_card(state: &DashboardState, catalog: &Catalog, name: &str, to: usize) -> Result<Vec<CatalogItem>> {
  let mut items = state.display_items(catalog);
  let from = items.iter().position(|item| item.name == name).ok_or_else(|| anyhow!("Unknown card: {}", name))?;

  let item = items.remove(from);
  let to = to.min(items.len());
  items.insert(to, item);
  Ok(items)
}
