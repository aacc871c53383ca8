//! # pulse-models
//!
//! Data models shared by the market-pulse crates.
//!
//! - [`record::MarketRecord`]: one instrument as delivered by either source,
//!   every numeric field kept as the raw upstream text
//! - [`history::HistorySeries`]: the pipe-separated sparkline string, decoded
//!   lazily
//! - [`catalog`]: the built-in list of trackable instruments
//! - [`layout`]: saved card order, favorites, display preferences and the
//!   JSON backup document
//!
//! ## Usage
//!
//! ```ignore
//! use pulse_models::MarketRecord;
//!
//! let row = ["NI225", "NI225:INDEXNIKKEI", "38,000.5", "", "", "", "", ""];
//! let record = MarketRecord::from_columns(&row).expect("eight columns");
//! assert_eq!(record.name, "NI225");
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod history;
pub mod layout;
pub mod record;

pub use catalog::{Catalog, CatalogItem, ItemKind};
pub use history::{HistoryPoint, HistorySeries};
pub use layout::{Backup, DashboardState, DisplayMode, Favorites, Language, LayoutEntry, Preferences, Theme};
pub use record::{parse_numeric, MarketRecord, PrimaryItem};
