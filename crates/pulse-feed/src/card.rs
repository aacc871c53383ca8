//! Card view model.
//!
//! Turns cached records into what a card shows: the price split at the
//! decimal point, the change with its direction, sparkline samples, the
//! liveness lamp and a flash direction when the price moved since the card
//! was last presented.

use chrono::{DateTime, Utc};
use pulse_models::{parse_numeric, CatalogItem, MarketRecord};
use serde::Serialize;
use std::collections::HashMap;

use crate::cache::RecordMap;
use crate::staleness::{Liveness, StalenessEvaluator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeDirection {
  Up,
  Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceFlash {
  Up,
  Down,
}

/// Price text split at the first `.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceParts {
  pub integer: String,
  pub fraction: Option<String>,
}

impl PriceParts {
  pub fn split(raw: &str) -> Self {
    match raw.split_once('.') {
      Some((integer, fraction)) => PriceParts { integer: integer.to_string(), fraction: Some(fraction.to_string()) },
      None => PriceParts { integer: raw.to_string(), fraction: None },
    }
  }
}

impl std::fmt::Display for PriceParts {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.fraction {
      Some(fraction) => write!(f, "{}.{}", self.integer, fraction),
      None => write!(f, "{}", self.integer),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
  pub name: String,
  pub symbol: Option<String>,
  pub price: Option<PriceParts>,
  /// Change magnitude as received, sign removed
  pub change: Option<String>,
  pub change_percent: Option<String>,
  pub direction: ChangeDirection,
  pub sparkline: Vec<f64>,
  pub flash: Option<PriceFlash>,
  pub liveness: Liveness,
  pub timestamp: Option<String>,
}

/// Presents records and remembers the last raw price per card
#[derive(Debug, Default)]
pub struct CardPresenter {
  evaluator: StalenessEvaluator,
  last_prices: HashMap<String, String>,
}

impl CardPresenter {
  pub fn new(evaluator: StalenessEvaluator) -> Self {
    Self { evaluator, last_prices: HashMap::new() }
  }

  pub fn present(&mut self, record: &MarketRecord, now: DateTime<Utc>) -> CardView {
    let flash = self.flash_for(record);

    let direction = match record.change_value_parsed() {
      Some(value) if value >= 0.0 => ChangeDirection::Up,
      _ => ChangeDirection::Down,
    };

    CardView {
      name: record.name.clone(),
      symbol: record.symbol.clone(),
      price: record.price.as_deref().map(PriceParts::split),
      change: record.change_value.as_deref().map(|v| v.trim().trim_start_matches(['-', '+']).to_string()),
      change_percent: record.change_percent.clone(),
      direction,
      sparkline: record.history.as_ref().map(|h| h.values().collect()).unwrap_or_default(),
      flash,
      liveness: self.evaluator.classify(record, now),
      timestamp: record.timestamp.clone(),
    }
  }

  /// Views for the sheet cards of a layout, in layout order. Cards with no
  /// cached record are left out.
  pub fn present_layout(&mut self, items: &[CatalogItem], records: &RecordMap, now: DateTime<Utc>) -> Vec<CardView> {
    items
      .iter()
      .filter(|item| item.is_sheet())
      .filter_map(|item| records.get(&item.name))
      .map(|record| self.present(record, now))
      .collect()
  }

  fn flash_for(&mut self, record: &MarketRecord) -> Option<PriceFlash> {
    let Some(new_price) = record.price.as_deref() else {
      self.last_prices.remove(&record.name);
      return None;
    };

    let previous = self.last_prices.insert(record.name.clone(), new_price.to_string())?;
    if previous == new_price {
      return None;
    }

    let (old, new) = (parse_numeric(&previous)?, parse_numeric(new_price)?);
    if new > old {
      Some(PriceFlash::Up)
    } else if new < old {
      Some(PriceFlash::Down)
    } else {
      None
    }
  }
}
