/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The per-instrument record shared by both sources and every renderer

use crate::history::HistorySeries;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of positional columns a fallback row must carry
pub const FALLBACK_COLUMNS: usize = 8;

/// One tracked instrument.
///
/// Numeric fields hold the upstream text untouched so that formatting and
/// precision survive; parse them with [`parse_numeric`] at display time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRecord {
  /// Cache key, matches a catalog entry name
  pub name: String,

  /// Display/lookup symbol
  pub symbol: Option<String>,

  /// Last price
  pub price: Option<String>,

  /// Previous close
  pub previous_close: Option<String>,

  /// Absolute change since the previous close
  pub change_value: Option<String>,

  /// Relative change since the previous close
  pub change_percent: Option<String>,

  /// Raw sparkline samples
  pub history: Option<HistorySeries>,

  /// Upstream freshness marker
  pub timestamp: Option<String>,
}

impl MarketRecord {
  /// A record with only its key set
  pub fn named(name: impl Into<String>) -> Self {
    MarketRecord {
      name: name.into(),
      symbol: None,
      price: None,
      previous_close: None,
      change_value: None,
      change_percent: None,
      history: None,
      timestamp: None,
    }
  }

  /// Build a record from one positional fallback row.
  ///
  /// Returns `None` when the row has fewer than [`FALLBACK_COLUMNS`] fields.
  /// The name is trimmed; every other column is kept verbatim and columns
  /// past the eighth are ignored.
  pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Option<Self> {
    if columns.len() < FALLBACK_COLUMNS {
      return None;
    }

    let name = columns[0].as_ref().trim();

    let raw = |idx: usize| Some(columns[idx].as_ref().to_string());

    Some(MarketRecord {
      name: name.to_string(),
      symbol: raw(1),
      price: raw(2),
      previous_close: raw(3),
      change_value: raw(4),
      change_percent: raw(5),
      history: Some(HistorySeries::new(columns[6].as_ref())),
      timestamp: raw(7),
    })
  }

  pub fn with_price(mut self, price: impl Into<String>) -> Self {
    self.price = Some(price.into());
    self
  }

  pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
    self.timestamp = Some(timestamp.into());
    self
  }

  pub fn with_change(mut self, value: impl Into<String>, percent: impl Into<String>) -> Self {
    self.change_value = Some(value.into());
    self.change_percent = Some(percent.into());
    self
  }

  pub fn with_history(mut self, history: impl Into<String>) -> Self {
    self.history = Some(HistorySeries::new(history));
    self
  }

  /// Parsed price, if present and numeric
  pub fn price_value(&self) -> Option<f64> {
    self.price.as_deref().and_then(parse_numeric)
  }

  /// Parsed absolute change, if present and numeric
  pub fn change_value_parsed(&self) -> Option<f64> {
    self.change_value.as_deref().and_then(parse_numeric)
  }
}

/// One element of the primary endpoint's JSON array.
///
/// Every field may arrive as a string or a number; both are kept as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryItem {
  #[serde(default, deserialize_with = "raw_text")]
  pub name: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub symbol: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub price: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub close: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub chgval: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub chgpct: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub history: Option<String>,
  #[serde(default, deserialize_with = "raw_text")]
  pub timestamp: Option<String>,
}

impl PrimaryItem {
  /// Convert to a record; items without a usable name yield `None`
  pub fn into_record(self) -> Option<MarketRecord> {
    let name = self.name.filter(|n| !n.is_empty())?;

    Some(MarketRecord {
      name,
      symbol: self.symbol,
      price: self.price,
      previous_close: self.close,
      change_value: self.chgval,
      change_percent: self.chgpct,
      history: self.history.map(HistorySeries::new),
      timestamp: self.timestamp,
    })
  }
}

fn raw_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) => Some(s),
    Some(other) => Some(other.to_string()),
  })
}

/// Parse an upstream numeric string the way the cards read it: thousands
/// separators and a trailing `%` are ignored, surrounding whitespace trimmed.
pub fn parse_numeric(raw: &str) -> Option<f64> {
  let cleaned: String = raw.trim().trim_end_matches('%').chars().filter(|c| *c != ',').collect();
  cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
