//! Sparkline history carried as a raw `value#metadata|value#metadata` string

use serde::{Deserialize, Serialize};
use std::str::Split;

/// Raw history string. Decoding happens on every call to [`points`](Self::points);
/// nothing parsed is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistorySeries(String);

impl HistorySeries {
  pub fn new(raw: impl Into<String>) -> Self {
    HistorySeries(raw.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.trim().is_empty()
  }

  /// Lazily iterate the sample points
  pub fn points(&self) -> HistoryPoints<'_> {
    HistoryPoints { segments: self.0.split('|') }
  }

  /// Numeric sample values, skipping points whose value does not parse
  pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
    self.points().filter_map(|p| p.value())
  }
}

/// One sample: the value text and whatever followed the `#`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPoint<'a> {
  pub raw_value: &'a str,
  pub metadata: Option<&'a str>,
}

impl HistoryPoint<'_> {
  pub fn value(&self) -> Option<f64> {
    self.raw_value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
  }
}

/// Iterator returned by [`HistorySeries::points`]
pub struct HistoryPoints<'a> {
  segments: Split<'a, char>,
}

impl<'a> Iterator for HistoryPoints<'a> {
  type Item = HistoryPoint<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let segment = self.segments.next()?;
      if segment.trim().is_empty() {
        continue;
      }

      return Some(match segment.split_once('#') {
        Some((value, meta)) => HistoryPoint { raw_value: value, metadata: Some(meta) },
        None => HistoryPoint { raw_value: segment, metadata: None },
      });
    }
  }
}
