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

//! Staleness evaluation of record timestamps.
//!
//! A record is live when its upstream timestamp is no older than the
//! threshold (30 minutes by default, boundary included). Missing or
//! unreadable timestamps are never live. Timestamps ahead of the local
//! clock count as live. The result only drives the card indicator; it
//! never changes the cache or the fetch decisions.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use pulse_core::clock::elapsed_between;
use pulse_core::Config;
use pulse_models::MarketRecord;
use serde::Serialize;
use std::time::Duration;

/// Zone-less layouts accepted besides RFC 3339, read as local time
const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y/%m/%d %H:%M:%S",
  "%Y/%m/%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Liveness {
  Live,
  Stale,
}

impl Liveness {
  pub fn is_live(self) -> bool {
    matches!(self, Liveness::Live)
  }
}

/// Parse an upstream timestamp
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
    return Some(parsed.with_timezone(&Utc));
  }

  NAIVE_FORMATS.iter().find_map(|format| {
    let naive = NaiveDateTime::parse_from_str(raw, format).ok()?;
    Local.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc))
  })
}

/// Live check against the default 30 minute threshold
pub fn is_live(timestamp: Option<&str>, now: DateTime<Utc>) -> bool {
  is_live_within(timestamp, now, Duration::from_secs(pulse_core::STALE_AFTER_MINS * 60))
}

pub fn is_live_within(timestamp: Option<&str>, now: DateTime<Utc>, threshold: Duration) -> bool {
  match timestamp.and_then(parse_timestamp) {
    Some(at) => elapsed_between(at, now) <= threshold,
    None => false,
  }
}

/// Classifies records with a configured threshold
#[derive(Debug, Clone, Copy)]
pub struct StalenessEvaluator {
  threshold: Duration,
}

impl Default for StalenessEvaluator {
  fn default() -> Self {
    Self::new(Duration::from_secs(pulse_core::STALE_AFTER_MINS * 60))
  }
}

impl StalenessEvaluator {
  pub fn new(threshold: Duration) -> Self {
    Self { threshold }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.stale_after())
  }

  pub fn threshold(&self) -> Duration {
    self.threshold
  }

  pub fn classify(&self, record: &MarketRecord, now: DateTime<Utc>) -> Liveness {
    if is_live_within(record.timestamp.as_deref(), now, self.threshold) {
      Liveness::Live
    } else {
      Liveness::Stale
    }
  }
}
