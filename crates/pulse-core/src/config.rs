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

//! Configuration management for the market-pulse engine

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Main configuration struct for the fetch and liveness engines
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Primary JSON endpoint
  pub primary_url: String,

  /// Fallback CSV endpoint
  pub fallback_url: String,

  /// Bounded wait for the primary request in milliseconds
  pub primary_timeout_ms: u64,

  /// Bounded wait for the fallback request in milliseconds
  pub fallback_timeout_ms: u64,

  /// Seconds the primary is skipped after a failure
  pub cooldown_secs: u64,

  /// Seconds between fetch cycles
  pub poll_interval_secs: u64,

  /// Minutes after which a record timestamp is considered stale
  pub stale_after_mins: u64,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      primary_url: crate::DEFAULT_PRIMARY_URL.to_string(),
      fallback_url: crate::DEFAULT_FALLBACK_URL.to_string(),
      primary_timeout_ms: crate::PRIMARY_TIMEOUT_MS,
      fallback_timeout_ms: crate::FALLBACK_TIMEOUT_MS,
      cooldown_secs: crate::COOLDOWN_SECS,
      poll_interval_secs: crate::POLL_INTERVAL_SECS,
      stale_after_mins: crate::STALE_AFTER_MINS,
    }
  }
}

impl Config {
  /// Load configuration from environment variables, falling back to the
  /// built-in constants for anything unset
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let defaults = Config::default();

    let primary_url = env::var("PULSE_PRIMARY_URL").unwrap_or(defaults.primary_url);
    let fallback_url = env::var("PULSE_FALLBACK_URL").unwrap_or(defaults.fallback_url);

    let config = Config {
      primary_url,
      fallback_url,
      primary_timeout_ms: parse_env("PULSE_PRIMARY_TIMEOUT_MS", defaults.primary_timeout_ms)?,
      fallback_timeout_ms: parse_env("PULSE_FALLBACK_TIMEOUT_MS", defaults.fallback_timeout_ms)?,
      cooldown_secs: parse_env("PULSE_COOLDOWN_SECS", defaults.cooldown_secs)?,
      poll_interval_secs: parse_env("PULSE_POLL_INTERVAL_SECS", defaults.poll_interval_secs)?,
      stale_after_mins: parse_env("PULSE_STALE_AFTER_MINS", defaults.stale_after_mins)?,
    };

    config.validate()?;
    Ok(config)
  }

  /// Create a config pointing at custom endpoints (for testing)
  pub fn with_urls(primary_url: impl Into<String>, fallback_url: impl Into<String>) -> Self {
    Config { primary_url: primary_url.into(), fallback_url: fallback_url.into(), ..Default::default() }
  }

  /// Reject endpoints that are not absolute URLs and zero-length intervals
  pub fn validate(&self) -> Result<()> {
    for (key, value) in [("primary_url", &self.primary_url), ("fallback_url", &self.fallback_url)] {
      Url::parse(value).map_err(|e| Error::Config(format!("Invalid {}: {}", key, e)))?;
    }

    if self.poll_interval_secs == 0 {
      return Err(Error::Config("poll_interval_secs must be non-zero".to_string()));
    }

    if self.primary_timeout_ms == 0 || self.fallback_timeout_ms == 0 {
      return Err(Error::Config("request timeouts must be non-zero".to_string()));
    }

    Ok(())
  }

  pub fn primary_timeout(&self) -> Duration {
    Duration::from_millis(self.primary_timeout_ms)
  }

  pub fn fallback_timeout(&self) -> Duration {
    Duration::from_millis(self.fallback_timeout_ms)
  }

  pub fn cooldown(&self) -> Duration {
    Duration::from_secs(self.cooldown_secs)
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs)
  }

  pub fn stale_after(&self) -> Duration {
    Duration::from_secs(self.stale_after_mins * 60)
  }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T> {
  match env::var(key) {
    Ok(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("Invalid {}", key))),
    Err(_) => Ok(default),
  }
}
