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

//! The adapter seam between the feed engine and the network

use crate::sources::{fallback::FallbackSource, primary::PrimarySource};
use crate::transport::Transport;
use async_trait::async_trait;
use pulse_core::{Config, Result};
use pulse_models::MarketRecord;
use std::sync::Arc;

/// Fetches full record batches from the two remote sources.
///
/// Implementations must be idempotent and must not keep any state between
/// calls that changes what a later call returns; the feed engine owns the
/// cache and the fallback state machine.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
  /// Fetch from the primary source, bounded by its timeout
  async fn fetch_primary(&self) -> Result<Vec<MarketRecord>>;

  /// Fetch from the fallback source
  async fn fetch_fallback(&self) -> Result<Vec<MarketRecord>>;
}

/// Production adapter over HTTP
///
/// # Examples
///
/// ```rust,no_run
/// use pulse_client::{HttpSourceAdapter, SourceAdapter};
/// use pulse_core::Config;
///
/// # async fn run() -> pulse_core::Result<()> {
/// let adapter = HttpSourceAdapter::new(&Config::default())?;
/// let records = adapter.fetch_fallback().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpSourceAdapter {
  primary: PrimarySource,
  fallback: FallbackSource,
}

impl HttpSourceAdapter {
  /// Build both sources from the configuration, sharing one HTTP client
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration is invalid or the HTTP client
  /// cannot be created.
  pub fn new(config: &Config) -> Result<Self> {
    config.validate()?;
    let transport = Arc::new(Transport::new()?);

    Ok(Self {
      primary: PrimarySource::new(transport.clone(), &config.primary_url, config.primary_timeout()),
      fallback: FallbackSource::new(transport, &config.fallback_url, config.fallback_timeout()),
    })
  }

  /// Primary source
  pub fn primary(&self) -> &PrimarySource {
    &self.primary
  }

  /// Fallback source
  pub fn fallback(&self) -> &FallbackSource {
    &self.fallback
  }
}

#[async_trait]
impl SourceAdapter for HttpSourceAdapter {
  async fn fetch_primary(&self) -> Result<Vec<MarketRecord>> {
    self.primary.fetch().await
  }

  async fn fetch_fallback(&self) -> Result<Vec<MarketRecord>> {
    self.fallback.fetch().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pulse_core::Error;

  #[test]
  fn test_adapter_creation() {
    let config = Config::with_urls("https://primary.example/", "https://sheet.example/pub?output=csv");
    let adapter = HttpSourceAdapter::new(&config).expect("Failed to create adapter");
    assert_eq!(adapter.primary().url(), "https://primary.example/");
    assert_eq!(adapter.fallback().url(), "https://sheet.example/pub?output=csv");
  }

  #[test]
  fn test_adapter_rejects_invalid_config() {
    let config = Config::with_urls("::not-a-url::", "https://sheet.example/");
    assert!(matches!(HttpSourceAdapter::new(&config), Err(Error::Config(_))));
  }
}
