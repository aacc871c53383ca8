//! Primary source: JSON array of records
//!
//! Each array element must carry `name`; the optional `symbol`, `price`,
//! `close`, `chgval`, `chgpct`, `history` and `timestamp` fields map onto
//! [`MarketRecord`]. Elements without a name are skipped.

use crate::transport::Transport;
use pulse_core::{Error, Result};
use pulse_models::{MarketRecord, PrimaryItem};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Primary endpoint client
#[derive(Debug, Clone)]
pub struct PrimarySource {
  transport: Arc<Transport>,
  url: String,
  timeout: Duration,
}

impl PrimarySource {
  /// Create a primary source bound to `url` with a bounded wait of `timeout`
  pub fn new(transport: Arc<Transport>, url: impl Into<String>, timeout: Duration) -> Self {
    Self { transport, url: url.into(), timeout }
  }

  /// Endpoint URL
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Fetch and decode the record array
  #[instrument(skip(self), fields(url = %self.url))]
  pub async fn fetch(&self) -> Result<Vec<MarketRecord>> {
    let body = self.transport.get_text(&self.url, self.timeout).await?;
    let records = parse_primary(&body)?;
    info!("Primary source returned {} records", records.len());
    Ok(records)
  }
}

/// Decode a primary response body.
///
/// Anything other than a JSON array of objects is `Error::Protocol`.
pub fn parse_primary(body: &str) -> Result<Vec<MarketRecord>> {
  let items: Vec<PrimaryItem> = serde_json::from_str(body).map_err(|e| {
    Error::Protocol(format!(
      "Failed to parse primary response: {}. Response: {}",
      e,
      body.chars().take(200).collect::<String>()
    ))
  })?;

  let total = items.len();
  let records: Vec<MarketRecord> = items.into_iter().filter_map(PrimaryItem::into_record).collect();

  if records.len() < total {
    debug!("Skipped {} primary items without a name", total - records.len());
  }

  Ok(records)
}
