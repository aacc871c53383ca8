//! Fallback source: positional CSV from a published spreadsheet
//!
//! Parsing is plain: lines are split on `,` with no quote
//! handling, blank lines are dropped, the first remaining line is the
//! header, and a line becomes a record only when it has at least eight
//! fields (`name, symbol, price, previous close, change, change %,
//! history, timestamp`). Anything else is skipped without failing the batch.

use crate::transport::Transport;
use csv::{ReaderBuilder, StringRecord};
use pulse_core::{Error, Result};
use pulse_models::record::FALLBACK_COLUMNS;
use pulse_models::MarketRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Fallback endpoint client
#[derive(Debug, Clone)]
pub struct FallbackSource {
  transport: Arc<Transport>,
  url: String,
  timeout: Duration,
}

impl FallbackSource {
  /// Create a fallback source bound to `url` with a bounded wait of `timeout`
  pub fn new(transport: Arc<Transport>, url: impl Into<String>, timeout: Duration) -> Self {
    Self { transport, url: url.into(), timeout }
  }

  /// Endpoint URL
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Fetch and parse the sheet
  #[instrument(skip(self), fields(url = %self.url))]
  pub async fn fetch(&self) -> Result<Vec<MarketRecord>> {
    let body = self.transport.get_text(&self.url, self.timeout).await?;
    let records = parse_fallback_csv(&body)?;
    info!("Fallback source returned {} records", records.len());
    Ok(records)
  }
}

/// Parse a fallback CSV body.
///
/// Fails with `Error::Protocol` only when the body holds no data lines at
/// all (blank, or a header alone). Short or unreadable lines are skipped.
pub fn parse_fallback_csv(body: &str) -> Result<Vec<MarketRecord>> {
  let mut reader =
    ReaderBuilder::new().has_headers(false).flexible(true).quoting(false).from_reader(body.as_bytes());

  let mut seen_header = false;
  let mut data_lines = 0usize;
  let mut skipped = 0usize;
  let mut records = Vec::new();

  for (line, result) in reader.records().enumerate() {
    let row = match result {
      Ok(row) => row,
      Err(e) => {
        debug!("Skipping unreadable fallback line {}: {}", line + 1, e);
        skipped += 1;
        continue;
      }
    };

    if is_blank(&row) {
      continue;
    }

    if !seen_header {
      seen_header = true;
      continue;
    }

    data_lines += 1;
    let columns: Vec<&str> = row.iter().collect();
    match MarketRecord::from_columns(&columns) {
      Some(record) => records.push(record),
      None => {
        debug!(
          "Skipping fallback line {}: {} fields, need {}",
          line + 1,
          columns.len(),
          FALLBACK_COLUMNS
        );
        skipped += 1;
      }
    }
  }

  if data_lines == 0 {
    return Err(Error::Protocol("Fallback resource is empty".to_string()));
  }

  if skipped > 0 {
    debug!("Skipped {} malformed fallback lines", skipped);
  }

  Ok(records)
}

fn is_blank(row: &StringRecord) -> bool {
  row.len() <= 1 && row.iter().all(|field| field.trim().is_empty())
}
