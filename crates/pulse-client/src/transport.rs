//! HTTP transport layer shared by both sources

use pulse_core::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("pulse-client/", env!("CARGO_PKG_VERSION"));

/// HTTP transport for plain GET requests with a bounded wait
#[derive(Debug, Clone)]
pub struct Transport {
  client: Client,
}

impl Transport {
  /// Create a new transport instance
  pub fn new() -> Result<Self> {
    let client = Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { client })
  }

  /// GET `url` and return the body as text.
  ///
  /// The whole exchange (connect, status, body) must finish within
  /// `timeout`. On expiry the request future is dropped, which aborts the
  /// connection, and `Error::Timeout` is returned. Non-success statuses are
  /// `Error::Protocol`; transport failures are `Error::Network`.
  #[instrument(skip(self), fields(timeout_ms = timeout.as_millis() as u64))]
  pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
    let timeout_ms = timeout.as_millis() as u64;

    let exchange = async {
      let response = self.client.get(url).send().await.map_err(|e| classify(e, timeout_ms))?;

      let status = response.status();
      if !status.is_success() {
        error!("Request failed with status: {}", status);
        return Err(Error::Protocol(format!("HTTP error: {}", status)));
      }
      debug!("Request successful with status: {}", status);

      let text = response.text().await.map_err(|e| classify(e, timeout_ms))?;
      debug!("Response body length: {} bytes", text.len());

      #[cfg(feature = "debug-logging")]
      debug!("Response text (first 500 chars): {}", text.chars().take(500).collect::<String>());

      Ok(text)
    };

    match tokio::time::timeout(timeout, exchange).await {
      Ok(result) => result,
      Err(_) => {
        warn!("Request to {} abandoned after {} ms", url, timeout_ms);
        Err(Error::Timeout(timeout_ms))
      }
    }
  }
}

fn classify(err: reqwest::Error, timeout_ms: u64) -> Error {
  if err.is_timeout() {
    Error::Timeout(timeout_ms)
  } else if err.is_decode() {
    Error::Protocol(format!("Failed to read response body: {}", err))
  } else {
    Error::Network(format!("Request failed: {}", err))
  }
}
