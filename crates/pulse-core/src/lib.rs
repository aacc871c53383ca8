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

//! # pulse-core
//!
//! Shared building blocks for the market-pulse crates: configuration,
//! the error taxonomy, the injectable clock and the timing constants the
//! fetch and liveness engines agree on.

pub mod clock;
pub mod config;
pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};

/// Where a batch of records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SourceKind {
  /// The JSON endpoint tried first on every healthy cycle
  Primary,
  /// The public CSV used while the primary is cooling down
  Fallback,
}

impl std::fmt::Display for SourceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SourceKind::Primary => write!(f, "primary (json)"),
      SourceKind::Fallback => write!(f, "fallback (csv)"),
    }
  }
}

/// Default primary endpoint
pub const DEFAULT_PRIMARY_URL: &str = "https://market-data-backend.shizuka-y.workers.dev/";

/// Default fallback endpoint (published spreadsheet, CSV output)
pub const DEFAULT_FALLBACK_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQbvCN-TxegvvgReZKPlV11iFE8MSSvPEvUsiVJS5_p25G59uTigeCAwuFnvsrLtoRqSMxbCc7TrIRj/pub?gid=0&single=true&output=csv";

/// Bounded wait for the primary request, in milliseconds
pub const PRIMARY_TIMEOUT_MS: u64 = 5_000;

/// Bounded wait for the fallback request, in milliseconds
pub const FALLBACK_TIMEOUT_MS: u64 = 10_000;

/// How long the primary is skipped after a failure
pub const COOLDOWN_SECS: u64 = 5 * 60;

/// Cadence of fetch cycles
pub const POLL_INTERVAL_SECS: u64 = 20;

/// Age after which a record is no longer live
pub const STALE_AFTER_MINS: u64 = 30;

/// Granularity of the liveness tick
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Delay before the one-shot staleness check at startup
pub const STARTUP_CHECK_DELAY_MS: u64 = 1_000;
