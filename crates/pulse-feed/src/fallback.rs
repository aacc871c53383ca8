//! Primary/fallback state machine.
//!
//! `failed_at` is the only stored state; the phase is derived from it and
//! the current time so that the transition from cooling down to recovering
//! needs no timer of its own.

use chrono::{DateTime, Utc};
use pulse_core::clock::elapsed_between;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FallbackPhase {
  /// Healthy: the primary is tried first
  Primary,
  /// The primary failed less than one cooldown ago; only the fallback is used
  CoolingDown,
  /// The cooldown has elapsed; the next attempt goes to the primary again
  Recovering,
}

impl FallbackPhase {
  /// Whether the next refresh should start with the primary source
  pub fn tries_primary(self) -> bool {
    !matches!(self, FallbackPhase::CoolingDown)
  }
}

#[derive(Debug, Clone)]
pub struct FallbackState {
  failed_at: Option<DateTime<Utc>>,
  cooldown: Duration,
}

impl FallbackState {
  pub fn new(cooldown: Duration) -> Self {
    Self { failed_at: None, cooldown }
  }

  pub fn phase(&self, now: DateTime<Utc>) -> FallbackPhase {
    match self.failed_at {
      None => FallbackPhase::Primary,
      Some(failed_at) if elapsed_between(failed_at, now) < self.cooldown => FallbackPhase::CoolingDown,
      Some(_) => FallbackPhase::Recovering,
    }
  }

  pub fn failed_at(&self) -> Option<DateTime<Utc>> {
    self.failed_at
  }

  /// Time left before the primary is tried again, zero when not cooling down
  pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
    match self.failed_at {
      Some(failed_at) => self.cooldown.saturating_sub(elapsed_between(failed_at, now)),
      None => Duration::ZERO,
    }
  }

  pub fn record_failure(&mut self, now: DateTime<Utc>) {
    self.failed_at = Some(now);
  }

  pub fn clear(&mut self) {
    self.failed_at = None;
  }
}
