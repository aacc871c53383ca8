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

//! Fetch orchestrator.
//!
//! [`MarketDataService`] owns the record cache and the primary/fallback
//! state machine. Each [`refresh`](MarketDataService::refresh) runs one
//! fetch cycle:
//!
//! 1. While cooling down (the primary failed less than the cooldown ago)
//!    only the fallback is fetched.
//! 2. Otherwise the primary is fetched. Any failure stamps `failed_at`,
//!    enters the cooldown and falls through to the fallback in the same
//!    cycle. A success clears the failure.
//!
//! Every successful cycle replaces the cache and notifies the
//! `DataUpdated` listeners. A failed fallback keeps the previous cache.

use chrono::{DateTime, Utc};
use pulse_client::SourceAdapter;
use pulse_core::{Clock, Config, SourceKind, SystemClock};
use pulse_models::MarketRecord;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::{RecordCache, RecordMap};
use crate::error::{FeedError, FeedResult};
use crate::fallback::{FallbackPhase, FallbackState};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`MarketDataService::on_data_updated`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Result of one call to [`MarketDataService::refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
  /// The cache was replaced with `records` entries from `source`
  Updated { source: SourceKind, records: usize },
  /// No source answered; the cache is unchanged
  Failed { primary: Option<FeedError>, fallback: FeedError },
  /// Another refresh was already in flight
  Skipped,
}

impl RefreshOutcome {
  pub fn is_updated(&self) -> bool {
    matches!(self, RefreshOutcome::Updated { .. })
  }

  pub fn source(&self) -> Option<SourceKind> {
    match self {
      RefreshOutcome::Updated { source, .. } => Some(*source),
      _ => None,
    }
  }
}

/// Point-in-time view of the service for status displays
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
  pub phase: FallbackPhase,
  pub failed_at: Option<DateTime<Utc>>,
  pub cooldown_remaining: Duration,
  pub last_source: Option<SourceKind>,
  pub last_updated: Option<DateTime<Utc>>,
  pub records: usize,
  pub refreshing: bool,
}

#[derive(Debug, Default, Clone, Copy)]
struct LastUpdate {
  source: Option<SourceKind>,
  at: Option<DateTime<Utc>>,
}

/// Holds the in-flight flag for the lifetime of one refresh, including
/// when the refresh future is dropped part way through
struct RefreshGuard<'a> {
  flag: &'a AtomicBool,
}

impl<'a> RefreshGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self { flag })
  }
}

impl Drop for RefreshGuard<'_> {
  fn drop(&mut self) {
    self.flag.store(false, Ordering::Release);
  }
}

pub struct MarketDataService {
  adapter: Arc<dyn SourceAdapter>,
  clock: Arc<dyn Clock>,
  config: Config,
  cache: RecordCache,
  fallback: Mutex<FallbackState>,
  last_update: Mutex<LastUpdate>,
  listeners: Mutex<Vec<(Subscription, Listener)>>,
  next_subscription: AtomicU64,
  refreshing: AtomicBool,
}

impl MarketDataService {
  /// Service reading the system clock
  pub fn new(adapter: Arc<dyn SourceAdapter>, config: Config) -> FeedResult<Self> {
    Self::with_clock(adapter, Arc::new(SystemClock), config)
  }

  pub fn with_clock(adapter: Arc<dyn SourceAdapter>, clock: Arc<dyn Clock>, config: Config) -> FeedResult<Self> {
    config.validate()?;
    let fallback = FallbackState::new(config.cooldown());

    Ok(Self {
      adapter,
      clock,
      config,
      cache: RecordCache::new(),
      fallback: Mutex::new(fallback),
      last_update: Mutex::new(LastUpdate::default()),
      listeners: Mutex::new(Vec::new()),
      next_subscription: AtomicU64::new(1),
      refreshing: AtomicBool::new(false),
    })
  }

  /// Run one fetch cycle. Never fails: source errors are logged and
  /// reported through the outcome.
  pub async fn refresh(&self) -> RefreshOutcome {
    let Some(_guard) = RefreshGuard::acquire(&self.refreshing) else {
      debug!("Refresh already in flight, skipping");
      return RefreshOutcome::Skipped;
    };

    let now = self.clock.now();
    let phase = self.lock_fallback().phase(now);
    let mut primary_error = None;

    if phase.tries_primary() {
      if phase == FallbackPhase::Recovering {
        info!("Cooldown elapsed, retrying primary source");
      }

      match self.adapter.fetch_primary().await {
        Ok(records) => {
          self.lock_fallback().clear();
          return self.apply(SourceKind::Primary, records);
        }
        Err(e) => {
          warn!(
            "Primary source failed: {}. Switching to fallback for {} seconds",
            e,
            self.config.cooldown().as_secs()
          );
          self.lock_fallback().record_failure(now);
          primary_error = Some(FeedError::source_failed(SourceKind::Primary, &e));
        }
      }
    } else {
      let remaining = self.lock_fallback().remaining(now);
      info!("Primary source cooling down ({}s left), using fallback", remaining.as_secs());
    }

    match self.adapter.fetch_fallback().await {
      Ok(records) => self.apply(SourceKind::Fallback, records),
      Err(e) => {
        error!("Fallback source failed: {}. Keeping {} cached records", e, self.cache.len());
        RefreshOutcome::Failed { primary: primary_error, fallback: FeedError::source_failed(SourceKind::Fallback, &e) }
      }
    }
  }

  fn apply(&self, source: SourceKind, records: Vec<MarketRecord>) -> RefreshOutcome {
    let count = self.cache.replace(records);
    {
      let mut last = self.last_update.lock().unwrap_or_else(PoisonError::into_inner);
      last.source = Some(source);
      last.at = Some(self.clock.now());
    }

    info!("Data source: {} ({} records)", source, count);
    self.notify();
    RefreshOutcome::Updated { source, records: count }
  }

  fn notify(&self) {
    let listeners: Vec<Listener> = self.lock_listeners().iter().map(|(_, listener)| listener.clone()).collect();
    for listener in listeners {
      listener();
    }
  }

  /// Register a `DataUpdated` listener, called after every cache replacement
  pub fn on_data_updated<F>(&self, listener: F) -> Subscription
  where
    F: Fn() + Send + Sync + 'static,
  {
    let id = Subscription(self.next_subscription.fetch_add(1, Ordering::Relaxed));
    self.lock_listeners().push((id, Arc::new(listener)));
    id
  }

  /// Remove a listener. Returns false if it was not registered.
  pub fn unsubscribe(&self, subscription: Subscription) -> bool {
    let mut listeners = self.lock_listeners();
    let before = listeners.len();
    listeners.retain(|(id, _)| *id != subscription);
    listeners.len() != before
  }

  pub fn cache(&self) -> &RecordCache {
    &self.cache
  }

  pub fn snapshot(&self) -> Arc<RecordMap> {
    self.cache.snapshot()
  }

  pub fn phase(&self) -> FallbackPhase {
    self.lock_fallback().phase(self.clock.now())
  }

  pub fn failed_at(&self) -> Option<DateTime<Utc>> {
    self.lock_fallback().failed_at()
  }

  pub fn is_refreshing(&self) -> bool {
    self.refreshing.load(Ordering::Acquire)
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn clock(&self) -> Arc<dyn Clock> {
    self.clock.clone()
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn status(&self) -> ServiceStatus {
    let now = self.clock.now();
    let (phase, failed_at, cooldown_remaining) = {
      let fallback = self.lock_fallback();
      (fallback.phase(now), fallback.failed_at(), fallback.remaining(now))
    };
    let last = *self.last_update.lock().unwrap_or_else(PoisonError::into_inner);

    ServiceStatus {
      phase,
      failed_at,
      cooldown_remaining,
      last_source: last.source,
      last_updated: last.at,
      records: self.cache.len(),
      refreshing: self.is_refreshing(),
    }
  }

  fn lock_fallback(&self) -> MutexGuard<'_, FallbackState> {
    self.fallback.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_listeners(&self) -> MutexGuard<'_, Vec<(Subscription, Listener)>> {
    self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl std::fmt::Debug for MarketDataService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MarketDataService").field("config", &self.config).field("status", &self.status()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::ScriptedAdapter;
  use pulse_core::test_utils::ManualClock;
  use pulse_core::Error;
  use std::sync::atomic::AtomicUsize;

  fn service_with(adapter: Arc<ScriptedAdapter>, clock: Arc<ManualClock>) -> Arc<MarketDataService> {
    Arc::new(MarketDataService::with_clock(adapter, clock, Config::default()).unwrap())
  }

  fn records(names: &[&str]) -> Vec<MarketRecord> {
    names.iter().map(|n| MarketRecord::named(*n)).collect()
  }

  fn cached_names(service: &MarketDataService) -> Vec<String> {
    let mut names: Vec<_> = service.snapshot().keys().cloned().collect();
    names.sort();
    names
  }

  #[tokio::test]
  async fn test_primary_success_replaces_cache() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);
    service.cache().replace(records(&["OLD"]));

    adapter.push_primary(Ok(records(&["A", "B"])));
    let outcome = service.refresh().await;

    assert_eq!(outcome, RefreshOutcome::Updated { source: SourceKind::Primary, records: 2 });
    assert_eq!(cached_names(&service), vec!["A", "B"]);
    assert_eq!(service.phase(), FallbackPhase::Primary);
    assert_eq!(adapter.fallback_calls(), 0);
  }

  #[tokio::test]
  async fn test_primary_failure_falls_back_in_same_cycle() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock.clone());

    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Ok(records(&["A"])));
    let outcome = service.refresh().await;

    assert_eq!(outcome.source(), Some(SourceKind::Fallback));
    assert_eq!(service.phase(), FallbackPhase::CoolingDown);
    assert_eq!(service.failed_at(), Some(clock.now()));
    assert_eq!(adapter.primary_calls(), 1);
    assert_eq!(adapter.fallback_calls(), 1);
  }

  #[tokio::test]
  async fn test_cooldown_skips_primary() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock.clone());

    adapter.push_primary(Err(Error::Protocol("HTTP 503".to_string())));
    adapter.push_fallback(Ok(records(&["A"])));
    service.refresh().await;

    clock.advance(Duration::from_secs(120));
    adapter.push_fallback(Ok(records(&["A"])));
    let outcome = service.refresh().await;

    assert_eq!(outcome.source(), Some(SourceKind::Fallback));
    assert_eq!(adapter.primary_calls(), 1);
    assert_eq!(adapter.fallback_calls(), 2);
  }

  #[tokio::test]
  async fn test_primary_retried_after_cooldown() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock.clone());

    adapter.push_primary(Err(Error::Network("refused".to_string())));
    adapter.push_fallback(Ok(records(&["A"])));
    service.refresh().await;

    clock.advance(Duration::from_secs(300));
    assert_eq!(service.phase(), FallbackPhase::Recovering);

    adapter.push_primary(Ok(records(&["A", "B"])));
    let outcome = service.refresh().await;

    assert_eq!(outcome.source(), Some(SourceKind::Primary));
    assert_eq!(adapter.primary_calls(), 2);
    assert_eq!(service.phase(), FallbackPhase::Primary);
    assert!(service.failed_at().is_none());
  }

  #[tokio::test]
  async fn test_recovering_failure_restarts_cooldown() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock.clone());

    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Ok(records(&["A"])));
    service.refresh().await;

    clock.advance(Duration::from_secs(301));
    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Ok(records(&["A"])));
    service.refresh().await;

    assert_eq!(service.phase(), FallbackPhase::CoolingDown);
    assert_eq!(service.failed_at(), Some(clock.now()));
  }

  #[tokio::test]
  async fn test_fallback_cycle_replaces_not_merges() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);
    service.cache().replace(records(&["A", "B"]));

    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Ok(records(&["A"])));
    service.refresh().await;

    assert_eq!(cached_names(&service), vec!["A"]);
  }

  #[tokio::test]
  async fn test_both_sources_failing_keeps_cache() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);
    service.cache().replace(records(&["A", "B"]));
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    service.on_data_updated(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Err(Error::Protocol("HTTP 500".to_string())));
    let outcome = service.refresh().await;

    match outcome {
      RefreshOutcome::Failed { primary, fallback } => {
        assert!(matches!(primary, Some(FeedError::Source { source_kind: SourceKind::Primary, .. })));
        assert!(matches!(fallback, FeedError::Source { source_kind: SourceKind::Fallback, .. }));
      }
      other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(cached_names(&service), vec!["A", "B"]);
    assert_eq!(notified.load(Ordering::SeqCst), 0);
    assert_eq!(service.phase(), FallbackPhase::CoolingDown);
  }

  #[tokio::test]
  async fn test_listeners_notified_and_unsubscribed() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let subscription = service.on_data_updated(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    adapter.push_primary(Ok(records(&["A"])));
    service.refresh().await;
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    assert!(service.unsubscribe(subscription));
    assert!(!service.unsubscribe(subscription));

    adapter.push_primary(Ok(records(&["A"])));
    service.refresh().await;
    assert_eq!(notified.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_listener_sees_new_cache() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);
    let seen = Arc::new(Mutex::new(0usize));
    let sink = seen.clone();
    let weak = Arc::downgrade(&service);
    service.on_data_updated(move || {
      if let Some(service) = weak.upgrade() {
        *sink.lock().unwrap() = service.snapshot().len();
      }
    });

    adapter.push_primary(Ok(records(&["A", "B", "C"])));
    service.refresh().await;
    assert_eq!(*seen.lock().unwrap(), 3);
  }

  #[tokio::test]
  async fn test_concurrent_refresh_is_skipped() {
    struct GatedAdapter {
      gate: tokio::sync::Notify,
      calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SourceAdapter for GatedAdapter {
      async fn fetch_primary(&self) -> pulse_core::Result<Vec<MarketRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(vec![MarketRecord::named("A")])
      }

      async fn fetch_fallback(&self) -> pulse_core::Result<Vec<MarketRecord>> {
        Ok(Vec::new())
      }
    }

    let adapter = Arc::new(GatedAdapter { gate: tokio::sync::Notify::new(), calls: AtomicUsize::new(0) });
    let clock = Arc::new(ManualClock::at_epoch());
    let service = Arc::new(MarketDataService::with_clock(adapter.clone(), clock, Config::default()).unwrap());

    let first = tokio::spawn({
      let service = service.clone();
      async move { service.refresh().await }
    });
    while !service.is_refreshing() {
      tokio::task::yield_now().await;
    }

    assert_eq!(service.refresh().await, RefreshOutcome::Skipped);
    assert!(service.status().refreshing);

    adapter.gate.notify_one();
    let outcome = first.await.unwrap();
    assert_eq!(outcome.source(), Some(SourceKind::Primary));
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    assert!(!service.is_refreshing());
  }

  #[tokio::test]
  async fn test_dropped_refresh_releases_guard() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock);

    {
      let _guard = RefreshGuard::acquire(&service.refreshing).unwrap();
      assert!(service.is_refreshing());
      assert!(RefreshGuard::acquire(&service.refreshing).is_none());
    }
    assert!(!service.is_refreshing());
  }

  #[tokio::test]
  async fn test_status_reports_last_source() {
    let adapter = ScriptedAdapter::new();
    let clock = Arc::new(ManualClock::at_epoch());
    let service = service_with(adapter.clone(), clock.clone());

    let status = service.status();
    assert!(status.last_source.is_none());
    assert_eq!(status.records, 0);

    adapter.push_primary(Err(Error::Timeout(5000)));
    adapter.push_fallback(Ok(records(&["A", "B"])));
    service.refresh().await;
    clock.advance(Duration::from_secs(60));

    let status = service.status();
    assert_eq!(status.last_source, Some(SourceKind::Fallback));
    assert_eq!(status.records, 2);
    assert_eq!(status.cooldown_remaining, Duration::from_secs(240));
    assert_eq!(status.phase, FallbackPhase::CoolingDown);
  }

  #[test]
  fn test_invalid_config_rejected() {
    let adapter = ScriptedAdapter::new();
    let config = Config { poll_interval_secs: 0, ..Config::default() };
    let result = MarketDataService::new(adapter, config);
    assert!(matches!(result, Err(FeedError::Configuration(_))));
  }
}
