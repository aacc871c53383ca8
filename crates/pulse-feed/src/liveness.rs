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

//! Liveness clock.
//!
//! One periodic tick (one second by default) drives every card's countdown
//! label and progress bar and starts a fetch cycle once the poll interval
//! has elapsed. Every tick, in order:
//!
//! 1. publish the countdown for each displayed card, frozen for cards whose
//!    data is stale;
//! 2. if the poll interval has elapsed and no refresh is in flight, restart
//!    the countdown and hand one refresh to the scheduler.
//!
//! Card staleness is re-evaluated once shortly after start, on every cache
//! update, and after every scheduled refresh whether or not it succeeded.
//!
//! The restart happens before the refresh runs, so a failing refresh still
//! waits a full interval before the next attempt.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use pulse_core::clock::elapsed_between;
use pulse_core::{STARTUP_CHECK_DELAY_MS, TICK_INTERVAL_MS};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::FeedResult;
use crate::scheduler::{Job, Scheduler, TaskHandle};
use crate::service::{MarketDataService, RefreshOutcome, Subscription};
use crate::staleness::{Liveness, StalenessEvaluator};

/// Countdown state derived from the time since the last fetch cycle started
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
  pub elapsed_secs: u64,
  /// `mm:ss`
  pub label: String,
  /// `elapsed / interval`, clamped to `[0, 1]`
  pub progress: f64,
  /// The poll interval has elapsed
  pub due: bool,
}

pub fn countdown(elapsed: Duration, interval: Duration) -> Countdown {
  let secs = elapsed.as_secs();
  let progress = if interval.is_zero() { 1.0 } else { (elapsed.as_secs_f64() / interval.as_secs_f64()).min(1.0) };

  Countdown { elapsed_secs: secs, label: format!("{:02}:{:02}", secs / 60, secs % 60), progress, due: elapsed >= interval }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardIndicator {
  Live { label: String, progress: f64 },
  /// Stale data: the counter stops and the bar sits at zero
  Frozen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardTick {
  pub name: String,
  pub indicator: CardIndicator,
}

/// Renderer side of the clock
pub trait CardSink: Send + Sync {
  fn publish(&self, tick: &CardTick);

  /// Called when a card's staleness is (re)evaluated
  fn classified(&self, _name: &str, _liveness: Liveness) {}
}

/// What one tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
  pub countdown: Countdown,
  pub triggered: bool,
}

pub struct LivenessClock {
  service: Arc<MarketDataService>,
  scheduler: Arc<dyn Scheduler>,
  sink: Arc<dyn CardSink>,
  evaluator: StalenessEvaluator,
  poll_interval: Duration,
  cards: RwLock<Vec<String>>,
  last_fetch_at: Mutex<DateTime<Utc>>,
  classes: Mutex<HashMap<String, Liveness>>,
}

impl LivenessClock {
  pub fn new(service: Arc<MarketDataService>, scheduler: Arc<dyn Scheduler>, sink: Arc<dyn CardSink>) -> Self {
    let config = service.config();
    let evaluator = StalenessEvaluator::from_config(config);
    let poll_interval = config.poll_interval();
    let started = service.now();

    Self {
      service,
      scheduler,
      sink,
      evaluator,
      poll_interval,
      cards: RwLock::new(Vec::new()),
      last_fetch_at: Mutex::new(started),
      classes: Mutex::new(HashMap::new()),
    }
  }

  /// Builder: the names of the displayed data cards
  pub fn with_cards<I, S>(self, cards: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.set_cards(cards);
    self
  }

  pub fn set_cards<I, S>(&self, cards: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let cards: Vec<String> = cards.into_iter().map(Into::into).collect();
    self.lock_classes().retain(|name, _| cards.contains(name));
    *self.cards.write().unwrap_or_else(PoisonError::into_inner) = cards;
  }

  pub fn cards(&self) -> Vec<String> {
    self.cards.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn last_fetch_at(&self) -> DateTime<Utc> {
    *self.lock_last_fetch()
  }

  /// Restart the countdown without fetching
  pub fn reset_countdown(&self) {
    *self.lock_last_fetch() = self.service.now();
  }

  /// Last classification of a card; `None` until its record has been seen
  pub fn liveness_of(&self, name: &str) -> Option<Liveness> {
    self.lock_classes().get(name).copied()
  }

  pub fn tick(self: &Arc<Self>) -> TickReport {
    let now = self.service.now();
    let countdown = countdown(elapsed_between(self.last_fetch_at(), now), self.poll_interval);

    self.publish(&countdown);

    let triggered = countdown.due && self.trigger_refresh(now);
    TickReport { countdown, triggered }
  }

  fn publish(&self, countdown: &Countdown) {
    let classes = self.lock_classes().clone();
    for name in self.cards() {
      let indicator = match classes.get(&name) {
        Some(Liveness::Stale) => CardIndicator::Frozen,
        _ => CardIndicator::Live { label: countdown.label.clone(), progress: countdown.progress },
      };
      self.sink.publish(&CardTick { name, indicator });
    }
  }

  fn trigger_refresh(self: &Arc<Self>, now: DateTime<Utc>) -> bool {
    if self.service.is_refreshing() {
      debug!("Poll interval elapsed but a refresh is still in flight");
      return false;
    }

    *self.lock_last_fetch() = now;

    let service = self.service.clone();
    let weak = Arc::downgrade(self);
    let task = async move {
      if let RefreshOutcome::Failed { fallback, .. } = service.refresh().await {
        warn!("Live monitor: refresh failed: {}", fallback);
      }
      // Also after failures: an outage never fires DataUpdated
      if let Some(clock) = weak.upgrade() {
        clock.reclassify();
      }
    };

    match self.scheduler.schedule_once(Duration::ZERO, task.boxed()) {
      Ok(handle) => {
        handle.detach();
        true
      }
      Err(e) => {
        error!("Live monitor: could not schedule refresh: {}", e);
        false
      }
    }
  }

  /// Re-evaluate staleness of every displayed card that has a cached record.
  /// Returns the number of cards classified.
  pub fn reclassify(&self) -> usize {
    let snapshot = self.service.snapshot();
    let now = self.service.now();
    let mut classified = Vec::new();

    {
      let mut classes = self.lock_classes();
      for name in self.cards() {
        match snapshot.get(&name) {
          Some(record) => {
            let liveness = self.evaluator.classify(record, now);
            classes.insert(name.clone(), liveness);
            classified.push((name, liveness));
          }
          None => {
            classes.remove(&name);
          }
        }
      }
    }

    for (name, liveness) in &classified {
      self.sink.classified(name, *liveness);
    }
    classified.len()
  }

  /// Staleness pass run once shortly after start, before the first cycle
  pub fn startup_check(&self) -> usize {
    let count = self.reclassify();
    info!("Startup staleness check classified {} cards", count);
    count
  }

  /// Schedule the tick and the startup check and follow cache updates.
  /// Everything stops when the returned [`LivenessRun`] is dropped.
  pub fn start(self: &Arc<Self>) -> FeedResult<LivenessRun> {
    let weak = Arc::downgrade(self);
    let job: Job = Arc::new(move || {
      let weak = weak.clone();
      async move {
        if let Some(clock) = weak.upgrade() {
          clock.tick();
        }
      }
      .boxed()
    });
    let tick = self.scheduler.schedule_periodic(Duration::from_millis(TICK_INTERVAL_MS), job)?;

    let weak = Arc::downgrade(self);
    let startup = self.scheduler.schedule_once(
      Duration::from_millis(STARTUP_CHECK_DELAY_MS),
      async move {
        if let Some(clock) = weak.upgrade() {
          clock.startup_check();
        }
      }
      .boxed(),
    )?;

    let weak = Arc::downgrade(self);
    let subscription = self.service.on_data_updated(move || {
      if let Some(clock) = weak.upgrade() {
        clock.reclassify();
      }
    });

    info!("Live monitor started: tick {}ms, poll every {}s", TICK_INTERVAL_MS, self.poll_interval.as_secs());
    Ok(LivenessRun { service: self.service.clone(), subscription, _tick: tick, _startup: startup })
  }

  fn lock_last_fetch(&self) -> MutexGuard<'_, DateTime<Utc>> {
    self.last_fetch_at.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_classes(&self) -> MutexGuard<'_, HashMap<String, Liveness>> {
    self.classes.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Running clock. Dropping it cancels the timers and the subscription.
pub struct LivenessRun {
  service: Arc<MarketDataService>,
  subscription: Subscription,
  _tick: TaskHandle,
  _startup: TaskHandle,
}

impl LivenessRun {
  pub fn stop(self) {
    drop(self);
  }
}

impl Drop for LivenessRun {
  fn drop(&mut self) {
    self.service.unsubscribe(self.subscription);
    debug!("Live monitor stopped");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{ManualScheduler, RecordingSink, ScriptedAdapter};
  use pulse_core::test_utils::{assert_approx_eq, ManualClock, DEFAULT_TOLERANCE};
  use pulse_core::{Clock, Config, Error};
  use pulse_models::MarketRecord;

  struct Harness {
    clock: Arc<ManualClock>,
    adapter: Arc<ScriptedAdapter>,
    scheduler: Arc<ManualScheduler>,
    sink: Arc<RecordingSink>,
    service: Arc<MarketDataService>,
    liveness: Arc<LivenessClock>,
  }

  fn harness(cards: &[&str]) -> Harness {
    let clock = Arc::new(ManualClock::at_epoch());
    let adapter = ScriptedAdapter::new();
    let scheduler = ManualScheduler::new();
    let sink = RecordingSink::new();
    let service =
      Arc::new(MarketDataService::with_clock(adapter.clone(), clock.clone(), Config::default()).unwrap());
    let liveness = Arc::new(
      LivenessClock::new(service.clone(), scheduler.clone(), sink.clone()).with_cards(cards.iter().copied()),
    );
    Harness { clock, adapter, scheduler, sink, service, liveness }
  }

  fn stamped(name: &str, at: DateTime<Utc>) -> MarketRecord {
    MarketRecord::named(name).with_timestamp(at.to_rfc3339())
  }

  #[test]
  fn test_countdown_label_and_progress() {
    let half = countdown(Duration::from_secs(10), Duration::from_secs(20));
    assert_eq!(half.label, "00:10");
    assert_approx_eq(half.progress, 0.5, DEFAULT_TOLERANCE);
    assert!(!half.due);

    let over = countdown(Duration::from_secs(75), Duration::from_secs(20));
    assert_eq!(over.label, "01:15");
    assert_approx_eq(over.progress, 1.0, DEFAULT_TOLERANCE);
    assert!(over.due);
  }

  #[test]
  fn test_countdown_first_second() {
    let start = countdown(Duration::from_millis(400), Duration::from_secs(20));
    assert_eq!(start.elapsed_secs, 0);
    assert_eq!(start.label, "00:00");
  }

  #[test]
  fn test_countdown_exactly_at_interval_is_due() {
    let at = countdown(Duration::from_secs(20), Duration::from_secs(20));
    assert!(at.due);
    assert_approx_eq(at.progress, 1.0, DEFAULT_TOLERANCE);
  }

  #[test]
  fn test_tick_publishes_every_card() {
    let h = harness(&["NI225", "US10Y"]);
    h.clock.advance(Duration::from_secs(10));

    let report = h.liveness.tick();
    assert!(!report.triggered);

    let ticks = h.sink.take_ticks();
    assert_eq!(ticks.len(), 2);
    for tick in ticks {
      match tick.indicator {
        CardIndicator::Live { label, progress } => {
          assert_eq!(label, "00:10");
          assert_approx_eq(progress, 0.5, DEFAULT_TOLERANCE);
        }
        CardIndicator::Frozen => panic!("card {} should not be frozen", tick.name),
      }
    }
    assert_eq!(h.scheduler.pending_once(), 0);
  }

  #[tokio::test]
  async fn test_tick_triggers_exactly_one_refresh() {
    let h = harness(&["A"]);
    h.adapter.push_primary(Ok(vec![MarketRecord::named("A")]));
    h.clock.advance(Duration::from_secs(20));

    let report = h.liveness.tick();
    assert!(report.triggered);
    assert_eq!(h.liveness.last_fetch_at(), h.clock.now());

    // The countdown restarted, so the next second does not trigger again
    h.clock.advance(Duration::from_secs(1));
    assert!(!h.liveness.tick().triggered);

    assert_eq!(h.scheduler.run_once_tasks().await, 1);
    assert_eq!(h.adapter.primary_calls(), 1);
    assert_eq!(h.service.snapshot().len(), 1);
  }

  #[tokio::test]
  async fn test_failed_refresh_still_restarts_countdown() {
    let h = harness(&["A"]);
    h.adapter.push_primary(Err(Error::Timeout(5000)));
    h.adapter.push_fallback(Err(Error::Network("offline".to_string())));
    h.clock.advance(Duration::from_secs(25));

    assert!(h.liveness.tick().triggered);
    h.scheduler.run_once_tasks().await;

    h.clock.advance(Duration::from_secs(19));
    let report = h.liveness.tick();
    assert!(!report.triggered);
    assert_eq!(report.countdown.label, "00:19");
  }

  #[tokio::test]
  async fn test_tick_does_not_trigger_while_refresh_in_flight() {
    struct SlowAdapter {
      gate: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl pulse_client::SourceAdapter for SlowAdapter {
      async fn fetch_primary(&self) -> pulse_core::Result<Vec<MarketRecord>> {
        self.gate.notified().await;
        Ok(Vec::new())
      }

      async fn fetch_fallback(&self) -> pulse_core::Result<Vec<MarketRecord>> {
        Ok(Vec::new())
      }
    }

    let clock = Arc::new(ManualClock::at_epoch());
    let adapter = Arc::new(SlowAdapter { gate: tokio::sync::Notify::new() });
    let scheduler = ManualScheduler::new();
    let service = Arc::new(MarketDataService::with_clock(adapter.clone(), clock.clone(), Config::default()).unwrap());
    let liveness = Arc::new(LivenessClock::new(service.clone(), scheduler.clone(), RecordingSink::new()));

    let in_flight = tokio::spawn({
      let service = service.clone();
      async move { service.refresh().await }
    });
    while !service.is_refreshing() {
      tokio::task::yield_now().await;
    }

    clock.advance(Duration::from_secs(30));
    let report = liveness.tick();
    assert!(report.countdown.due);
    assert!(!report.triggered);
    assert_eq!(scheduler.pending_once(), 0);

    adapter.gate.notify_one();
    in_flight.await.unwrap();

    assert!(liveness.tick().triggered);
  }

  #[tokio::test]
  async fn test_stale_cards_are_frozen_after_update() {
    let h = harness(&["FRESH", "OLD", "MISSING"]);
    let now = h.clock.now();
    h.adapter.push_primary(Ok(vec![stamped("FRESH", now), stamped("OLD", now - chrono::Duration::hours(2))]));

    let _run = h.liveness.start().unwrap();
    h.service.refresh().await;

    assert_eq!(h.liveness.liveness_of("FRESH"), Some(Liveness::Live));
    assert_eq!(h.liveness.liveness_of("OLD"), Some(Liveness::Stale));
    assert_eq!(h.liveness.liveness_of("MISSING"), None);

    let classes = h.sink.take_classes();
    assert_eq!(classes.len(), 2);

    h.clock.advance(Duration::from_secs(3));
    h.liveness.tick();
    let ticks = h.sink.take_ticks();
    let frozen: Vec<_> = ticks.iter().filter(|t| t.indicator == CardIndicator::Frozen).map(|t| t.name.as_str()).collect();
    assert_eq!(frozen, vec!["OLD"]);
  }

  #[tokio::test]
  async fn test_start_schedules_tick_and_startup_check() {
    let h = harness(&["A"]);
    h.service.cache().replace(vec![stamped("A", h.clock.now() - chrono::Duration::minutes(31))]);

    let run = h.liveness.start().unwrap();
    assert_eq!(h.scheduler.periods(), vec![Duration::from_millis(TICK_INTERVAL_MS)]);
    assert_eq!(h.scheduler.once_delays(), vec![Duration::from_millis(STARTUP_CHECK_DELAY_MS)]);

    // The startup check classifies without fetching
    h.scheduler.run_once_tasks().await;
    assert_eq!(h.liveness.liveness_of("A"), Some(Liveness::Stale));
    assert_eq!(h.adapter.primary_calls(), 0);

    h.clock.advance(Duration::from_secs(2));
    h.scheduler.fire_periodic().await;
    assert_eq!(h.sink.take_ticks(), vec![CardTick { name: "A".to_string(), indicator: CardIndicator::Frozen }]);

    run.stop();
  }

  #[tokio::test]
  async fn test_stopping_run_unsubscribes() {
    let h = harness(&["A"]);
    let run = h.liveness.start().unwrap();
    run.stop();

    h.adapter.push_primary(Ok(vec![stamped("A", h.clock.now())]));
    h.service.refresh().await;
    assert_eq!(h.liveness.liveness_of("A"), None);
  }

  #[tokio::test]
  async fn test_total_outage_freezes_aging_cards() {
    let h = harness(&["A"]);
    let t0 = h.clock.now();
    h.service.cache().replace(vec![stamped("A", t0)]);
    assert_eq!(h.liveness.reclassify(), 1);

    // 40 minutes of 20 s cycles with both sources down
    for _ in 0..120 {
      h.adapter.push_primary(Err(Error::Timeout(5000)));
      h.adapter.push_fallback(Err(Error::Network("offline".to_string())));
      h.clock.advance(Duration::from_secs(20));
      assert!(h.liveness.tick().triggered);
      h.scheduler.run_once_tasks().await;
    }

    assert_eq!(h.liveness.liveness_of("A"), Some(Liveness::Stale));
    assert_eq!(h.service.snapshot().len(), 1);

    h.sink.take_ticks();
    h.clock.advance(Duration::from_secs(1));
    h.liveness.tick();
    assert_eq!(h.sink.take_ticks(), vec![CardTick { name: "A".to_string(), indicator: CardIndicator::Frozen }]);
  }

  #[tokio::test]
  async fn test_failed_refresh_keeps_fresh_cards_live() {
    let h = harness(&["A"]);
    h.service.cache().replace(vec![stamped("A", h.clock.now())]);
    h.adapter.push_primary(Err(Error::Timeout(5000)));
    h.adapter.push_fallback(Err(Error::Network("offline".to_string())));

    h.clock.advance(Duration::from_secs(20));
    assert!(h.liveness.tick().triggered);
    h.scheduler.run_once_tasks().await;

    assert_eq!(h.liveness.liveness_of("A"), Some(Liveness::Live));
  }

  #[test]
  fn test_set_cards_drops_old_classes() {
    let h = harness(&["A", "B"]);
    h.service.cache().replace(vec![stamped("A", h.clock.now()), stamped("B", h.clock.now())]);
    assert_eq!(h.liveness.reclassify(), 2);

    h.liveness.set_cards(["B"]);
    assert_eq!(h.liveness.cards(), vec!["B".to_string()]);
    assert_eq!(h.liveness.liveness_of("A"), None);
    assert_eq!(h.liveness.liveness_of("B"), Some(Liveness::Live));
  }

  #[test]
  fn test_reset_countdown() {
    let h = harness(&[]);
    h.clock.advance(Duration::from_secs(15));
    h.liveness.reset_countdown();
    assert_eq!(h.liveness.tick().countdown.elapsed_secs, 0);
  }
}
