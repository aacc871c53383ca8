//! In-memory doubles for the adapter, scheduler and card sink

use async_trait::async_trait;
use futures::future::BoxFuture;
use pulse_client::SourceAdapter;
use pulse_core::{Error, Result};
use pulse_models::MarketRecord;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FeedResult;
use crate::liveness::{CardSink, CardTick};
use crate::scheduler::{Job, Scheduler, TaskHandle};
use crate::staleness::Liveness;

/// Adapter answering from per-source queues; an empty queue is a network error
#[derive(Default)]
pub struct ScriptedAdapter {
  primary: Mutex<VecDeque<Result<Vec<MarketRecord>>>>,
  fallback: Mutex<VecDeque<Result<Vec<MarketRecord>>>>,
  pub primary_calls: AtomicUsize,
  pub fallback_calls: AtomicUsize,
}

impl ScriptedAdapter {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn push_primary(&self, result: Result<Vec<MarketRecord>>) {
    self.primary.lock().unwrap().push_back(result);
  }

  pub fn push_fallback(&self, result: Result<Vec<MarketRecord>>) {
    self.fallback.lock().unwrap().push_back(result);
  }

  pub fn primary_calls(&self) -> usize {
    self.primary_calls.load(Ordering::SeqCst)
  }

  pub fn fallback_calls(&self) -> usize {
    self.fallback_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl SourceAdapter for ScriptedAdapter {
  async fn fetch_primary(&self) -> Result<Vec<MarketRecord>> {
    self.primary_calls.fetch_add(1, Ordering::SeqCst);
    let next = self.primary.lock().unwrap().pop_front();
    next.unwrap_or_else(|| Err(Error::Network("unscripted primary call".to_string())))
  }

  async fn fetch_fallback(&self) -> Result<Vec<MarketRecord>> {
    self.fallback_calls.fetch_add(1, Ordering::SeqCst);
    let next = self.fallback.lock().unwrap().pop_front();
    next.unwrap_or_else(|| Err(Error::Network("unscripted fallback call".to_string())))
  }
}

/// Scheduler that queues work until the test runs it
#[derive(Default)]
pub struct ManualScheduler {
  once: Mutex<Vec<(Duration, BoxFuture<'static, ()>)>>,
  periodic: Mutex<Vec<(Duration, Job)>>,
}

impl ManualScheduler {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn pending_once(&self) -> usize {
    self.once.lock().unwrap().len()
  }

  pub fn periods(&self) -> Vec<Duration> {
    self.periodic.lock().unwrap().iter().map(|(every, _)| *every).collect()
  }

  pub fn once_delays(&self) -> Vec<Duration> {
    self.once.lock().unwrap().iter().map(|(after, _)| *after).collect()
  }

  /// Run every queued one-shot task to completion
  pub async fn run_once_tasks(&self) -> usize {
    let tasks: Vec<_> = self.once.lock().unwrap().drain(..).collect();
    let count = tasks.len();
    for (_, task) in tasks {
      task.await;
    }
    count
  }

  /// Fire every periodic job once
  pub async fn fire_periodic(&self) {
    let jobs: Vec<Job> = self.periodic.lock().unwrap().iter().map(|(_, job)| job.clone()).collect();
    for job in jobs {
      job().await;
    }
  }
}

impl Scheduler for ManualScheduler {
  fn schedule_periodic(&self, every: Duration, job: Job) -> FeedResult<TaskHandle> {
    self.periodic.lock().unwrap().push((every, job));
    Ok(TaskHandle::new(|| {}))
  }

  fn schedule_once(&self, after: Duration, task: BoxFuture<'static, ()>) -> FeedResult<TaskHandle> {
    self.once.lock().unwrap().push((after, task));
    Ok(TaskHandle::new(|| {}))
  }
}

/// Sink keeping everything it was given
#[derive(Default)]
pub struct RecordingSink {
  pub ticks: Mutex<Vec<CardTick>>,
  pub classes: Mutex<Vec<(String, Liveness)>>,
}

impl RecordingSink {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn take_ticks(&self) -> Vec<CardTick> {
    std::mem::take(&mut *self.ticks.lock().unwrap())
  }

  pub fn take_classes(&self) -> Vec<(String, Liveness)> {
    std::mem::take(&mut *self.classes.lock().unwrap())
  }
}

impl CardSink for RecordingSink {
  fn publish(&self, tick: &CardTick) {
    self.ticks.lock().unwrap().push(tick.clone());
  }

  fn classified(&self, name: &str, liveness: Liveness) {
    self.classes.lock().unwrap().push((name.to_string(), liveness));
  }
}
