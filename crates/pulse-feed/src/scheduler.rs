//! Timer seam for the liveness clock.
//!
//! The clock never sleeps itself; it asks a [`Scheduler`] for a periodic
//! tick, a one-shot startup check and fire-and-forget refreshes. Every
//! scheduled task is owned by a [`TaskHandle`] that cancels it on drop.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::{FeedError, FeedResult};

/// Work run on every period
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub trait Scheduler: Send + Sync {
  /// Run `job` every `every`, first after one full period
  fn schedule_periodic(&self, every: Duration, job: Job) -> FeedResult<TaskHandle>;

  /// Run `task` once after `after`
  fn schedule_once(&self, after: Duration, task: BoxFuture<'static, ()>) -> FeedResult<TaskHandle>;
}

/// Owner of a scheduled task. Dropping it cancels the task unless
/// [`detach`](Self::detach) was called.
pub struct TaskHandle {
  canceller: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl TaskHandle {
  pub fn new(canceller: impl FnOnce() + Send + Sync + 'static) -> Self {
    Self { canceller: Some(Box::new(canceller)) }
  }

  pub fn from_join(handle: JoinHandle<()>) -> Self {
    Self::new(move || handle.abort())
  }

  pub fn cancel(mut self) {
    if let Some(cancel) = self.canceller.take() {
      cancel();
    }
  }

  /// Let the task run to completion on its own
  pub fn detach(mut self) {
    self.canceller = None;
  }
}

impl Drop for TaskHandle {
  fn drop(&mut self) {
    if let Some(cancel) = self.canceller.take() {
      cancel();
    }
  }
}

impl std::fmt::Debug for TaskHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle").field("armed", &self.canceller.is_some()).finish()
  }
}

/// Scheduler spawning onto the ambient tokio runtime
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
  handle: Option<Handle>,
}

impl TokioScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Spawn onto a specific runtime instead of the current one
  pub fn with_handle(handle: Handle) -> Self {
    Self { handle: Some(handle) }
  }

  fn runtime(&self) -> FeedResult<Handle> {
    match &self.handle {
      Some(handle) => Ok(handle.clone()),
      None => Handle::try_current().map_err(|e| FeedError::Scheduler(e.to_string())),
    }
  }
}

impl Scheduler for TokioScheduler {
  fn schedule_periodic(&self, every: Duration, job: Job) -> FeedResult<TaskHandle> {
    if every.is_zero() {
      return Err(FeedError::Scheduler("period must be non-zero".to_string()));
    }

    let runtime = self.runtime()?;
    let handle = runtime.spawn(async move {
      let mut ticker = interval_at(Instant::now() + every, every);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        job().await;
      }
    });

    debug!("Scheduled periodic task every {:?}", every);
    Ok(TaskHandle::from_join(handle))
  }

  fn schedule_once(&self, after: Duration, task: BoxFuture<'static, ()>) -> FeedResult<TaskHandle> {
    let runtime = self.runtime()?;
    let handle = runtime.spawn(async move {
      if !after.is_zero() {
        tokio::time::sleep(after).await;
      }
      task.await;
    });
    Ok(TaskHandle::from_join(handle))
  }
}
