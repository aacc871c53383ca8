//! Helpers shared by the test suites of the pulse-* crates

use crate::clock::Clock;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Default tolerance for floating-point comparisons
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Assert that two floating-point numbers are approximately equal
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
  assert!(
    (actual - expected).abs() < tolerance,
    "Values not approximately equal:\n  actual:   {}\n  expected: {}\n  diff:     {}\n  tolerance: {}",
    actual,
    expected,
    (actual - expected).abs(),
    tolerance
  );
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { now: Mutex::new(start) }
  }

  /// A clock parked at 2025-01-06 09:00:00 UTC
  pub fn at_epoch() -> Self {
    Self::new(Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap())
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap();
    *now += chrono::Duration::from_std(by).unwrap();
  }

  pub fn set(&self, to: DateTime<Utc>) {
    *self.now.lock().unwrap() = to;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap()
  }
}
