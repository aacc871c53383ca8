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

//! # pulse-feed
//!
//! The data-freshness engine behind the dashboard cards.
//!
//! This crate provides:
//! - [`MarketDataService`]: the fetch orchestrator (primary first, fallback on
//!   failure, five minute cooldown) owning the record cache
//! - [`LivenessClock`]: the one second tick driving countdowns, progress and
//!   the twenty second poll
//! - [`staleness`]: classification of record timestamps as live or stale
//! - [`card`]: per-card view models with price flash detection
//! - [`Scheduler`]: the timer seam, with [`TokioScheduler`] for production

pub mod cache;
pub mod card;
pub mod error;
pub mod fallback;
pub mod liveness;
pub mod scheduler;
pub mod service;
pub mod staleness;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use cache::{RecordCache, RecordMap};
pub use card::{CardPresenter, CardView, ChangeDirection, PriceFlash};
pub use error::{FeedError, FeedResult};
pub use fallback::{FallbackPhase, FallbackState};
pub use liveness::{countdown, CardIndicator, CardSink, CardTick, Countdown, LivenessClock, LivenessRun};
pub use scheduler::{Job, Scheduler, TaskHandle, TokioScheduler};
pub use service::{MarketDataService, RefreshOutcome, ServiceStatus, Subscription};
pub use staleness::{is_live, Liveness, StalenessEvaluator};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    CardSink, FeedError, FeedResult, LivenessClock, MarketDataService, RefreshOutcome, Scheduler, StalenessEvaluator,
    TokioScheduler,
  };
}
