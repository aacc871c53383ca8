//! Record cache shared between the fetch orchestrator and the renderers.
//!
//! The cache is a single immutable map behind an `Arc`. A successful fetch
//! builds a brand new map and swaps it in, so readers holding a snapshot
//! never observe a half-applied cycle and entries from an earlier cycle
//! never survive into a later one.

use pulse_models::MarketRecord;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// `name -> record` for one fetch cycle
pub type RecordMap = HashMap<String, MarketRecord>;

#[derive(Debug, Default)]
pub struct RecordCache {
  current: RwLock<Arc<RecordMap>>,
}

impl RecordCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Current contents. The returned map is never mutated afterwards.
  pub fn snapshot(&self) -> Arc<RecordMap> {
    self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Replace the whole cache with one batch. When a batch repeats a name
  /// the later record wins. Returns the number of entries now cached.
  pub fn replace(&self, records: Vec<MarketRecord>) -> usize {
    let map: RecordMap = records.into_iter().map(|r| (r.name.clone(), r)).collect();
    let len = map.len();
    *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(map);
    len
  }

  pub fn get(&self, name: &str) -> Option<MarketRecord> {
    self.snapshot().get(name).cloned()
  }

  pub fn len(&self) -> usize {
    self.snapshot().len()
  }

  pub fn is_empty(&self) -> bool {
    self.snapshot().is_empty()
  }
}
