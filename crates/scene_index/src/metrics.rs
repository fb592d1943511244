//! Engine-agnostic statistics for a spatial index.
//!
//! Feature-gated and runtime-toggled: without the `metrics` feature every
//! `record_*` call is a no-op.
//!
//! # Usage
//!
//! ```ignore
//! use scene_index::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics, then toggle at runtime:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let report = index.retrack(&positions);
//! println!("avg retrack: {:.1}us", index.metrics().avg_retrack_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Depth buckets tracked in [`IndexMetrics::nodes_per_depth`]; deeper nodes
/// land in the last bucket.
pub const DEPTH_BUCKETS: usize = 16;

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Fixed-capacity history of recent values, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.capacity == 0 {
      return;
    }
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  pub fn sum(&self) -> u64 {
    self.buffer.iter().sum()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128) // ~2 seconds of ticks at 60fps
  }
}

/// Index statistics, refreshed on build and on every retrack.
#[derive(Debug, Clone, Default)]
pub struct IndexMetrics {
  // Tree shape
  /// Live nodes at each depth (index = depth).
  pub nodes_per_depth: [u32; DEPTH_BUCKETS],
  pub leaf_count: u32,

  // Entities
  pub tracked_entities: u32,
  /// Entities re-homed by the last retrack.
  pub last_rehomed: u32,
  /// Entities evicted or untracked by the last retrack.
  pub last_dropped: u32,
  /// Re-homes since the index was built.
  pub total_rehomed: u64,
  /// Placement misses since the index was built.
  pub total_misses: u64,

  // Timing
  /// Rolling window of retrack times in microseconds.
  pub retrack_timings: RollingWindow<u64>,
  pub last_retrack_us: u64,
  pub build_us: u64,
}

impl IndexMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Recount the tree shape from `(depth, is_leaf)` pairs.
  pub fn record_tree<I>(&mut self, nodes: I, build_us: u64)
  where
    I: IntoIterator<Item = (u32, bool)>,
  {
    if !is_enabled() {
      return;
    }
    self.nodes_per_depth.fill(0);
    self.leaf_count = 0;
    for (depth, is_leaf) in nodes {
      let bucket = (depth as usize).min(DEPTH_BUCKETS - 1);
      self.nodes_per_depth[bucket] += 1;
      self.leaf_count += u32::from(is_leaf);
    }
    self.build_us = build_us;
  }

  pub fn record_retrack(&mut self, rehomed: usize, dropped: usize, timing_us: u64) {
    if !is_enabled() {
      return;
    }
    self.last_rehomed = rehomed as u32;
    self.last_dropped = dropped as u32;
    self.total_rehomed += rehomed as u64;
    self.retrack_timings.push(timing_us);
    self.last_retrack_us = timing_us;
  }

  pub fn record_miss(&mut self) {
    if is_enabled() {
      self.total_misses += 1;
    }
  }

  pub fn set_tracked(&mut self, count: usize) {
    if is_enabled() {
      self.tracked_entities = count as u32;
    }
  }

  pub fn total_nodes(&self) -> u32 {
    self.nodes_per_depth.iter().sum()
  }

  pub fn avg_retrack_us(&self) -> f64 {
    self.retrack_timings.average()
  }
}
