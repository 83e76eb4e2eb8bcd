//! Streaming statistics: job timings, extraction counts and what the live
//! snapshot holds.
//!
//! # Usage
//!
//! ```ignore
//! let metrics = streamer.metrics();
//! println!(
//!     "{} chunks live, last job {} us (avg {:.0} us)",
//!     metrics.published_groups,
//!     metrics.last_job_us,
//!     metrics.avg_job_timing_us(),
//! );
//! ```

use std::collections::VecDeque;

use crate::quadtree::ActiveSet;

/// The last `capacity` samples, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  samples: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Append a sample, dropping the oldest once full.
  pub fn record(&mut self, value: T) {
    if self.capacity == 0 {
      return;
    }
    if self.samples.len() == self.capacity {
      self.samples.pop_front();
    }
    self.samples.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn clear(&mut self) {
    self.samples.clear();
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.samples.iter()
  }

  pub fn latest(&self) -> Option<&T> {
    self.samples.back()
  }
}

impl RollingWindow<u64> {
  pub fn total(&self) -> u64 {
    self.samples.iter().sum()
  }

  /// Mean of the window; 0 when empty.
  pub fn mean(&self) -> f64 {
    match self.samples.len() {
      0 => 0.0,
      n => self.total() as f64 / n as f64,
    }
  }

  /// Smallest and largest sample.
  pub fn range(&self) -> Option<(u64, u64)> {
    let min = self.samples.iter().min()?;
    let max = self.samples.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::with_capacity(128)
  }
}

/// Counters updated by the streamer on the main thread.
#[derive(Debug, Clone, Default)]
pub struct StreamerMetrics {
  // Tree
  /// Active node count at each LOD level (index = level).
  pub active_per_lod: Vec<u32>,

  // Jobs
  /// Rolling window of whole-job durations in microseconds.
  pub job_timings: RollingWindow<u64>,
  pub last_job_us: u64,
  pub jobs_started: u64,
  pub jobs_completed: u64,
  /// Jobs whose worker died before reporting.
  pub jobs_lost: u64,
  /// Chunks extracted since start (cumulative).
  pub chunks_extracted: u64,
  /// Chunks carried over from the previous snapshot (cumulative).
  pub chunks_reused: u64,

  // Live snapshot
  pub published_generation: u64,
  pub published_groups: u32,
  pub primary_vertices: u64,
  pub transition_vertices: u64,
}

impl StreamerMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Recount active nodes per level.
  pub fn record_active(&mut self, active: &ActiveSet, max_lod: u8) {
    self.active_per_lod.clear();
    self.active_per_lod.resize(max_lod as usize + 1, 0);
    for node in active.iter() {
      self.active_per_lod[node.level as usize] += 1;
    }
  }

  pub fn record_job_started(&mut self) {
    self.jobs_started += 1;
  }

  pub fn record_job_completed(&mut self, extracted: usize, reused: usize, duration_us: u64) {
    self.jobs_completed += 1;
    self.chunks_extracted += extracted as u64;
    self.chunks_reused += reused as u64;
    self.job_timings.record(duration_us);
    self.last_job_us = duration_us;
  }

  pub fn record_job_lost(&mut self) {
    self.jobs_lost += 1;
  }

  pub fn record_publish(
    &mut self,
    generation: u64,
    groups: usize,
    primary_vertices: u64,
    transition_vertices: u64,
  ) {
    self.published_generation = generation;
    self.published_groups = groups as u32;
    self.primary_vertices = primary_vertices;
    self.transition_vertices = transition_vertices;
  }

  /// Total active nodes across all levels.
  pub fn total_active(&self) -> u32 {
    self.active_per_lod.iter().sum()
  }

  /// Mean duration of the recent jobs, in microseconds.
  pub fn avg_job_timing_us(&self) -> f64 {
    self.job_timings.mean()
  }

  /// Fraction of chunks served from a previous snapshot.
  pub fn reuse_ratio(&self) -> f64 {
    let total = self.chunks_extracted + self.chunks_reused;
    if total == 0 {
      0.0
    } else {
      self.chunks_reused as f64 / total as f64
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quadtree::QuadNode;

  #[test]
  fn test_rolling_window_keeps_latest_samples() {
    let mut window = RollingWindow::with_capacity(4);
    assert_eq!(window.range(), None);
    assert_eq!(window.mean(), 0.0);

    for us in [500u64, 100, 900, 300, 700] {
      window.record(us);
    }

    // 500 fell out of the window.
    assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![100, 900, 300, 700]);
    assert_eq!(window.total(), 2000);
    assert_eq!(window.mean(), 500.0);
    assert_eq!(window.range(), Some((100, 900)));
    assert_eq!(window.latest(), Some(&700));

    window.clear();
    assert!(window.is_empty());
  }

  #[test]
  fn test_zero_capacity_window_stays_empty() {
    let mut window = RollingWindow::with_capacity(0);
    window.record(1u64);
    assert_eq!(window.len(), 0);
  }

  #[test]
  fn test_active_per_lod() {
    let mut metrics = StreamerMetrics::new();
    let mut nodes = vec![QuadNode::new(1, 0, 1), QuadNode::new(0, 1, 1), QuadNode::new(1, 1, 1)];
    nodes.extend(QuadNode::new(0, 0, 1).children());
    let active: ActiveSet = nodes.into_iter().collect();

    metrics.record_active(&active, 3);

    assert_eq!(metrics.active_per_lod, vec![0, 3, 4, 0]);
    assert_eq!(metrics.total_active(), 7);
  }

  #[test]
  fn test_job_recording() {
    let mut metrics = StreamerMetrics::new();
    assert_eq!(metrics.reuse_ratio(), 0.0);

    metrics.record_job_started();
    metrics.record_job_completed(16, 0, 1000);
    metrics.record_job_started();
    metrics.record_job_completed(4, 12, 3000);

    assert_eq!(metrics.jobs_started, 2);
    assert_eq!(metrics.jobs_completed, 2);
    assert_eq!(metrics.chunks_extracted, 20);
    assert_eq!(metrics.chunks_reused, 12);
    assert_eq!(metrics.avg_job_timing_us(), 2000.0);
    assert_eq!(metrics.last_job_us, 3000);
    assert!((metrics.reuse_ratio() - 12.0 / 32.0).abs() < 1e-12);
  }
}
