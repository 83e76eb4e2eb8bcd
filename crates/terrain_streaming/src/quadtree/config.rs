//! QuadTreeConfig - domain, depth, and per-level distance thresholds.

use glam::DVec2;

use super::{DRect, QuadNode};
use crate::error::ConfigError;

/// Deepest level supported. Keeps lattice coordinates well inside i64 and node
/// offsets inside u32.
pub const MAX_SUPPORTED_LOD: u8 = 24;

/// Configuration for quadtree refinement.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadTreeConfig {
  /// Minimum corner of the covered square, in terrain space.
  pub origin: DVec2,

  /// Edge length of the covered square (the root footprint).
  pub extent: f64,

  /// Deepest level a node may be subdivided to. 0 = a single root chunk.
  pub max_lod: u8,

  /// `thresholds[level]`: a node at `level` subdivides while the focal point
  /// is closer than this to its footprint. One entry per level below
  /// `max_lod`.
  pub thresholds: Vec<f64>,
}

impl QuadTreeConfig {
  /// Thresholds proportional to node size: `threshold[l] = ratio * size(l)`.
  pub fn with_distance_ratio(origin: DVec2, extent: f64, max_lod: u8, ratio: f64) -> Self {
    let thresholds = (0..max_lod)
      .map(|level| ratio * extent / (1u64 << level) as f64)
      .collect();
    Self {
      origin,
      extent,
      max_lod,
      thresholds,
    }
  }

  /// Check the table is usable; called by [`QuadTree::new`](super::QuadTree::new).
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.extent.is_finite() || self.extent <= 0.0 {
      return Err(ConfigError::InvalidExtent(self.extent));
    }
    if self.max_lod > MAX_SUPPORTED_LOD {
      return Err(ConfigError::MaxLodTooLarge {
        max_lod: self.max_lod,
        limit: MAX_SUPPORTED_LOD,
      });
    }
    if self.thresholds.len() != self.max_lod as usize {
      return Err(ConfigError::ThresholdCount {
        expected: self.max_lod as usize,
        actual: self.thresholds.len(),
      });
    }
    for (level, &value) in self.thresholds.iter().enumerate() {
      if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidThreshold { level, value });
      }
      if level > 0 && value > self.thresholds[level - 1] {
        return Err(ConfigError::ThresholdsNotMonotonic { level });
      }
    }
    Ok(())
  }

  /// Edge length of a node footprint at `level`.
  #[inline]
  pub fn node_size(&self, level: u8) -> f64 {
    self.extent / (1u64 << level) as f64
  }

  /// Subdivision threshold for `level`; levels at or past `max_lod` never
  /// subdivide.
  #[inline]
  pub fn threshold(&self, level: u8) -> f64 {
    self.thresholds.get(level as usize).copied().unwrap_or(0.0)
  }

  /// Footprint of a node in terrain space.
  #[inline]
  pub fn node_bounds(&self, node: &QuadNode) -> DRect {
    let size = self.node_size(node.level);
    DRect::square(
      self.origin + DVec2::new(node.x as f64 * size, node.y as f64 * size),
      size,
    )
  }

  /// The whole covered square.
  #[inline]
  pub fn domain(&self) -> DRect {
    DRect::square(self.origin, self.extent)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(max_lod: u8, thresholds: Vec<f64>) -> QuadTreeConfig {
    QuadTreeConfig {
      origin: DVec2::ZERO,
      extent: 1024.0,
      max_lod,
      thresholds,
    }
  }

  #[test]
  fn test_distance_ratio_table_is_valid() {
    let cfg = QuadTreeConfig::with_distance_ratio(DVec2::ZERO, 1024.0, 4, 1.5);
    assert_eq!(cfg.thresholds, vec![1536.0, 768.0, 384.0, 192.0]);
    assert_eq!(cfg.validate(), Ok(()));
  }

  #[test]
  fn test_threshold_count_mismatch() {
    let err = config(3, vec![10.0, 5.0]).validate().unwrap_err();
    assert_eq!(
      err,
      ConfigError::ThresholdCount {
        expected: 3,
        actual: 2
      }
    );
  }

  #[test]
  fn test_rejects_non_positive_and_nan() {
    assert_eq!(
      config(2, vec![10.0, 0.0]).validate(),
      Err(ConfigError::InvalidThreshold {
        level: 1,
        value: 0.0
      })
    );
    assert!(matches!(
      config(1, vec![f64::NAN]).validate(),
      Err(ConfigError::InvalidThreshold { level: 0, .. })
    ));
  }

  #[test]
  fn test_rejects_increasing_thresholds() {
    assert_eq!(
      config(3, vec![10.0, 5.0, 6.0]).validate(),
      Err(ConfigError::ThresholdsNotMonotonic { level: 2 })
    );
  }

  #[test]
  fn test_rejects_bad_extent_and_depth() {
    let mut cfg = config(0, vec![]);
    cfg.extent = -1.0;
    assert_eq!(cfg.validate(), Err(ConfigError::InvalidExtent(-1.0)));

    let cfg = QuadTreeConfig::with_distance_ratio(DVec2::ZERO, 1.0, 30, 1.0);
    assert!(matches!(cfg.validate(), Err(ConfigError::MaxLodTooLarge { .. })));
  }

  #[test]
  fn test_zero_depth_needs_no_thresholds() {
    assert_eq!(config(0, vec![]).validate(), Ok(()));
    assert_eq!(config(0, vec![]).threshold(0), 0.0);
  }

  #[test]
  fn test_node_bounds() {
    let cfg = QuadTreeConfig::with_distance_ratio(DVec2::new(100.0, -50.0), 64.0, 3, 1.0);
    let bounds = cfg.node_bounds(&QuadNode::new(3, 1, 2));

    assert_eq!(cfg.node_size(2), 16.0);
    assert_eq!(bounds.min, DVec2::new(148.0, -34.0));
    assert_eq!(bounds.max, DVec2::new(164.0, -18.0));
  }
}
