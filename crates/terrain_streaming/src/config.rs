//! StreamingConfig - chunk grid, terrain scale and LOD thresholds.

use glam::DVec2;

use crate::constants::{DEFAULT_CHUNK_DIM, DEFAULT_DISTANCE_RATIO, DEFAULT_VERTICAL_CELLS};
use crate::error::ConfigError;
use crate::quadtree::QuadTreeConfig;

/// How per-level subdivision distances are chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum LodThresholds {
  /// `threshold[level] = ratio * node_size(level)`.
  DistanceRatio(f64),
  /// Explicit table, one entry per level below `max_lod`.
  Table(Vec<f64>),
}

/// Configuration of the streaming core.
///
/// Terrain space is the terrain's local frame: the quadtree covers
/// `[0, extent]²` on X/Z and every chunk spans `height_range` on Y. The
/// terrain's transform (see [`Terrain`](crate::terrain::Terrain)) places
/// that frame in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamingConfig {
  /// Horizontal cells per chunk edge (`CHUNK_DIM`).
  pub chunk_dim: u32,

  /// Vertical cells spanning `height_range`, identical at every level.
  pub vertical_cells: u32,

  /// Terrain-space size of one finest-level cell (terrain-to-world scale).
  pub cell_size: f64,

  /// Vertical span covered by every chunk, `(min, max)`.
  pub height_range: (f64, f64),

  /// Deepest quadtree level. 0 = a single chunk.
  pub max_lod: u8,

  /// Per-level subdivision distances.
  pub lod_thresholds: LodThresholds,
}

impl Default for StreamingConfig {
  fn default() -> Self {
    Self {
      chunk_dim: DEFAULT_CHUNK_DIM,
      vertical_cells: DEFAULT_VERTICAL_CELLS,
      cell_size: 1.0,
      height_range: (-64.0, 64.0),
      max_lod: 4,
      lod_thresholds: LodThresholds::DistanceRatio(DEFAULT_DISTANCE_RATIO),
    }
  }
}

impl StreamingConfig {
  pub fn with_chunk_dim(mut self, chunk_dim: u32) -> Self {
    self.chunk_dim = chunk_dim;
    self
  }

  pub fn with_vertical_cells(mut self, vertical_cells: u32) -> Self {
    self.vertical_cells = vertical_cells;
    self
  }

  pub fn with_cell_size(mut self, cell_size: f64) -> Self {
    self.cell_size = cell_size;
    self
  }

  pub fn with_height_range(mut self, min: f64, max: f64) -> Self {
    self.height_range = (min, max);
    self
  }

  pub fn with_max_lod(mut self, max_lod: u8) -> Self {
    self.max_lod = max_lod;
    self
  }

  pub fn with_distance_ratio(mut self, ratio: f64) -> Self {
    self.lod_thresholds = LodThresholds::DistanceRatio(ratio);
    self
  }

  pub fn with_threshold_table(mut self, table: Vec<f64>) -> Self {
    self.lod_thresholds = LodThresholds::Table(table);
    self
  }

  /// Terrain-space edge length of the root chunk.
  #[inline]
  pub fn extent(&self) -> f64 {
    self.chunk_dim as f64 * self.cell_size * (1u64 << self.max_lod.min(63)) as f64
  }

  /// Quadtree configuration covering the terrain's horizontal extent.
  pub fn quadtree_config(&self) -> QuadTreeConfig {
    match &self.lod_thresholds {
      LodThresholds::DistanceRatio(ratio) => {
        QuadTreeConfig::with_distance_ratio(DVec2::ZERO, self.extent(), self.max_lod, *ratio)
      }
      LodThresholds::Table(table) => QuadTreeConfig {
        origin: DVec2::ZERO,
        extent: self.extent(),
        max_lod: self.max_lod,
        thresholds: table.clone(),
      },
    }
  }

  /// Fail fast on anything that would produce wrong geometry.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.chunk_dim == 0 {
      return Err(ConfigError::ZeroChunkDim);
    }
    if self.vertical_cells == 0 {
      return Err(ConfigError::ZeroVerticalCells);
    }
    if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
      return Err(ConfigError::InvalidCellSize(self.cell_size));
    }
    let (min, max) = self.height_range;
    if !min.is_finite() || !max.is_finite() || min >= max {
      return Err(ConfigError::InvalidHeightRange { min, max });
    }
    self.quadtree_config().validate()
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
