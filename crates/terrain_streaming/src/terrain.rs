//! Terrain - density field plus the lattice that chunks are sampled on.
//!
//! Every chunk at every level samples points of one global integer lattice:
//! horizontal lattice units are finest-level cells, vertical units are
//! vertical cells. Two chunks that name the same lattice point therefore
//! evaluate the field at bit-identical world positions, which is what makes
//! seams between chunks line up exactly.

use glam::{DAffine3, DVec2, DVec3};

use crate::config::StreamingConfig;
use crate::error::ConfigError;
use crate::field::VolumetricField;
use crate::quadtree::QuadNode;

// =============================================================================
// Terrain<F> - read-only field and coordinate mapping
// =============================================================================

/// Read-only terrain description shared with extraction workers.
///
/// Type parameter `F` allows compile-time field specialization for the hot
/// sampling loop; engines may use `Box<dyn VolumetricField>` instead.
///
/// # Transform
///
/// `transform` places terrain space in the world. A terrain is immutable once
/// shared with a job; build a new one to move it.
pub struct Terrain<F: VolumetricField> {
  chunk_dim: u32,
  vertical_cells: u32,
  cell_size: f64,
  height_min: f64,
  vertical_step: f64,
  max_lod: u8,
  transform: DAffine3,
  field: F,
}

impl<F: VolumetricField> Terrain<F> {
  /// Create a terrain with identity transform.
  pub fn new(config: &StreamingConfig, field: F) -> Result<Self, ConfigError> {
    config.validate()?;
    let (height_min, height_max) = config.height_range;
    Ok(Self {
      chunk_dim: config.chunk_dim,
      vertical_cells: config.vertical_cells,
      cell_size: config.cell_size,
      height_min,
      vertical_step: (height_max - height_min) / config.vertical_cells as f64,
      max_lod: config.max_lod,
      transform: DAffine3::IDENTITY,
      field,
    })
  }

  /// Replace the terrain-to-world transform.
  pub fn with_transform(mut self, transform: DAffine3) -> Self {
    self.transform = transform;
    self
  }

  pub fn field(&self) -> &F {
    &self.field
  }

  pub fn transform(&self) -> DAffine3 {
    self.transform
  }

  /// Horizontal cells per chunk edge (`CHUNK_DIM`).
  #[inline]
  pub fn chunk_dim(&self) -> u32 {
    self.chunk_dim
  }

  #[inline]
  pub fn vertical_cells(&self) -> u32 {
    self.vertical_cells
  }

  /// Terrain-space size of a finest-level cell.
  #[inline]
  pub fn cell_size(&self) -> f64 {
    self.cell_size
  }

  /// Terrain-space height of one vertical cell.
  #[inline]
  pub fn vertical_step(&self) -> f64 {
    self.vertical_step
  }

  #[inline]
  pub fn max_lod(&self) -> u8 {
    self.max_lod
  }

  /// Lattice units per cell at `level`: `2^(max_lod - level)`.
  #[inline]
  pub fn cell_stride(&self, level: u8) -> i64 {
    debug_assert!(level <= self.max_lod, "level {level} past max_lod {}", self.max_lod);
    1i64 << (self.max_lod - level)
  }

  /// Lattice units spanned by a chunk edge at `level`.
  #[inline]
  pub fn chunk_span(&self, level: u8) -> i64 {
    self.chunk_dim as i64 * self.cell_stride(level)
  }

  /// Lattice coordinates of a chunk's minimum corner, `(x, z)`.
  #[inline]
  pub fn chunk_origin(&self, node: &QuadNode) -> (i64, i64) {
    let span = self.chunk_span(node.level);
    (node.x as i64 * span, node.y as i64 * span)
  }

  /// Terrain-space position of a (possibly fractional) lattice point.
  #[inline]
  pub fn lattice_to_local(&self, x: f64, y: f64, z: f64) -> DVec3 {
    DVec3::new(
      x * self.cell_size,
      self.height_min + y * self.vertical_step,
      z * self.cell_size,
    )
  }

  /// World-space position of a lattice point.
  #[inline]
  pub fn lattice_to_world(&self, x: f64, y: f64, z: f64) -> DVec3 {
    self.transform.transform_point3(self.lattice_to_local(x, y, z))
  }

  /// Density at an integer lattice point.
  #[inline]
  pub fn sample_lattice(&self, x: i64, y: i64, z: i64) -> f32 {
    self.field
      .sample_density(self.lattice_to_world(x as f64, y as f64, z as f64))
  }

  /// World position of a chunk's minimum corner.
  pub fn chunk_coord_to_world(&self, node: &QuadNode) -> DVec3 {
    let (x, z) = self.chunk_origin(node);
    self.lattice_to_world(x as f64, 0.0, z as f64)
  }

  /// Maps chunk-local normalized coordinates to world space.
  ///
  /// Local X/Z in `[0, 1]` cover the footprint (scaled by
  /// `CHUNK_DIM * cell_size * 2^(max_lod - level)`), local Y in `[0, 1]`
  /// covers the height range.
  pub fn chunk_transform(&self, node: &QuadNode) -> DAffine3 {
    let (x, z) = self.chunk_origin(node);
    let origin = self.lattice_to_local(x as f64, 0.0, z as f64);
    let horizontal = self.chunk_span(node.level) as f64 * self.cell_size;
    let vertical = self.vertical_step * self.vertical_cells as f64;
    self.transform
      * DAffine3::from_translation(origin)
      * DAffine3::from_scale(DVec3::new(horizontal, vertical, horizontal))
  }

  /// Convert a global position to terrain space.
  ///
  /// Use this to transform the camera position before refinement.
  #[inline]
  pub fn viewer_to_local(&self, global_pos: DVec3) -> DVec3 {
    self.transform.inverse().transform_point3(global_pos)
  }

  /// Focal point for the quadtree: the camera projected onto terrain X/Z.
  pub fn focal_point(&self, camera_world: DVec3) -> DVec2 {
    let local = self.viewer_to_local(camera_world);
    DVec2::new(local.x, local.z)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fields::TiltedPlaneField;

  fn terrain() -> Terrain<TiltedPlaneField> {
    let config = StreamingConfig::default()
      .with_chunk_dim(4)
      .with_vertical_cells(8)
      .with_cell_size(2.0)
      .with_height_range(-8.0, 8.0)
      .with_max_lod(3);
    Terrain::new(&config, TiltedPlaneField::new()).expect("valid config")
  }

  #[test]
  fn rejects_invalid_config() {
    let config = StreamingConfig::default().with_chunk_dim(0);
    assert!(matches!(
      Terrain::new(&config, TiltedPlaneField::new()),
      Err(ConfigError::ZeroChunkDim)
    ));
  }

  #[test]
  fn lattice_math_scales_with_level() {
    let terrain = terrain();
    assert_eq!(terrain.cell_stride(3), 1);
    assert_eq!(terrain.cell_stride(0), 8);
    assert_eq!(terrain.chunk_span(1), 16);
    assert_eq!(terrain.chunk_origin(&QuadNode::new(1, 2, 2)), (8, 16));
  }

  #[test]
  fn lattice_to_local_covers_height_range() {
    let terrain = terrain();
    assert_eq!(terrain.lattice_to_local(0.0, 0.0, 0.0), DVec3::new(0.0, -8.0, 0.0));
    assert_eq!(terrain.lattice_to_local(3.0, 8.0, 1.0), DVec3::new(6.0, 8.0, 2.0));
  }

  #[test]
  fn chunk_transform_maps_unit_cube_to_footprint() {
    let terrain = terrain()
      .with_transform(DAffine3::from_translation(DVec3::new(100.0, 0.0, -50.0)));
    let node = QuadNode::new(1, 0, 1);
    let transform = terrain.chunk_transform(&node);

    assert_eq!(transform.transform_point3(DVec3::ZERO), terrain.chunk_coord_to_world(&node));
    assert_eq!(
      transform.transform_point3(DVec3::ONE),
      DVec3::new(100.0 + 64.0, 8.0, -50.0 + 32.0)
    );
  }

  #[test]
  fn focal_point_uses_terrain_space() {
    let terrain =
      terrain().with_transform(DAffine3::from_translation(DVec3::new(10.0, 5.0, 20.0)));
    assert_eq!(
      terrain.focal_point(DVec3::new(15.0, 100.0, 25.0)),
      DVec2::new(5.0, 5.0)
    );
  }
}
