//! Lattice sampling for one chunk.
//!
//! The chunk's own `(N + 1)² · (M + 1)` grid is sampled eagerly. Seam
//! polygons also need cells of neighbouring chunks, sampled at those chunks'
//! own resolution; their corners are fetched lazily and memoised.

use std::collections::HashMap;

use crate::constants::grid_index;
use crate::field::VolumetricField;
use crate::terrain::Terrain;

/// Density samples around one chunk, addressed by global lattice coordinates.
pub struct ChunkSamples<'a, F: VolumetricField> {
  terrain: &'a Terrain<F>,
  origin: [i64; 2],
  stride: i64,
  dim: usize,
  vertical: usize,
  own: Vec<f32>,
  foreign: HashMap<[i64; 3], f32>,
}

impl<'a, F: VolumetricField> ChunkSamples<'a, F> {
  /// Sample the chunk's own grid.
  pub fn new(terrain: &'a Terrain<F>, origin: [i64; 2], stride: i64) -> Self {
    let dim = terrain.chunk_dim() as usize;
    let vertical = terrain.vertical_cells() as usize;
    let mut own = vec![0.0; (dim + 1) * (dim + 1) * (vertical + 1)];

    for x in 0..=dim {
      for y in 0..=vertical {
        for z in 0..=dim {
          own[grid_index(x, y, z, dim, vertical)] = terrain.sample_lattice(
            origin[0] + x as i64 * stride,
            y as i64,
            origin[1] + z as i64 * stride,
          );
        }
      }
    }

    Self {
      terrain,
      origin,
      stride,
      dim,
      vertical,
      own,
      foreign: HashMap::new(),
    }
  }

  /// Sample at own-grid indices.
  #[inline]
  pub fn grid(&self, x: usize, y: usize, z: usize) -> f32 {
    self.own[grid_index(x, y, z, self.dim, self.vertical)]
  }

  /// True if every own sample is on the same side of the surface.
  pub fn is_homogeneous(&self) -> bool {
    let Some(first) = self.own.first() else {
      return true;
    };
    let solid = *first < 0.0;
    self.own.iter().all(|&s| (s < 0.0) == solid)
  }

  /// Sample at a global lattice point, inside or outside the own grid.
  pub fn lattice(&mut self, x: i64, y: i64, z: i64) -> f32 {
    let lx = x - self.origin[0];
    let lz = z - self.origin[1];
    let span = self.dim as i64 * self.stride;
    let on_grid = lx % self.stride == 0
      && lz % self.stride == 0
      && (0..=span).contains(&lx)
      && (0..=span).contains(&lz)
      && (0..=self.vertical as i64).contains(&y);

    if on_grid {
      return self.grid(
        (lx / self.stride) as usize,
        y as usize,
        (lz / self.stride) as usize,
      );
    }

    let terrain = self.terrain;
    *self
      .foreign
      .entry([x, y, z])
      .or_insert_with(|| terrain.sample_lattice(x, y, z))
  }
}
