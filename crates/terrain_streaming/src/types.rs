//! Core data types for chunk meshes.

use bytemuck::{Pod, Zeroable};

/// Output vertex, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
  /// Position in chunk-local normalized coordinates, each axis in `[0, 1]`.
  pub position: [f32; 3],

  /// Surface normal in terrain space (unit vector).
  pub normal: [f32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
    }
  }
}

/// Box spanned by a set of chunk-local positions.
///
/// Starts inverted so the first [`grow`](Self::grow) sets both corners.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  #[inline]
  pub fn grow(&mut self, point: [f32; 3]) {
    for ((lo, hi), p) in self.min.iter_mut().zip(&mut self.max).zip(point) {
      *lo = lo.min(p);
      *hi = hi.max(p);
    }
  }

  /// True until at least one point has been added.
  pub fn is_empty(&self) -> bool {
    self.min.iter().zip(&self.max).any(|(lo, hi)| lo > hi)
  }

  /// Edge lengths, zero for an empty box.
  pub fn size(&self) -> [f32; 3] {
    if self.is_empty() {
      return [0.0; 3];
    }
    [
      self.max[0] - self.min[0],
      self.max[1] - self.min[1],
      self.max[2] - self.min[2],
    ]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Extraction result for one chunk: two non-indexed triangle lists.
///
/// `primary` covers the chunk body and seams towards same-level neighbours.
/// `transition` stitches the chunk to coarser neighbours; it is empty when
/// no neighbour is coarser.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
  pub primary: Vec<Vertex>,
  pub transition: Vec<Vertex>,
}

impl ChunkMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.primary.is_empty() && self.transition.is_empty()
  }

  pub fn primary_triangles(&self) -> usize {
    self.primary.len() / 3
  }

  pub fn transition_triangles(&self) -> usize {
    self.transition.len() / 3
  }

  /// Number of triangles across both lists.
  pub fn triangle_count(&self) -> usize {
    self.primary_triangles() + self.transition_triangles()
  }

  /// Bounding box of every vertex, in chunk-local coordinates.
  pub fn bounds(&self) -> MinMaxAABB {
    let mut aabb = MinMaxAABB::empty();
    for v in self.primary.iter().chain(&self.transition) {
      aabb.grow(v.position);
    }
    aabb
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
