//! Edge walk: one polygon per sign-changing minimal edge.
//!
//! # Ownership
//!
//! Edges strictly inside the chunk always belong to it. An edge on the chunk
//! boundary is shared with up to three other chunks; it is emitted once, by
//! the finest chunk around it, with ties between same-level chunks going to
//! the smallest node offset. Where the chunk is finer than a neighbour the
//! polygon mixes fine own cells with coarse cells sampled at the neighbour's
//! own lattice, which makes it transition geometry.
//!
//! # Winding
//!
//! ```text
//!   quadrants around an edge, counter-clockwise about +axis
//!
//!   X edge (y, z):  (+,+) (-,+) (-,-) (+,-)
//!   Y edge (x, z):  (+,+) (+,-) (-,-) (-,+)
//!   Z edge (x, y):  (+,+) (-,+) (-,-) (+,-)
//! ```
//!
//! Counter-clockwise order gives a normal along +axis; it is kept when the
//! lower endpoint is solid so faces point towards air.

use std::collections::HashMap;

use glam::DVec3;
use smallvec::SmallVec;

use super::cell;
use super::grid::ChunkSamples;
use super::ChunkDescriptor;
use crate::constants::CORNER_OFFSETS;
use crate::field::VolumetricField;
use crate::quadtree::NeighborLod;
use crate::terrain::Terrain;
use crate::types::{ChunkMesh, Vertex};

/// A cell of some chunk's grid: global cell indices at that chunk's level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellKey {
  pub level: u8,
  pub x: i64,
  pub y: i64,
  pub z: i64,
}

#[derive(Clone, Copy, Debug)]
struct CellVertex {
  /// Position in lattice units.
  lattice: DVec3,
  normal: [f32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
  X,
  Y,
  Z,
}

impl Axis {
  /// Own-grid cells around the edge starting at `(a, b, c)`, counter-clockwise
  /// about +axis.
  fn quadrants(self, a: i64, b: i64, c: i64) -> [[i64; 3]; 4] {
    match self {
      Axis::X => [[a, b, c], [a, b - 1, c], [a, b - 1, c - 1], [a, b, c - 1]],
      Axis::Y => [[a, b, c], [a, b, c - 1], [a - 1, b, c - 1], [a - 1, b, c]],
      Axis::Z => [[a, b, c], [a - 1, b, c], [a - 1, b - 1, c], [a, b - 1, c]],
    }
  }

  fn step(self) -> [usize; 3] {
    match self {
      Axis::X => [1, 0, 0],
      Axis::Y => [0, 1, 0],
      Axis::Z => [0, 0, 1],
    }
  }
}

/// Where a polygon ends up.
enum Emit {
  Skip,
  Primary(SmallVec<[CellKey; 4]>),
  Transition(SmallVec<[CellKey; 4]>),
}

/// Contouring state for one chunk.
pub struct Contour<'a, F: VolumetricField> {
  terrain: &'a Terrain<F>,
  chunk: &'a ChunkDescriptor,
  samples: ChunkSamples<'a, F>,
  origin: [i64; 2],
  stride: i64,
  dim: i64,
  vertical: i64,
  cells: HashMap<CellKey, CellVertex>,
  mesh: ChunkMesh,
}

impl<'a, F: VolumetricField> Contour<'a, F> {
  pub fn new(chunk: &'a ChunkDescriptor, terrain: &'a Terrain<F>) -> Self {
    let (ox, oz) = terrain.chunk_origin(&chunk.node);
    let origin = [ox, oz];
    let stride = terrain.cell_stride(chunk.node.level);
    Self {
      terrain,
      chunk,
      samples: ChunkSamples::new(terrain, origin, stride),
      origin,
      stride,
      dim: terrain.chunk_dim() as i64,
      vertical: terrain.vertical_cells() as i64,
      cells: HashMap::new(),
      mesh: ChunkMesh::default(),
    }
  }

  pub fn run(mut self) -> ChunkMesh {
    // Every edge has both endpoints on the own grid, so a single-sign grid
    // cannot produce any polygon.
    if self.samples.is_homogeneous() {
      return self.mesh;
    }

    let (n, m) = (self.dim, self.vertical);
    for a in 0..n {
      for b in 1..m {
        for c in 0..=n {
          self.visit(Axis::X, a, b, c);
        }
      }
    }
    for a in 0..=n {
      for b in 0..m {
        for c in 0..=n {
          self.visit(Axis::Y, a, b, c);
        }
      }
    }
    for a in 0..=n {
      for b in 1..m {
        for c in 0..n {
          self.visit(Axis::Z, a, b, c);
        }
      }
    }

    self.mesh
  }

  fn visit(&mut self, axis: Axis, a: i64, b: i64, c: i64) {
    let [dx, dy, dz] = axis.step();
    let (a0, b0, c0) = (a as usize, b as usize, c as usize);
    let s0 = self.samples.grid(a0, b0, c0);
    let s1 = self.samples.grid(a0 + dx, b0 + dy, c0 + dz);
    if (s0 < 0.0) == (s1 < 0.0) {
      return;
    }

    let (mut keys, transition) = match self.classify(axis.quadrants(a, b, c)) {
      Emit::Skip => return,
      Emit::Primary(keys) => (keys, false),
      Emit::Transition(keys) => (keys, true),
    };
    if s0 >= 0.0 {
      keys.reverse();
    }
    dedup_cyclic(&mut keys);
    if keys.len() < 3 {
      return;
    }

    let corners: SmallVec<[Vertex; 4]> = keys.iter().map(|&key| self.vertex(key)).collect();
    let out = if transition {
      &mut self.mesh.transition
    } else {
      &mut self.mesh.primary
    };
    for i in 1..corners.len() - 1 {
      out.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
    }
  }

  /// Resolve the four quadrant cells, or decide the edge is not ours.
  fn classify(&self, quadrants: [[i64; 3]; 4]) -> Emit {
    let node = self.chunk.node;
    let mut keys = SmallVec::new();
    let mut coarse = false;

    for [ia, jb, kc] in quadrants {
      let rx = self.region(ia);
      let rz = self.region(kc);
      let level = if (rx, rz) == (0, 0) {
        node.level
      } else {
        match self.chunk.neighborhood.get(rx, rz) {
          NeighborLod::Outside | NeighborLod::Finer => return Emit::Skip,
          NeighborLod::Leaf(level) if level == node.level => {
            let Some(other) = self.chunk.neighborhood.leaf(rx, rz) else {
              return Emit::Skip;
            };
            if (other.x, other.y) < (node.x, node.y) {
              return Emit::Skip;
            }
            level
          }
          NeighborLod::Leaf(level) => {
            coarse = true;
            level
          }
        }
      };
      keys.push(self.cell_key(level, ia, jb, kc));
    }

    if coarse {
      Emit::Transition(keys)
    } else {
      Emit::Primary(keys)
    }
  }

  /// -1, 0 or 1 depending on which side of the chunk an own-grid cell index
  /// falls on.
  #[inline]
  fn region(&self, index: i64) -> i32 {
    if index < 0 {
      -1
    } else if index >= self.dim {
      1
    } else {
      0
    }
  }

  /// Cell at `level` containing the centre of own-grid cell `(ia, jb, kc)`.
  fn cell_key(&self, level: u8, ia: i64, jb: i64, kc: i64) -> CellKey {
    let stride = self.terrain.cell_stride(level);
    // Doubled coordinates keep the cell centre on the integer lattice.
    let cx = 2 * self.origin[0] + (2 * ia + 1) * self.stride;
    let cz = 2 * self.origin[1] + (2 * kc + 1) * self.stride;
    CellKey {
      level,
      x: cx.div_euclid(2 * stride),
      y: jb,
      z: cz.div_euclid(2 * stride),
    }
  }

  fn vertex(&mut self, key: CellKey) -> Vertex {
    let cell = match self.cells.get(&key) {
      Some(cell) => *cell,
      None => {
        let cell = self.compute_cell(key);
        self.cells.insert(key, cell);
        cell
      }
    };

    let span = (self.dim * self.stride) as f64;
    let local = DVec3::new(
      (cell.lattice.x - self.origin[0] as f64) / span,
      cell.lattice.y / self.vertical as f64,
      (cell.lattice.z - self.origin[1] as f64) / span,
    )
    .as_vec3();

    Vertex {
      position: local.to_array(),
      normal: cell.normal,
    }
  }

  fn compute_cell(&mut self, key: CellKey) -> CellVertex {
    let stride = self.terrain.cell_stride(key.level);
    let mut corners = [0.0f32; 8];
    for (corner, [ox, oy, oz]) in corners.iter_mut().zip(CORNER_OFFSETS) {
      *corner = self
        .samples
        .lattice((key.x + ox) * stride, key.y + oy, (key.z + oz) * stride);
    }

    let p = cell::dual_vertex(&corners);
    let s = stride as f64;
    let lattice = DVec3::new(
      (key.x as f64 + p.x as f64) * s,
      key.y as f64 + p.y as f64,
      (key.z as f64 + p.z as f64) * s,
    );

    let horizontal = s * self.terrain.cell_size();
    let extent = DVec3::new(horizontal, self.terrain.vertical_step(), horizontal);
    CellVertex {
      lattice,
      normal: cell::gradient_normal(&corners, extent),
    }
  }
}

/// Drop consecutive repeats, treating the list as a cycle.
fn dedup_cyclic(keys: &mut SmallVec<[CellKey; 4]>) {
  keys.dedup();
  while keys.len() > 1 && keys.first() == keys.last() {
    keys.pop();
  }
}

#[cfg(test)]
mod tests {
  use smallvec::smallvec;

  use super::*;

  fn key(x: i64) -> CellKey {
    CellKey {
      level: 1,
      x,
      y: 0,
      z: 0,
    }
  }

  #[test]
  fn test_dedup_cyclic() {
    let mut keys: SmallVec<[CellKey; 4]> = smallvec![key(1), key(1), key(2), key(3)];
    dedup_cyclic(&mut keys);
    assert_eq!(keys.as_slice(), &[key(1), key(2), key(3)]);

    let mut keys: SmallVec<[CellKey; 4]> = smallvec![key(1), key(2), key(3), key(1)];
    dedup_cyclic(&mut keys);
    assert_eq!(keys.as_slice(), &[key(1), key(2), key(3)]);

    let mut keys: SmallVec<[CellKey; 4]> = smallvec![key(4), key(4), key(4), key(4)];
    dedup_cyclic(&mut keys);
    assert_eq!(keys.as_slice(), &[key(4)]);
  }

  #[test]
  fn test_consecutive_quadrants_share_a_face() {
    for axis in [Axis::X, Axis::Y, Axis::Z] {
      let q = axis.quadrants(5, 5, 5);
      for i in 0..4 {
        let (p, n) = (q[i], q[(i + 1) % 4]);
        let differing = (0..3).filter(|&d| p[d] != n[d]).count();
        assert_eq!(differing, 1, "{axis:?}: {p:?} -> {n:?}");
      }
    }
  }
}
