//! Neighborhood - what the active set holds around one node.
//!
//! The extractor needs, for each boundary of a chunk, the level of the chunk
//! on the other side so it can decide who emits the seam and at which
//! resolution the far side is sampled.

use super::{ActiveSet, QuadNode};

/// Content of the same-size region next to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NeighborLod {
  /// Past the edge of the domain.
  Outside,
  /// Covered by a single active leaf at this level (same or coarser).
  Leaf(u8),
  /// Subdivided into leaves finer than the node itself.
  Finer,
}

/// 3x3 neighbourhood of a node; the centre entry is the node itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighborhood {
  node: QuadNode,
  regions: [NeighborLod; 9],
}

impl Neighborhood {
  /// Look up all eight neighbours of `node` in `active`.
  pub fn of(node: QuadNode, active: &ActiveSet) -> Self {
    let mut regions = [NeighborLod::Outside; 9];
    for dy in -1..=1 {
      for dx in -1..=1 {
        regions[Self::index(dx, dy)] = match node.neighbor(dx, dy) {
          None => NeighborLod::Outside,
          Some(region) => match active.covering_level(&region) {
            Some(level) => NeighborLod::Leaf(level),
            None => NeighborLod::Finer,
          },
        };
      }
    }
    Self { node, regions }
  }

  /// Every neighbour inside the domain at the node's own level.
  pub fn uniform(node: QuadNode) -> Self {
    let mut regions = [NeighborLod::Outside; 9];
    for dy in -1..=1 {
      for dx in -1..=1 {
        if node.neighbor(dx, dy).is_some() {
          regions[Self::index(dx, dy)] = NeighborLod::Leaf(node.level);
        }
      }
    }
    Self { node, regions }
  }

  #[inline]
  fn index(dx: i32, dy: i32) -> usize {
    debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy));
    ((dy + 1) * 3 + (dx + 1)) as usize
  }

  pub fn node(&self) -> QuadNode {
    self.node
  }

  /// Region at offset `(dx, dy)`, each in -1..=1.
  #[inline]
  pub fn get(&self, dx: i32, dy: i32) -> NeighborLod {
    self.regions[Self::index(dx, dy)]
  }

  /// The active leaf covering the region at `(dx, dy)`, when it is a single
  /// leaf at the node's level or coarser.
  pub fn leaf(&self, dx: i32, dy: i32) -> Option<QuadNode> {
    match self.get(dx, dy) {
      NeighborLod::Leaf(level) => self.node.neighbor(dx, dy)?.ancestor(level),
      NeighborLod::Outside | NeighborLod::Finer => None,
    }
  }

  /// True if any face or corner borders a coarser leaf.
  pub fn has_coarser(&self) -> bool {
    self
      .regions
      .iter()
      .any(|r| matches!(r, NeighborLod::Leaf(level) if *level < self.node.level))
  }
}
