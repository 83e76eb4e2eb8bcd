//! QuadNode - immutable value type naming one cell of the quadtree.
//!
//! Nodes are identified by their grid coordinates at their own level.
//! Level 0 = the root (coarsest), higher level = finer.

/// Quadtree node identity.
///
/// Grid coordinates are at the node's own level: a node at level `L` lives on
/// a `2^L x 2^L` grid covering the whole domain. `x` runs along terrain X and
/// `y` along terrain Z.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct QuadNode {
  /// Level of detail (0 = coarsest, higher = finer)
  pub level: u8,
  /// Grid X position at this node's level
  pub x: u32,
  /// Grid Y position at this node's level
  pub y: u32,
}

impl QuadNode {
  /// The single level-0 node covering the whole domain.
  pub const ROOT: QuadNode = QuadNode {
    level: 0,
    x: 0,
    y: 0,
  };

  pub fn new(x: u32, y: u32, level: u8) -> Self {
    Self { level, x, y }
  }

  /// Number of nodes along one axis at this node's level.
  #[inline]
  pub fn grid_size(&self) -> u32 {
    1 << self.level
  }

  /// Get child node (finer detail: level + 1).
  ///
  /// Quadrant: 0-3 where bit 0 is the +X half and bit 1 the +Y half.
  pub fn child(&self, quadrant: u8) -> Self {
    debug_assert!(quadrant < 4, "quadrant out of range: {quadrant}");
    Self {
      level: self.level + 1,
      x: self.x * 2 + (quadrant & 1) as u32,
      y: self.y * 2 + ((quadrant >> 1) & 1) as u32,
    }
  }

  /// All four children in quadrant order.
  pub fn children(&self) -> [Self; 4] {
    [self.child(0), self.child(1), self.child(2), self.child(3)]
  }

  /// Get parent node (coarser: level - 1). Returns None for the root.
  pub fn parent(&self) -> Option<Self> {
    if self.level == 0 {
      return None;
    }
    Some(Self {
      level: self.level - 1,
      x: self.x / 2,
      y: self.y / 2,
    })
  }

  /// Ancestor at a coarser (or equal) level.
  pub fn ancestor(&self, level: u8) -> Option<Self> {
    if level > self.level {
      return None;
    }
    let shift = self.level - level;
    Some(Self {
      level,
      x: self.x >> shift,
      y: self.y >> shift,
    })
  }

  /// True if `other` is this node or lies inside it.
  pub fn contains(&self, other: &QuadNode) -> bool {
    other.ancestor(self.level) == Some(*self)
  }

  /// Same-level node offset by `(dx, dy)`, or None past the domain edge.
  pub fn neighbor(&self, dx: i32, dy: i32) -> Option<Self> {
    let size = self.grid_size() as i64;
    let nx = self.x as i64 + dx as i64;
    let ny = self.y as i64 + dy as i64;
    if nx < 0 || ny < 0 || nx >= size || ny >= size {
      return None;
    }
    Some(Self {
      level: self.level,
      x: nx as u32,
      y: ny as u32,
    })
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
