//! ActiveSet - the set of currently deepest (drawn) quadtree nodes.
//!
//! The active nodes tile the domain, so the set alone answers "which leaf
//! covers this region" without touching the tree arena.

use std::collections::HashSet;

use super::QuadNode;

/// Active leaves, keyed by node identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveSet {
  nodes: HashSet<QuadNode>,
}

impl ActiveSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      nodes: HashSet::with_capacity(capacity),
    }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn contains(&self, node: &QuadNode) -> bool {
    self.nodes.contains(node)
  }

  pub fn insert(&mut self, node: QuadNode) -> bool {
    self.nodes.insert(node)
  }

  pub fn remove(&mut self, node: &QuadNode) -> bool {
    self.nodes.remove(node)
  }

  /// Iterate in arbitrary order.
  pub fn iter(&self) -> impl Iterator<Item = &QuadNode> {
    self.nodes.iter()
  }

  /// Members sorted by (level, x, y).
  pub fn sorted(&self) -> Vec<QuadNode> {
    let mut nodes: Vec<_> = self.nodes.iter().copied().collect();
    nodes.sort_unstable();
    nodes
  }

  /// Level of the active leaf that covers `region`, if that leaf is `region`
  /// itself or one of its ancestors. `None` means the region is subdivided
  /// deeper than its own level.
  pub fn covering_level(&self, region: &QuadNode) -> Option<u8> {
    (0..=region.level)
      .rev()
      .find(|&level| region.ancestor(level).is_some_and(|a| self.nodes.contains(&a)))
  }
}

impl FromIterator<QuadNode> for ActiveSet {
  fn from_iter<I: IntoIterator<Item = QuadNode>>(iter: I) -> Self {
    Self {
      nodes: iter.into_iter().collect(),
    }
  }
}
