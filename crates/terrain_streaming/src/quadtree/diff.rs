//! Diff - nodes that became active and stopped being active between two
//! consecutive focal-point evaluations.

use super::{ActiveSet, QuadNode};

/// Change of the active set. Both lists are sorted by (level, x, y).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
  pub added: Vec<QuadNode>,
  pub removed: Vec<QuadNode>,
}

impl Diff {
  /// Set difference of two active sets. O(|before| + |after|).
  pub fn between(before: &ActiveSet, after: &ActiveSet) -> Self {
    let mut added: Vec<_> = after.iter().filter(|n| !before.contains(n)).copied().collect();
    let mut removed: Vec<_> = before.iter().filter(|n| !after.contains(n)).copied().collect();
    added.sort_unstable();
    removed.sort_unstable();
    Self { added, removed }
  }

  /// Treat every node of `active` as newly added.
  pub fn everything_added(active: &ActiveSet) -> Self {
    Self {
      added: active.sorted(),
      removed: Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.removed.is_empty()
  }

  /// Total number of changed nodes.
  pub fn len(&self) -> usize {
    self.added.len() + self.removed.len()
  }

  /// Apply to a copy of the previous active set.
  pub fn apply(&self, set: &mut ActiveSet) {
    for node in &self.removed {
      set.remove(node);
    }
    for node in &self.added {
      set.insert(*node);
    }
  }
}
