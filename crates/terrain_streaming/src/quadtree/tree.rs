//! QuadTree - arena-backed LOD selector driven by a focal point.
//!
//! Nodes live in a flat arena and reference their children by index. Each
//! `set_focal_point` pass walks the tree top-down, subdivides nodes the focal
//! point is close to and prunes the subtrees it no longer needs; the pruned
//! slots go back to a free list.

use glam::DVec2;

use super::{ActiveSet, DRect, Diff, QuadNode, QuadTreeConfig};
use crate::error::ConfigError;

/// Index of a slot in the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
  #[inline]
  fn index(self) -> usize {
    self.0 as usize
  }
}

#[derive(Clone, Debug)]
struct Slot {
  node: QuadNode,
  children: Option<[NodeId; 4]>,
  is_active: bool,
}

/// Quadtree over the terrain's horizontal extent.
#[derive(Debug)]
pub struct QuadTree {
  config: QuadTreeConfig,
  slots: Vec<Slot>,
  free: Vec<NodeId>,
  root: NodeId,
  active: ActiveSet,
  focal_point: Option<DVec2>,
}

impl QuadTree {
  /// Build a tree holding only the root, which starts out active.
  pub fn new(config: QuadTreeConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let root = Slot {
      node: QuadNode::ROOT,
      children: None,
      is_active: true,
    };
    Ok(Self {
      config,
      slots: vec![root],
      free: Vec::new(),
      root: NodeId(0),
      active: std::iter::once(QuadNode::ROOT).collect(),
      focal_point: None,
    })
  }

  pub fn config(&self) -> &QuadTreeConfig {
    &self.config
  }

  pub fn max_lod(&self) -> u8 {
    self.config.max_lod
  }

  /// Current active (deepest) nodes.
  pub fn active(&self) -> &ActiveSet {
    &self.active
  }

  /// Focal point of the last evaluation, after clamping.
  pub fn focal_point(&self) -> Option<DVec2> {
    self.focal_point
  }

  /// Footprint of a node in terrain space.
  pub fn node_bounds(&self, node: &QuadNode) -> DRect {
    self.config.node_bounds(node)
  }

  /// Number of arena slots currently holding a node.
  pub fn live_node_count(&self) -> usize {
    self.slots.len() - self.free.len()
  }

  /// Recompute the active set for `point` and return what changed.
  ///
  /// Points outside the domain are clamped to its boundary. The result only
  /// depends on the clamped point, so calling this twice with the same point
  /// yields an empty diff the second time.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "quadtree::set_focal_point"))]
  pub fn set_focal_point(&mut self, point: DVec2) -> Diff {
    let focal = self.config.domain().clamp_point(point);
    self.focal_point = Some(focal);

    let mut next = ActiveSet::with_capacity(self.active.len());
    self.refine(self.root, focal, &mut next);

    let diff = Diff::between(&self.active, &next);
    self.active = next;
    diff
  }

  /// Active nodes in depth-first quadrant order.
  pub fn active_nodes(&self) -> Vec<QuadNode> {
    let mut out = Vec::with_capacity(self.active.len());
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      let slot = &self.slots[id.index()];
      match slot.children {
        Some(children) => stack.extend(children.iter().rev()),
        None => {
          debug_assert!(slot.is_active, "leaf slot must be active");
          out.push(slot.node);
        }
      }
    }
    out
  }

  fn refine(&mut self, id: NodeId, focal: DVec2, next: &mut ActiveSet) {
    let (node, children) = {
      let slot = &self.slots[id.index()];
      (slot.node, slot.children)
    };

    let subdivide = node.level < self.config.max_lod
      && self.config.node_bounds(&node).distance_to_point(focal) < self.config.threshold(node.level);

    if subdivide {
      let children = match children {
        Some(children) => children,
        None => self.allocate_children(node),
      };
      let slot = &mut self.slots[id.index()];
      slot.children = Some(children);
      slot.is_active = false;
      for child in children {
        self.refine(child, focal, next);
      }
    } else {
      let slot = &mut self.slots[id.index()];
      slot.children = None;
      slot.is_active = true;
      if let Some(children) = children {
        for child in children {
          self.release(child);
        }
      }
      next.insert(node);
    }
  }

  fn allocate_children(&mut self, parent: QuadNode) -> [NodeId; 4] {
    parent.children().map(|node| self.allocate(node))
  }

  fn allocate(&mut self, node: QuadNode) -> NodeId {
    let slot = Slot {
      node,
      children: None,
      is_active: false,
    };
    match self.free.pop() {
      Some(id) => {
        self.slots[id.index()] = slot;
        id
      }
      None => {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(slot);
        id
      }
    }
  }

  /// Return a subtree's slots to the free list.
  fn release(&mut self, id: NodeId) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
      let slot = &mut self.slots[id.index()];
      if let Some(children) = slot.children.take() {
        stack.extend(children);
      }
      slot.is_active = false;
      self.free.push(id);
    }
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
