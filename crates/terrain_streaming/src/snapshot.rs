//! Snapshot hand-off from the extraction job to the render thread.
//!
//! # Flow
//!
//! ```text
//! Worker (rayon)                     Main thread              Render thread
//! ┌──────────────┐
//! │ StagedGroups │  (write-only, invisible)
//! └──────┬───────┘
//!        │ JobHandle
//!        ▼
//!                                  ┌──────────────┐
//!                                  │ publish()    │──swap──► current()
//!                                  └──────────────┘          (Arc held for
//!                                                             the frame)
//! ```
//!
//! Publishing swaps one `Arc<Snapshot>` under a mutex. A reader clones the
//! `Arc` and keeps it for the whole frame, so it sees either the old or the
//! new snapshot in full. Buffers of the old snapshot are released when its
//! last reader lets go, except for groups the new snapshot reuses.

use std::sync::{Arc, Mutex, PoisonError};

use glam::{DAffine3, DVec3};

use crate::gpu::{DrawTarget, VertexBuffer};
use crate::quadtree::{Neighborhood, QuadNode};

/// Mesh package for one active node.
#[derive(Debug)]
pub struct ChunkGroup {
  pub node: QuadNode,
  /// Neighbour levels the meshes were extracted against.
  pub neighborhood: Neighborhood,
  /// World position of the chunk's minimum corner.
  pub world_origin: DVec3,
  /// LOD scale: finest cells per cell of this chunk, `2^(max_lod - level)`.
  pub scale: f64,
  /// Chunk-local unit cube to world.
  pub transform: DAffine3,
  pub primary: VertexBuffer,
  pub transition: VertexBuffer,
  /// Job run that extracted this group.
  pub generation: u64,
}

impl ChunkGroup {
  pub fn level(&self) -> u8 {
    self.node.level
  }

  pub fn vertex_count(&self) -> u64 {
    self.primary.vertex_count() as u64 + self.transition.vertex_count() as u64
  }

  /// Issue draws for both buffers.
  pub fn record(&self, target: &mut impl DrawTarget) {
    if self.primary.is_empty() && self.transition.is_empty() {
      return;
    }
    target.set_transform(&self.transform);
    self.primary.record(target);
    self.transition.record(target);
  }
}

/// Groups produced by one job run, not yet visible to the render thread.
#[derive(Debug, Default)]
pub struct StagedGroups {
  pub generation: u64,
  pub groups: Vec<Arc<ChunkGroup>>,
  /// Groups extracted by this run.
  pub extracted: usize,
  /// Groups carried over from the previous snapshot.
  pub reused: usize,
  pub duration_us: u64,
}

/// Immutable, ordered set of chunk groups: the terrain as it should be drawn.
#[derive(Debug, Default)]
pub struct Snapshot {
  generation: u64,
  groups: Vec<Arc<ChunkGroup>>,
}

impl Snapshot {
  /// The empty snapshot live before the first publish.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Job run that produced this snapshot; 0 for the initial empty one.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn groups(&self) -> &[Arc<ChunkGroup>] {
    &self.groups
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &ChunkGroup> {
    self.groups.iter().map(|g| g.as_ref())
  }

  /// Primary and transition vertex totals.
  pub fn vertex_totals(&self) -> (u64, u64) {
    self.iter().fold((0, 0), |(p, t), g| {
      (
        p + g.primary.vertex_count() as u64,
        t + g.transition.vertex_count() as u64,
      )
    })
  }

  /// Replay every non-empty buffer into `target`.
  pub fn record_draws(&self, target: &mut impl DrawTarget) {
    for group in self.iter() {
      group.record(target);
    }
  }
}

/// Holder of the live snapshot. Shared between main and render thread.
#[derive(Debug)]
pub struct SnapshotBroker {
  current: Mutex<Arc<Snapshot>>,
}

impl Default for SnapshotBroker {
  fn default() -> Self {
    Self::new()
  }
}

impl SnapshotBroker {
  pub fn new() -> Self {
    Self {
      current: Mutex::new(Arc::new(Snapshot::empty())),
    }
  }

  /// The live snapshot. Hold on to it for the duration of one frame.
  pub fn current(&self) -> Arc<Snapshot> {
    Arc::clone(&self.current.lock().unwrap_or_else(PoisonError::into_inner))
  }

  /// Atomically replace the live snapshot with `staged`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "snapshot::publish"))]
  pub fn publish(&self, staged: StagedGroups) -> Arc<Snapshot> {
    let next = Arc::new(Snapshot {
      generation: staged.generation,
      groups: staged.groups,
    });

    let previous = {
      let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
      debug_assert!(
        next.generation > current.generation,
        "publishing generation {} over {}",
        next.generation,
        current.generation
      );
      std::mem::replace(&mut *current, Arc::clone(&next))
    };
    log::debug!(
      "published snapshot {} ({} groups), replacing {}",
      next.generation,
      next.len(),
      previous.generation
    );
    // Buffers only referenced by `previous` are released here, outside the
    // lock, or later by the last render-thread reader.
    drop(previous);

    next
  }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
