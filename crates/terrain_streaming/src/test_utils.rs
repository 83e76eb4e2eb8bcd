//! Test fixtures shared across modules.
//!
//! Provides small terrains, a field that can hold workers back, and a draw
//! target that records what the render thread would submit.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use glam::{DAffine3, DVec3};

use crate::config::StreamingConfig;
use crate::field::VolumetricField;
use crate::fields::TiltedPlaneField;
use crate::gpu::{BufferHandle, DrawTarget, HostArena, VertexArena};
use crate::quadtree::{ActiveSet, QuadNode};
use crate::terrain::Terrain;

// =============================================================================
// Terrains
// =============================================================================

/// 4 cells per chunk edge, 8 vertical cells over -8..8, `max_lod` 2: the
/// domain is 16 world units wide.
pub fn small_config() -> StreamingConfig {
  StreamingConfig::default()
    .with_chunk_dim(4)
    .with_vertical_cells(8)
    .with_cell_size(1.0)
    .with_height_range(-8.0, 8.0)
    .with_max_lod(2)
}

pub fn tilted_plane() -> TiltedPlaneField {
  TiltedPlaneField::new().with_height(0.37)
}

pub fn plane_terrain() -> Arc<Terrain<TiltedPlaneField>> {
  Arc::new(Terrain::new(&small_config(), tilted_plane()).expect("valid config"))
}

/// Root split, then its (0, 0) child split: three level-1 leaves and four
/// level-2 leaves.
pub fn mixed_layout() -> ActiveSet {
  let mut nodes = vec![
    QuadNode::new(1, 0, 1),
    QuadNode::new(0, 1, 1),
    QuadNode::new(1, 1, 1),
  ];
  nodes.extend(QuadNode::new(0, 0, 1).children());
  nodes.into_iter().collect()
}

/// Every node of `level`.
pub fn uniform_layout(level: u8) -> ActiveSet {
  let size = 1u32 << level;
  (0..size)
    .flat_map(|y| (0..size).map(move |x| QuadNode::new(x, y, level)))
    .collect()
}

pub fn host_arena(capacity: u64) -> (Arc<HostArena>, Arc<dyn VertexArena>) {
  let host = Arc::new(HostArena::new(capacity));
  let arena: Arc<dyn VertexArena> = host.clone();
  (host, arena)
}

// =============================================================================
// GatedField - blocks samplers until opened
// =============================================================================

/// Shared open/closed switch.
#[derive(Default)]
pub struct Gate {
  open: Mutex<bool>,
  changed: Condvar,
}

impl Gate {
  pub fn closed() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn open(&self) {
    *self.open.lock().unwrap_or_else(PoisonError::into_inner) = true;
    self.changed.notify_all();
  }

  fn wait(&self) {
    let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
    while !*open {
      open = self.changed.wait(open).unwrap_or_else(PoisonError::into_inner);
    }
  }
}

/// Wraps a field; every sample waits for the gate to be open.
pub struct GatedField<F> {
  pub inner: F,
  pub gate: Arc<Gate>,
}

impl<F: VolumetricField> GatedField<F> {
  pub fn new(inner: F, gate: Arc<Gate>) -> Self {
    Self { inner, gate }
  }
}

impl<F: VolumetricField> VolumetricField for GatedField<F> {
  fn sample_density(&self, world_pos: DVec3) -> f32 {
    self.gate.wait();
    self.inner.sample_density(world_pos)
  }
}

// =============================================================================
// RecordingTarget
// =============================================================================

/// Draw call as seen by the render thread.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
  Transform(DAffine3),
  Bind(BufferHandle),
  Draw(u32),
}

#[derive(Default)]
pub struct RecordingTarget {
  pub commands: Vec<DrawCommand>,
}

impl RecordingTarget {
  pub fn draws(&self) -> Vec<u32> {
    self
      .commands
      .iter()
      .filter_map(|c| match c {
        DrawCommand::Draw(count) => Some(*count),
        _ => None,
      })
      .collect()
  }

  pub fn binds(&self) -> Vec<BufferHandle> {
    self
      .commands
      .iter()
      .filter_map(|c| match c {
        DrawCommand::Bind(handle) => Some(*handle),
        _ => None,
      })
      .collect()
  }

  pub fn transforms(&self) -> Vec<DAffine3> {
    self
      .commands
      .iter()
      .filter_map(|c| match c {
        DrawCommand::Transform(transform) => Some(*transform),
        _ => None,
      })
      .collect()
  }
}

impl DrawTarget for RecordingTarget {
  fn set_transform(&mut self, transform: &DAffine3) {
    self.commands.push(DrawCommand::Transform(*transform));
  }

  fn bind(&mut self, handle: BufferHandle) {
    self.commands.push(DrawCommand::Bind(handle));
  }

  fn draw(&mut self, vertex_count: u32) {
    self.commands.push(DrawCommand::Draw(vertex_count));
  }
}
