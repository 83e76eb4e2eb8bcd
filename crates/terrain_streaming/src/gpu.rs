//! Boundary to the graphics layer.
//!
//! The streaming core never talks to a GPU API. Worker threads allocate and
//! fill vertex buffers through a [`VertexArena`]; the render thread replays a
//! published snapshot into a [`DrawTarget`]. [`HostArena`] implements the
//! arena in host memory for headless use and tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use glam::DAffine3;

use crate::error::ArenaError;
use crate::types::Vertex;

/// Opaque handle to an arena region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
  pub fn new(raw: u32) -> Self {
    Self(raw)
  }

  pub fn raw(&self) -> u32 {
    self.0
  }
}

/// Thread-safe vertex memory allocator.
///
/// `allocate` and `upload` are called from extraction workers while the
/// render thread may be binding older regions. `release` is called from
/// whichever thread drops the last reference to a buffer; implementations
/// that need the GPU to be idle before reuse must defer it themselves.
pub trait VertexArena: Send + Sync {
  fn allocate(&self, bytes: u64) -> Result<BufferHandle, ArenaError>;
  fn upload(&self, handle: BufferHandle, data: &[u8]) -> Result<(), ArenaError>;
  fn release(&self, handle: BufferHandle);
}

/// Render-thread command sink.
pub trait DrawTarget {
  /// Chunk-local unit cube to world, for the draws that follow.
  fn set_transform(&mut self, transform: &DAffine3);
  fn bind(&mut self, handle: BufferHandle);
  fn draw(&mut self, vertex_count: u32);
}

// =============================================================================
// VertexBuffer - owned arena region
// =============================================================================

/// Vertex data living in an arena. Releases its region on drop.
pub struct VertexBuffer {
  region: Option<(Arc<dyn VertexArena>, BufferHandle)>,
  vertex_count: u32,
}

impl VertexBuffer {
  /// A buffer with no backing region.
  pub fn empty() -> Self {
    Self {
      region: None,
      vertex_count: 0,
    }
  }

  /// Allocate a region and copy `vertices` into it.
  ///
  /// An empty slice allocates nothing.
  pub fn upload(arena: &Arc<dyn VertexArena>, vertices: &[Vertex]) -> Result<Self, ArenaError> {
    if vertices.is_empty() {
      return Ok(Self::empty());
    }

    let bytes: &[u8] = bytemuck::cast_slice(vertices);
    let handle = arena.allocate(bytes.len() as u64)?;
    if let Err(err) = arena.upload(handle, bytes) {
      arena.release(handle);
      return Err(err);
    }

    Ok(Self {
      region: Some((Arc::clone(arena), handle)),
      vertex_count: vertices.len() as u32,
    })
  }

  pub fn handle(&self) -> Option<BufferHandle> {
    self.region.as_ref().map(|(_, handle)| *handle)
  }

  pub fn vertex_count(&self) -> u32 {
    self.vertex_count
  }

  pub fn is_empty(&self) -> bool {
    self.vertex_count == 0
  }

  /// Bind and draw, if there is anything to draw.
  pub fn record(&self, target: &mut impl DrawTarget) {
    if let Some(handle) = self.handle() {
      target.bind(handle);
      target.draw(self.vertex_count);
    }
  }
}

impl Drop for VertexBuffer {
  fn drop(&mut self) {
    if let Some((arena, handle)) = self.region.take() {
      arena.release(handle);
    }
  }
}

impl fmt::Debug for VertexBuffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VertexBuffer")
      .field("handle", &self.handle())
      .field("vertex_count", &self.vertex_count)
      .finish()
  }
}

// =============================================================================
// HostArena - bump arena in host memory
// =============================================================================

/// Allocation counters of a [`HostArena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
  pub live_allocations: usize,
  pub live_bytes: u64,
  /// Bump pointer; only rewinds when every region has been released.
  pub cursor: u64,
  pub total_allocations: u64,
}

#[derive(Clone, Copy, Debug)]
struct Region {
  offset: u64,
  size: u64,
}

#[derive(Default)]
struct HostArenaInner {
  next_handle: u32,
  memory: Vec<u8>,
  regions: HashMap<BufferHandle, Region>,
  stats: ArenaStats,
}

/// Bump allocator over a growable byte buffer.
///
/// Regions are never reused individually; the cursor rewinds to zero once
/// the last live region is released.
///
/// A streamer keeps reused groups alive from one snapshot to the next, so
/// under continuous streaming the live set rarely empties and the cursor
/// only grows. Every job then fails with [`ArenaError::OutOfMemory`] once
/// `capacity` bytes have been handed out in total. Size it for the whole
/// session, or use it for tests and bounded headless runs only.
pub struct HostArena {
  capacity: u64,
  inner: Mutex<HostArenaInner>,
}

impl HostArena {
  pub fn new(capacity: u64) -> Self {
    Self {
      capacity,
      inner: Mutex::new(HostArenaInner::default()),
    }
  }

  pub fn capacity(&self) -> u64 {
    self.capacity
  }

  pub fn stats(&self) -> ArenaStats {
    self.lock().stats
  }

  /// Copy of a live region's bytes.
  pub fn read(&self, handle: BufferHandle) -> Option<Vec<u8>> {
    let inner = self.lock();
    let region = inner.regions.get(&handle)?;
    let start = region.offset as usize;
    Some(inner.memory[start..start + region.size as usize].to_vec())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HostArenaInner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl VertexArena for HostArena {
  fn allocate(&self, bytes: u64) -> Result<BufferHandle, ArenaError> {
    let mut inner = self.lock();
    let available = self.capacity - inner.stats.cursor;
    if bytes > available {
      log::error!("host arena exhausted: requested {bytes} bytes, {available} available");
      return Err(ArenaError::OutOfMemory {
        requested: bytes,
        available,
      });
    }

    let handle = BufferHandle(inner.next_handle);
    inner.next_handle = inner.next_handle.wrapping_add(1);

    let offset = inner.stats.cursor;
    inner.stats.cursor += bytes;
    let end = inner.stats.cursor as usize;
    if inner.memory.len() < end {
      inner.memory.resize(end, 0);
    }

    inner.regions.insert(handle, Region { offset, size: bytes });
    inner.stats.live_allocations += 1;
    inner.stats.live_bytes += bytes;
    inner.stats.total_allocations += 1;
    Ok(handle)
  }

  fn upload(&self, handle: BufferHandle, data: &[u8]) -> Result<(), ArenaError> {
    let mut inner = self.lock();
    let region = *inner
      .regions
      .get(&handle)
      .ok_or(ArenaError::UnknownHandle(handle))?;
    if region.size != data.len() as u64 {
      return Err(ArenaError::SizeMismatch {
        expected: region.size,
        actual: data.len() as u64,
      });
    }

    let start = region.offset as usize;
    inner.memory[start..start + data.len()].copy_from_slice(data);
    Ok(())
  }

  fn release(&self, handle: BufferHandle) {
    let mut inner = self.lock();
    let Some(region) = inner.regions.remove(&handle) else {
      log::warn!("release of unknown buffer handle {handle:?}");
      return;
    };

    inner.stats.live_allocations -= 1;
    inner.stats.live_bytes -= region.size;
    if inner.regions.is_empty() {
      inner.stats.cursor = 0;
    }
  }
}

#[cfg(test)]
#[path = "gpu_test.rs"]
mod gpu_test;
