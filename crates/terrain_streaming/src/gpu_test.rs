use super::*;
use crate::test_utils::{host_arena, RecordingTarget};

fn vertices(n: usize) -> Vec<Vertex> {
  (0..n)
    .map(|i| Vertex {
      position: [i as f32, 0.5, 1.0],
      normal: [0.0, 1.0, 0.0],
    })
    .collect()
}

#[test]
fn test_upload_round_trips_vertex_data() {
  let (host, dyn_arena) = host_arena(1 << 16);

  let data = vertices(6);
  let buffer = VertexBuffer::upload(&dyn_arena, &data).expect("fits");

  assert_eq!(buffer.vertex_count(), 6);
  let handle = buffer.handle().expect("non-empty buffer has a region");
  let bytes = host.read(handle).expect("live region");
  let stored: Vec<Vertex> = bytes
    .chunks_exact(std::mem::size_of::<Vertex>())
    .map(bytemuck::pod_read_unaligned)
    .collect();
  assert_eq!(stored, data);
  assert_eq!(host.stats().live_allocations, 1);
  assert_eq!(host.stats().live_bytes, 6 * 24);
}

#[test]
fn test_drop_releases_region() {
  let (host, dyn_arena) = host_arena(1 << 16);

  let a = VertexBuffer::upload(&dyn_arena, &vertices(3)).expect("fits");
  let b = VertexBuffer::upload(&dyn_arena, &vertices(3)).expect("fits");
  assert_eq!(host.stats().cursor, 2 * 3 * 24);

  drop(a);
  // Bump arena: the cursor stays put while anything is live.
  assert_eq!(host.stats().live_allocations, 1);
  assert_eq!(host.stats().cursor, 2 * 3 * 24);

  drop(b);
  assert_eq!(host.stats().live_allocations, 0);
  assert_eq!(host.stats().live_bytes, 0);
  assert_eq!(host.stats().cursor, 0);
  assert_eq!(host.stats().total_allocations, 2);
}

/// One long-lived region pins the cursor, so churn around it runs the arena
/// dry even though live bytes stay small.
#[test]
fn test_pinned_region_exhausts_arena_under_churn() {
  let (host, dyn_arena) = host_arena(10 * 24);
  let pinned = VertexBuffer::upload(&dyn_arena, &vertices(1)).expect("fits");

  for _ in 0..9 {
    let churn = VertexBuffer::upload(&dyn_arena, &vertices(1)).expect("fits");
    drop(churn);
  }
  assert_eq!(host.stats().live_bytes, 24);
  assert_eq!(host.stats().cursor, 10 * 24);

  let err = VertexBuffer::upload(&dyn_arena, &vertices(1)).expect_err("cursor at capacity");
  assert_eq!(
    err,
    ArenaError::OutOfMemory {
      requested: 24,
      available: 0
    }
  );

  drop(pinned);
  assert_eq!(host.stats().cursor, 0);
  assert!(VertexBuffer::upload(&dyn_arena, &vertices(1)).is_ok());
}

#[test]
fn test_empty_upload_allocates_nothing() {
  let (host, dyn_arena) = host_arena(1024);

  let buffer = VertexBuffer::upload(&dyn_arena, &[]).expect("empty upload");

  assert!(buffer.is_empty());
  assert_eq!(buffer.handle(), None);
  assert_eq!(host.stats().total_allocations, 0);
}

#[test]
fn test_out_of_memory() {
  let (host, dyn_arena) = host_arena(100);

  let err = VertexBuffer::upload(&dyn_arena, &vertices(5)).expect_err("120 bytes > 100");

  assert_eq!(
    err,
    ArenaError::OutOfMemory {
      requested: 120,
      available: 100
    }
  );
  assert_eq!(host.stats().live_allocations, 0);
}

#[test]
fn test_upload_checks_handle_and_size() {
  let host = HostArena::new(1024);
  let handle = host.allocate(48).expect("fits");

  assert_eq!(
    host.upload(handle, &[0u8; 24]),
    Err(ArenaError::SizeMismatch {
      expected: 48,
      actual: 24
    })
  );

  let unknown = BufferHandle::new(handle.raw() + 100);
  assert_eq!(
    host.upload(unknown, &[0u8; 24]),
    Err(ArenaError::UnknownHandle(unknown))
  );
}

#[test]
fn test_record_skips_empty_buffers() {
  let (_, dyn_arena) = host_arena(1 << 16);
  let full = VertexBuffer::upload(&dyn_arena, &vertices(9)).expect("fits");
  let empty = VertexBuffer::empty();

  let mut recorder = RecordingTarget::default();
  full.record(&mut recorder);
  empty.record(&mut recorder);

  assert_eq!(recorder.binds(), vec![full.handle().expect("allocated")]);
  assert_eq!(recorder.draws(), vec![9]);
}
