//! Extraction job: re-mesh every active chunk off the main thread.
//!
//! # Flow
//!
//! ```text
//! Main Thread                       Async (rayon)
//! ┌──────────────────┐
//! │ Capture JobInput │
//! │ (descriptors,    │
//! │  terrain, arena, │
//! │  last snapshot)  │
//! └───────┬──────────┘
//!         │ spawn()
//!         ▼
//!                                  ┌───────────────┐
//!                                  │ par_iter:     │
//!                                  │ reuse or      │
//!                                  │ extract +     │
//!                                  │ upload        │
//!                                  └───────┬───────┘
//!                                          │
//! ┌──────────────────┐                     │
//! │ try_take()       │◄────────────────────┘
//! │ - StagedGroups   │
//! └──────────────────┘
//! ```
//!
//! The input is an owned value: the main thread keeps mutating its quadtree
//! while the job runs without either side seeing the other.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use web_time::Instant;

use crate::error::Result;
use crate::extract::{extract, ChunkDescriptor};
use crate::field::VolumetricField;
use crate::gpu::{VertexArena, VertexBuffer};
use crate::snapshot::{ChunkGroup, Snapshot, StagedGroups};
use crate::terrain::Terrain;

/// Everything one job run reads. Captured by value at submission.
pub struct JobInput<F: VolumetricField> {
  /// Identifies the run; stamped on the groups it extracts.
  pub generation: u64,
  /// One descriptor per active node, in draw order.
  pub descriptors: Vec<ChunkDescriptor>,
  pub terrain: Arc<Terrain<F>>,
  pub arena: Arc<dyn VertexArena>,
  /// Last published snapshot, source of reusable groups.
  pub previous: Arc<Snapshot>,
  /// Extract everything, ignoring `previous`.
  pub full_rebuild: bool,
}

/// Stateless job body.
pub struct ExtractionJob;

impl ExtractionJob {
  /// Run on the calling thread; per-chunk work fans out over rayon.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "job::run"))]
  pub fn run<F: VolumetricField>(input: JobInput<F>) -> Result<StagedGroups> {
    let JobInput {
      generation,
      descriptors,
      terrain,
      arena,
      previous,
      full_rebuild,
    } = input;

    log::debug!(
      "extraction job {generation}: {} nodes{}",
      descriptors.len(),
      if full_rebuild { " (full rebuild)" } else { "" }
    );
    let start = Instant::now();

    let reusable: HashMap<ChunkDescriptor, &Arc<ChunkGroup>> = if full_rebuild {
      HashMap::new()
    } else {
      previous
        .groups()
        .iter()
        .map(|g| (ChunkDescriptor::new(g.neighborhood), g))
        .collect()
    };

    let results: Result<Vec<(Arc<ChunkGroup>, bool)>> = descriptors
      .par_iter()
      .map(|descriptor| match reusable.get(descriptor) {
        Some(group) => Ok((Arc::clone(group), true)),
        None => build_group(descriptor, &terrain, &arena, generation).map(|g| (Arc::new(g), false)),
      })
      .collect();

    let results = match results {
      Ok(results) => results,
      Err(err) => {
        log::error!("extraction job {generation} failed: {err}");
        return Err(err);
      }
    };

    let reused = results.iter().filter(|(_, reused)| *reused).count();
    let groups: Vec<_> = results.into_iter().map(|(group, _)| group).collect();
    let duration_us = start.elapsed().as_micros() as u64;

    log::debug!(
      "extraction job {generation} done in {duration_us} us: {} extracted, {reused} reused",
      groups.len() - reused
    );

    Ok(StagedGroups {
      generation,
      extracted: groups.len() - reused,
      reused,
      groups,
      duration_us,
    })
  }
}

/// Extract one chunk and upload both meshes.
fn build_group<F: VolumetricField>(
  descriptor: &ChunkDescriptor,
  terrain: &Terrain<F>,
  arena: &Arc<dyn VertexArena>,
  generation: u64,
) -> Result<ChunkGroup> {
  let node = descriptor.node;
  let mesh = extract(descriptor, terrain);

  Ok(ChunkGroup {
    node,
    neighborhood: descriptor.neighborhood,
    world_origin: terrain.chunk_coord_to_world(&node),
    scale: terrain.cell_stride(node.level) as f64,
    transform: terrain.chunk_transform(&node),
    primary: VertexBuffer::upload(arena, &mesh.primary)?,
    transition: VertexBuffer::upload(arena, &mesh.transition)?,
    generation,
  })
}

#[cfg(test)]
#[path = "job_test.rs"]
mod job_test;
