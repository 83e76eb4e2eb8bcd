//! Isosurface extraction for one chunk.
//!
//! Surface nets over a regular grid: a dual vertex per sign-changing cell,
//! one polygon per sign-changing edge. Chunk boundaries are handled by
//! letting the polygon of a boundary edge reach into the neighbouring
//! chunks' cells, sampled on those chunks' own lattice, so both sides of a
//! seam agree on every shared vertex without any post-processing.
//!
//! `extract` is a pure function of its inputs; it is called concurrently for
//! distinct chunks from the extraction job.

mod cell;
mod contour;
mod grid;

use crate::field::VolumetricField;
use crate::quadtree::{ActiveSet, Neighborhood, QuadNode};
use crate::terrain::Terrain;
use crate::types::ChunkMesh;

/// What the extractor needs to know about one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDescriptor {
  pub node: QuadNode,
  pub neighborhood: Neighborhood,
}

impl ChunkDescriptor {
  pub fn new(neighborhood: Neighborhood) -> Self {
    Self {
      node: neighborhood.node(),
      neighborhood,
    }
  }

  /// Descriptor of `node` within the given active set.
  pub fn from_active(node: QuadNode, active: &ActiveSet) -> Self {
    Self::new(Neighborhood::of(node, active))
  }
}

/// Extract the primary and transition triangles of one chunk.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "extract_chunk"))]
pub fn extract<F: VolumetricField>(chunk: &ChunkDescriptor, terrain: &Terrain<F>) -> ChunkMesh {
  debug_assert!(
    chunk.node.level <= terrain.max_lod(),
    "chunk {:?} deeper than max_lod {}",
    chunk.node,
    terrain.max_lod()
  );
  contour::Contour::new(chunk, terrain).run()
}
