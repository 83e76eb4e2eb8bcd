//! Error types.
//!
//! The streaming core has no I/O, so the taxonomy is small: configuration
//! errors are fatal at construction, arena errors come from the GPU
//! collaborator, and a lost job means a worker died without reporting.

use thiserror::Error;

use crate::gpu::BufferHandle;

/// Rejected streaming or quadtree configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("chunk_dim must be at least 1")]
  ZeroChunkDim,

  #[error("vertical_cells must be at least 1")]
  ZeroVerticalCells,

  #[error("expected {expected} LOD thresholds (one per level below max_lod), got {actual}")]
  ThresholdCount { expected: usize, actual: usize },

  #[error("LOD threshold for level {level} must be finite and positive, got {value}")]
  InvalidThreshold { level: usize, value: f64 },

  #[error("LOD threshold for level {level} is larger than the threshold of its parent level")]
  ThresholdsNotMonotonic { level: usize },

  #[error("quadtree extent must be finite and positive, got {0}")]
  InvalidExtent(f64),

  #[error("cell size must be finite and positive, got {0}")]
  InvalidCellSize(f64),

  #[error("height range must be finite with min < max, got {min}..{max}")]
  InvalidHeightRange { min: f64, max: f64 },

  #[error("max_lod {max_lod} exceeds the supported limit of {limit}")]
  MaxLodTooLarge { max_lod: u8, limit: u8 },

  #[error("terrain was built with a different chunk grid than the streaming config")]
  TerrainMismatch,
}

/// Failure reported by a [`VertexArena`](crate::gpu::VertexArena).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
  #[error("arena exhausted: requested {requested} bytes, {available} available")]
  OutOfMemory { requested: u64, available: u64 },

  #[error("unknown buffer handle {0:?}")]
  UnknownHandle(BufferHandle),

  #[error("upload of {actual} bytes does not match allocation of {expected} bytes")]
  SizeMismatch { expected: u64, actual: u64 },
}

/// Runtime failure of the streaming pipeline.
#[derive(Debug, Error)]
pub enum StreamError {
  #[error(transparent)]
  Arena(#[from] ArenaError),

  #[error("extraction job ended without producing a result")]
  JobLost,
}

pub type Result<T, E = StreamError> = std::result::Result<T, E>;
