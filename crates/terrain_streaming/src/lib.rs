//! terrain_streaming - Engine independent LOD terrain streaming
//!
//! Decides every frame which terrain chunks must be drawn at which level of
//! detail, re-meshes them off the render thread, and hands the result to the
//! renderer as an immutable snapshot without stalling it.
//!
//! # Features
//!
//! - **Quadtree LOD**: deterministic refinement around a focal point with
//!   incremental add/remove diffs
//! - **Seam-correct extraction**: surface nets per chunk plus transition
//!   geometry towards coarser neighbours, crack-free by construction
//! - **Background jobs**: at most one extraction job in flight, fanned out
//!   over rayon, with reuse of unchanged chunks
//! - **Snapshot hand-off**: atomic publish of immutable chunk groups to the
//!   render thread
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use terrain_streaming::{HostArena, StreamingConfig, Terrain, TerrainStreamer, VertexArena};
//! use terrain_streaming::fields::SineHillsField;
//!
//! let config = StreamingConfig::default();
//! let terrain = Arc::new(Terrain::new(&config, SineHillsField::default())?);
//! let arena: Arc<dyn VertexArena> = Arc::new(HostArena::new(256 << 20));
//! let mut streamer = TerrainStreamer::new(config, terrain, arena)?;
//!
//! // Main thread, every frame
//! streamer.tick(camera_position)?;
//!
//! // Render thread, every frame
//! let snapshot = broker.current();
//! snapshot.record_draws(&mut my_draw_target);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{LodThresholds, StreamingConfig};
pub use error::{ArenaError, ConfigError, Result, StreamError};
pub use types::{ChunkMesh, MinMaxAABB, Vertex};

// Density fields and the terrain built on them
pub mod field;
pub mod fields;
pub mod terrain;
pub use field::VolumetricField;
pub use terrain::Terrain;

// Quadtree LOD selection
pub mod quadtree;
pub use quadtree::{ActiveSet, Diff, NeighborLod, Neighborhood, QuadNode, QuadTree, QuadTreeConfig};

// Isosurface extraction
pub mod extract;
pub use extract::{extract, ChunkDescriptor};

// Graphics boundary
pub mod gpu;
pub use gpu::{BufferHandle, DrawTarget, HostArena, VertexArena, VertexBuffer};

// Background extraction and publication
pub mod job;
pub mod snapshot;
pub mod threading;
pub use job::{ExtractionJob, JobInput};
pub use snapshot::{ChunkGroup, Snapshot, SnapshotBroker, StagedGroups};
pub use threading::{JobHandle, JobPoll, TaskExecutor, TaskId};

// Per-frame orchestration
pub mod metrics;
pub mod streamer;
pub use metrics::StreamerMetrics;
pub use streamer::{JobState, TerrainStreamer, TickReport};

#[cfg(test)]
mod test_utils;
