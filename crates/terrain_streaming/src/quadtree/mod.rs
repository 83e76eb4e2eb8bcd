//! Quadtree LOD selection over the terrain's horizontal extent.
//!
//! # LOD Convention
//!
//! Level 0 = the root (coarsest), `max_lod` = finest. A node at level `L`
//! covers `extent / 2^L` on each axis.
//!
//! # Module Structure
//!
//! - [`node`]: `QuadNode` - immutable value identity (level, x, y)
//! - [`config`]: `QuadTreeConfig` - domain, depth and distance thresholds
//! - [`active`]: `ActiveSet` - the deepest nodes currently drawn
//! - [`diff`]: `Diff` - added/removed between two evaluations
//! - [`neighborhood`]: what surrounds a node, used for seam ownership
//! - [`tree`]: `QuadTree` - arena of nodes refined around a focal point

pub mod active;
pub mod bounds;
pub mod config;
pub mod diff;
pub mod neighborhood;
pub mod node;
pub mod tree;

pub use active::ActiveSet;
pub use bounds::DRect;
pub use config::{QuadTreeConfig, MAX_SUPPORTED_LOD};
pub use diff::Diff;
pub use neighborhood::{NeighborLod, Neighborhood};
pub use node::QuadNode;
pub use tree::{NodeId, QuadTree};
