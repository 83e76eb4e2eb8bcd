//! Chunk grid constants.
//!
//! # Chunk Grid Layout
//!
//! ```text
//!   lattice z
//!      ▲
//!  N·s ┼─────┬─────┬─────┐      N = chunk_dim cells per horizontal edge
//!      │     │     │     │      s = 2^(max_lod - level) finest cells per cell
//!      ├─────┼─────┼─────┤      M = vertical_cells, identical for every level
//!      │     │     │     │
//!    0 ┼─────┴─────┴─────┴──▶ lattice x
//!      0                N·s
//! ```
//!
//! A chunk samples `(N + 1)² · (M + 1)` lattice points. Horizontal spacing
//! doubles with every coarser level; vertical spacing never changes, so LOD
//! seams only ever refine along the two horizontal axes.
//!
//! # Corner Layout
//!
//! ```text
//! corner i = (x = bit0, y = bit1, z = bit2)
//!
//!       6──────7
//!      /│     /│
//!     2─┼────3 │
//!     │ 4────┼─5
//!     │/     │/
//!     0──────1
//! ```

/// Default horizontal cells per chunk edge (`CHUNK_DIM`).
pub const DEFAULT_CHUNK_DIM: u32 = 16;

/// Default vertical cells spanning the terrain height range.
pub const DEFAULT_VERTICAL_CELLS: u32 = 32;

/// Default distance ratio: a node subdivides while the focal point is closer
/// than this many node widths.
pub const DEFAULT_DISTANCE_RATIO: f64 = 2.0;

/// Corner offsets within a cell, `[x, y, z]` per corner index.
pub const CORNER_OFFSETS: [[i64; 3]; 8] = [
  [0, 0, 0], // 0b000
  [1, 0, 0], // 0b001
  [0, 1, 0], // 0b010
  [1, 1, 0], // 0b011
  [0, 0, 1], // 0b100
  [1, 0, 1], // 0b101
  [0, 1, 1], // 0b110
  [1, 1, 1], // 0b111
];

/// Index of the sample at `(x, y, z)` in a chunk grid of `dim` horizontal and
/// `vertical` vertical cells. Z innermost.
#[inline(always)]
pub const fn grid_index(x: usize, y: usize, z: usize, dim: usize, vertical: usize) -> usize {
  (x * (vertical + 1) + y) * (dim + 1) + z
}
