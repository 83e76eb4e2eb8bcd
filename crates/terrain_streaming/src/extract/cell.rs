//! Per-cell math: dual vertex placement and gradient normals.
//!
//! Both functions only look at a cell's eight corner samples, so any chunk
//! that evaluates the same cell gets the same answer.

use glam::{DVec3, Vec3A};

/// Corner `i` of the unit cell sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
#[inline]
fn corner(i: usize) -> Vec3A {
  Vec3A::new((i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32)
}

/// Corner pairs along `axis` (0 = x, 1 = y, 2 = z), low end first.
#[inline]
fn axis_edges(axis: usize) -> impl Iterator<Item = (usize, usize)> {
  let bit = 1 << axis;
  (0..8).filter(move |c| c & bit == 0).map(move |c| (c, c | bit))
}

/// True when the corners do not all lie on the same side of the surface.
#[inline]
pub fn is_mixed(samples: &[f32; 8]) -> bool {
  let solid = samples.iter().filter(|&&s| s < 0.0).count();
  solid != 0 && solid != 8
}

/// Dual vertex in cell-local `[0, 1]³`: mean of the edge crossing points.
///
/// A cell without crossings can still be referenced by a seam polygon when a
/// finer neighbour sees a sign change the coarse corners miss; it falls back
/// to the cell centre.
#[inline]
pub fn dual_vertex(samples: &[f32; 8]) -> Vec3A {
  if !is_mixed(samples) {
    return Vec3A::splat(0.5);
  }

  // A mixed cell always has at least one crossing edge.
  let (total, crossings) = (0..3)
    .flat_map(axis_edges)
    .filter(|&(lo, hi)| (samples[lo] < 0.0) != (samples[hi] < 0.0))
    .fold((Vec3A::ZERO, 0u32), |(total, n), (lo, hi)| {
      let t = samples[lo] / (samples[lo] - samples[hi]);
      (total + corner(lo).lerp(corner(hi), t), n + 1)
    });

  total / crossings as f32
}

/// Unit gradient of the density across the cell, pointing towards air.
///
/// `extent` is the cell's size along each axis; cells are anisotropic since
/// horizontal size grows with LOD while vertical size does not.
#[inline]
pub fn gradient_normal(samples: &[f32; 8], extent: DVec3) -> [f32; 3] {
  // Summed forward differences over the four edges of each axis.
  let slope = |axis: usize| -> f64 {
    axis_edges(axis)
      .map(|(lo, hi)| f64::from(samples[hi]) - f64::from(samples[lo]))
      .sum()
  };

  let gradient = DVec3::new(slope(0), slope(1), slope(2)) / extent;
  match gradient.try_normalize() {
    Some(n) if gradient.length_squared() >= 1e-16 => n.as_vec3().to_array(),
    _ => [0.0, 1.0, 0.0],
  }
}

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;
