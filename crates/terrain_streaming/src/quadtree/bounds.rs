//! Axis-aligned rectangle with double precision for planet-scale extents.

use glam::DVec2;

/// Double-precision axis-aligned rectangle on the terrain's horizontal plane.
///
/// Used for node footprints and for the domain the quadtree covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DRect {
  /// Minimum corner (inclusive).
  pub min: DVec2,
  /// Maximum corner (inclusive).
  pub max: DVec2,
}

impl DRect {
  /// Create a new rectangle from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on both axes.
  pub fn new(min: DVec2, max: DVec2) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y,
      "rect min must be <= max on both axes"
    );
    Self { min, max }
  }

  /// Square with its minimum corner at `origin`.
  pub fn square(origin: DVec2, size: f64) -> Self {
    Self::new(origin, origin + DVec2::splat(size))
  }

  /// Check if this rectangle contains a point (boundary included).
  #[inline]
  pub fn contains_point(&self, point: DVec2) -> bool {
    point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
  }

  /// Nearest point inside the rectangle.
  #[inline]
  pub fn clamp_point(&self, point: DVec2) -> DVec2 {
    point.clamp(self.min, self.max)
  }

  /// Euclidean distance from `point` to the rectangle; zero inside.
  #[inline]
  pub fn distance_to_point(&self, point: DVec2) -> f64 {
    let outside = (self.min - point).max(point - self.max).max(DVec2::ZERO);
    outside.length()
  }

  /// Get the size of the rectangle (max - min).
  #[inline]
  pub fn size(&self) -> DVec2 {
    self.max - self.min
  }

  /// Get the center of the rectangle.
  #[inline]
  pub fn center(&self) -> DVec2 {
    (self.min + self.max) * 0.5
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_square() {
    let rect = DRect::square(DVec2::new(-2.0, 4.0), 3.0);
    assert_eq!(rect.min, DVec2::new(-2.0, 4.0));
    assert_eq!(rect.max, DVec2::new(1.0, 7.0));
    assert_eq!(rect.size(), DVec2::splat(3.0));
    assert_eq!(rect.center(), DVec2::new(-0.5, 5.5));
  }

  #[test]
  fn test_contains_point() {
    let rect = DRect::new(DVec2::ZERO, DVec2::splat(10.0));

    assert!(rect.contains_point(DVec2::splat(5.0)));
    assert!(rect.contains_point(DVec2::ZERO));
    assert!(rect.contains_point(DVec2::splat(10.0)));
    assert!(!rect.contains_point(DVec2::new(-1.0, 5.0)));
    assert!(!rect.contains_point(DVec2::new(5.0, 11.0)));
  }

  #[test]
  fn test_clamp_point() {
    let rect = DRect::new(DVec2::ZERO, DVec2::splat(10.0));

    assert_eq!(rect.clamp_point(DVec2::new(-5.0, 3.0)), DVec2::new(0.0, 3.0));
    assert_eq!(rect.clamp_point(DVec2::new(12.0, 20.0)), DVec2::splat(10.0));
    assert_eq!(rect.clamp_point(DVec2::splat(4.0)), DVec2::splat(4.0));
  }

  #[test]
  fn test_distance_to_point() {
    let rect = DRect::new(DVec2::ZERO, DVec2::splat(10.0));

    // Inside and on the boundary
    assert_eq!(rect.distance_to_point(DVec2::splat(5.0)), 0.0);
    assert_eq!(rect.distance_to_point(DVec2::new(10.0, 0.0)), 0.0);

    // Face region
    assert_eq!(rect.distance_to_point(DVec2::new(13.0, 5.0)), 3.0);

    // Corner region
    assert!((rect.distance_to_point(DVec2::new(13.0, 14.0)) - 5.0).abs() < 1e-12);
  }
}
