//! Simple density fields for demos, benchmarks and tests.
//!
//! These fields are deterministic closed-form functions so chunk seams can be
//! checked without noise generation in the loop.

use glam::DVec3;

use crate::field::VolumetricField;

/// Plane tilted about the Z axis.
///
/// Density: `(y - height) * cos(angle) - x * sin(angle)`.
/// The surface crosses every chunk boundary at a predictable angle, which
/// makes it the reference field for seam checks.
#[derive(Clone, Debug)]
pub struct TiltedPlaneField {
  /// Height of the plane at x = 0.
  pub height: f64,
  /// Tilt angle in radians.
  pub angle: f64,
}

impl Default for TiltedPlaneField {
  fn default() -> Self {
    Self {
      height: 0.0,
      angle: 0.3,
    }
  }
}

impl TiltedPlaneField {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_height(mut self, height: f64) -> Self {
    self.height = height;
    self
  }

  pub fn with_angle_degrees(mut self, degrees: f64) -> Self {
    self.angle = degrees.to_radians();
    self
  }
}

impl VolumetricField for TiltedPlaneField {
  fn sample_density(&self, p: DVec3) -> f32 {
    ((p.y - self.height) * self.angle.cos() - p.x * self.angle.sin()) as f32
  }
}

/// Rolling heightfield built from two sine waves.
///
/// Density: `y - (base + amplitude * sin(x / wavelength) * cos(z / wavelength))`.
#[derive(Clone, Debug)]
pub struct SineHillsField {
  pub base: f64,
  pub amplitude: f64,
  pub wavelength: f64,
}

impl Default for SineHillsField {
  fn default() -> Self {
    Self {
      base: 0.0,
      amplitude: 8.0,
      wavelength: 24.0,
    }
  }
}

impl SineHillsField {
  pub fn height_at(&self, x: f64, z: f64) -> f64 {
    self.base + self.amplitude * (x / self.wavelength).sin() * (z / self.wavelength).cos()
  }
}

impl VolumetricField for SineHillsField {
  fn sample_density(&self, p: DVec3) -> f32 {
    (p.y - self.height_at(p.x, p.z)) as f32
  }
}

/// Solid sphere, negative inside.
#[derive(Clone, Debug)]
pub struct SphereField {
  pub center: DVec3,
  pub radius: f64,
}

impl VolumetricField for SphereField {
  fn sample_density(&self, p: DVec3) -> f32 {
    (p.distance(self.center) - self.radius) as f32
  }
}
