//! VolumetricField - the density source the extractor contours.

use std::sync::Arc;

use glam::DVec3;

/// Signed density sampled on demand.
///
/// Negative values are solid, zero or positive values are air; the surface is
/// the zero crossing. Implementations must be pure for the duration of an
/// extraction job: mutating the field while a job is in flight is a caller
/// error with undefined geometry as the result.
pub trait VolumetricField: Send + Sync {
  /// Density at a world-space position.
  fn sample_density(&self, world_pos: DVec3) -> f32;
}

impl VolumetricField for Box<dyn VolumetricField> {
  #[inline]
  fn sample_density(&self, world_pos: DVec3) -> f32 {
    (**self).sample_density(world_pos)
  }
}

impl<F: VolumetricField + ?Sized> VolumetricField for Arc<F> {
  #[inline]
  fn sample_density(&self, world_pos: DVec3) -> f32 {
    (**self).sample_density(world_pos)
  }
}
