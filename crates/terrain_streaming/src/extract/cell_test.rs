use glam::DVec3;

use super::*;

#[test]
fn test_single_solid_corner_pulls_vertex_towards_it() {
  // Corner 0 is solid, all others are air: edges 0, 1 and 2 cross.
  let samples = [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];

  let pos = dual_vertex(&samples);

  assert!(pos.x < 0.5);
  assert!(pos.y < 0.5);
  assert!(pos.z < 0.5);
  assert!(is_mixed(&samples));
}

#[test]
fn test_no_crossing_falls_back_to_centre() {
  let samples = [1.0; 8];

  let pos = dual_vertex(&samples);

  assert!((pos - Vec3A::splat(0.5)).abs().max_element() < 1e-6);
  assert!(!is_mixed(&samples));
  assert!(!is_mixed(&[-1.0; 8]));
}

#[test]
fn test_horizontal_surface_sits_on_crossing_height() {
  // Bottom (y = 0) solid at -1, top (y = 1) air at +3: crossing at y = 0.25.
  let samples = [-1.0, -1.0, 3.0, 3.0, -1.0, -1.0, 3.0, 3.0];

  let pos = dual_vertex(&samples);

  assert!((pos.y - 0.25).abs() < 1e-6);
  assert!((pos.x - 0.5).abs() < 1e-6);
  assert!((pos.z - 0.5).abs() < 1e-6);
}

#[test]
fn test_gradient_points_to_air() {
  let samples = [-1.0, -1.0, 3.0, 3.0, -1.0, -1.0, 3.0, 3.0];

  let normal = gradient_normal(&samples, DVec3::ONE);

  assert!((normal[1] - 1.0).abs() < 1e-6);
  assert!(normal[0].abs() < 1e-6);
  assert!(normal[2].abs() < 1e-6);
}

#[test]
fn test_gradient_accounts_for_cell_extent() {
  // Equal density change along X and Y, but the cell is 4x wider than tall,
  // so the true slope along X is 4x shallower.
  let samples = [0.0, 1.0, 1.0, 2.0, 0.0, 1.0, 1.0, 2.0];

  let normal = gradient_normal(&samples, DVec3::new(4.0, 1.0, 1.0));

  assert!((normal[1] / normal[0] - 4.0).abs() < 1e-4);
  assert!(normal[2].abs() < 1e-6);
}

#[test]
fn test_flat_gradient_defaults_up() {
  assert_eq!(gradient_normal(&[0.5; 8], DVec3::ONE), [0.0, 1.0, 0.0]);
}
