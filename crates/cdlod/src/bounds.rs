//! Bounding volumes used by node selection.

use glam::Vec3;

/// Result of testing a volume against a container such as a frustum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
  /// Completely outside.
  Disjoint,
  /// Partially inside.
  Intersects,
  /// Completely inside.
  Contains,
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl Aabb {
  /// Create a new AABB from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(
      min.cmple(max).all(),
      "AABB min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Check if this AABB overlaps with another.
  ///
  /// Two AABBs overlap if they share any interior or boundary points.
  #[inline]
  pub fn overlaps(&self, other: &Aabb) -> bool {
    self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
  }

  /// Check if this AABB contains a point.
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.cmpge(self.min).all() && point.cmple(self.max).all()
  }

  /// Point of the box closest to `point`.
  #[inline]
  pub fn closest_point(&self, point: Vec3) -> Vec3 {
    point.clamp(self.min, self.max)
  }

  /// Check if this AABB touches a sphere.
  #[inline]
  pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
    self.closest_point(sphere.center).distance_squared(sphere.center)
      <= sphere.radius * sphere.radius
  }

  /// Get the size of the AABB (max - min).
  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  /// Get the center of the AABB.
  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}

/// Sphere used as the per-level visibility proxy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
  pub center: Vec3,
  pub radius: f32,
}

impl BoundingSphere {
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self { center, radius }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new() {
    let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
    assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
  }

  #[test]
  fn test_overlaps_touching() {
    // Touching at boundary should count as overlapping
    let a = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
    let b = Aabb::new(Vec3::splat(10.0), Vec3::splat(20.0));
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
  }

  #[test]
  fn test_overlaps_false() {
    let a = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
    let b = Aabb::new(Vec3::splat(11.0), Vec3::splat(20.0));
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
  }

  #[test]
  fn test_contains_point() {
    let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));

    assert!(aabb.contains_point(Vec3::splat(5.0)));
    assert!(aabb.contains_point(Vec3::ZERO));
    assert!(!aabb.contains_point(Vec3::splat(-1.0)));
  }

  #[test]
  fn test_sphere_inside_box() {
    let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
    let sphere = BoundingSphere::new(Vec3::splat(5.0), 0.1);
    assert!(aabb.intersects_sphere(&sphere));
  }

  #[test]
  fn test_sphere_reaching_face() {
    let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));

    // Center 5 units above the top face
    let touching = BoundingSphere::new(Vec3::new(5.0, 15.0, 5.0), 5.0);
    let short = BoundingSphere::new(Vec3::new(5.0, 15.0, 5.0), 4.9);
    assert!(aabb.intersects_sphere(&touching));
    assert!(!aabb.intersects_sphere(&short));
  }

  #[test]
  fn test_sphere_near_corner() {
    let aabb = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
    let center = Vec3::new(13.0, 14.0, 10.0);

    // Corner distance is exactly 5 (3-4-5 triangle)
    assert!(aabb.intersects_sphere(&BoundingSphere::new(center, 5.0)));
    assert!(!aabb.intersects_sphere(&BoundingSphere::new(center, 4.5)));
  }

  #[test]
  fn test_flat_box() {
    // Zero-height boxes occur on perfectly flat terrain
    let aabb = Aabb::new(Vec3::ZERO, Vec3::new(32.0, 0.0, 32.0));
    assert_eq!(aabb.size(), Vec3::new(32.0, 0.0, 32.0));
    assert_eq!(aabb.center(), Vec3::new(16.0, 0.0, 16.0));
    assert!(aabb.intersects_sphere(&BoundingSphere::new(Vec3::new(16.0, 10.0, 16.0), 10.0)));
  }
}
