//! View frustum extracted from a view-projection matrix.
//!
//! Planes follow glam's `*_rh` projection convention with a [0, 1] depth
//! range. Plane normals point into the frustum.

use glam::{Mat4, Vec3, Vec4};

use crate::bounds::{Aabb, Containment};

/// A plane `normal · p + distance = 0` with a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub normal: Vec3,
  pub distance: f32,
}

impl Plane {
  /// Build a normalized plane from `(a, b, c, d)` coefficients.
  pub fn from_vec4(v: Vec4) -> Self {
    let length = v.truncate().length();
    if length > 0.0 {
      Self {
        normal: v.truncate() / length,
        distance: v.w / length,
      }
    } else {
      Self {
        normal: Vec3::ZERO,
        distance: 0.0,
      }
    }
  }

  /// Signed distance from point to plane (positive = inside).
  #[inline]
  pub fn distance_to_point(&self, point: Vec3) -> f32 {
    self.normal.dot(point) + self.distance
  }
}

/// Six clipping planes: left, right, bottom, top, near, far.
#[derive(Clone, Debug, PartialEq)]
pub struct Frustum {
  pub planes: [Plane; 6],
}

impl Frustum {
  /// Gribb/Hartmann plane extraction.
  pub fn from_view_projection(view_projection: Mat4) -> Self {
    let row0 = view_projection.row(0);
    let row1 = view_projection.row(1);
    let row2 = view_projection.row(2);
    let row3 = view_projection.row(3);

    Self {
      planes: [
        Plane::from_vec4(row3 + row0),
        Plane::from_vec4(row3 - row0),
        Plane::from_vec4(row3 + row1),
        Plane::from_vec4(row3 - row1),
        // [0, 1] depth: near plane is just row2
        Plane::from_vec4(row2),
        Plane::from_vec4(row3 - row2),
      ],
    }
  }

  /// Classify a box against the frustum.
  ///
  /// Uses the positive/negative vertex test per plane. Boxes near the
  /// frustum's corner regions may report `Intersects` while actually
  /// outside, but a partly visible box is never `Disjoint`.
  pub fn contains_aabb(&self, aabb: &Aabb) -> Containment {
    let mut result = Containment::Contains;
    for plane in &self.planes {
      let positive = plane.normal.cmpge(Vec3::ZERO);
      let farthest = Vec3::select(positive, aabb.max, aabb.min);
      if plane.distance_to_point(farthest) < 0.0 {
        return Containment::Disjoint;
      }
      let nearest = Vec3::select(positive, aabb.min, aabb.max);
      if plane.distance_to_point(nearest) < 0.0 {
        result = Containment::Intersects;
      }
    }
    result
  }

  /// Test if a point is inside the frustum.
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    self
      .planes
      .iter()
      .all(|plane| plane.distance_to_point(point) >= 0.0)
  }
}

impl Default for Frustum {
  fn default() -> Self {
    Self::from_view_projection(Mat4::IDENTITY)
  }
}
