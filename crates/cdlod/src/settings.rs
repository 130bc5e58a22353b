//! Settings - immutable per-terrain configuration and grid/world mapping.

use glam::Vec3;

use crate::error::{CdlodError, Result};

/// Maximum number of LOD levels a terrain may use.
pub const MAX_LEVEL_COUNT: u32 = 15;

/// Per-terrain configuration.
///
/// Grid units are height-field sample spacings. Grid x maps to world X, grid
/// y maps to world Z and normalized height maps to world Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
  /// Side length of the finest (level 0) node in grid units. Power of two.
  pub leaf_node_size: u32,

  /// Number of LOD levels, 1..=15.
  pub level_count: u32,

  /// World units per grid unit.
  pub patch_scale: f32,

  /// World units per normalized height unit.
  pub height_scale: f32,
}

impl Settings {
  pub const DEFAULT_LEAF_NODE_SIZE: u32 = 8;
  pub const DEFAULT_LEVEL_COUNT: u32 = 7;
  pub const DEFAULT_PATCH_SCALE: f32 = 2.0;
  pub const DEFAULT_HEIGHT_SCALE: f32 = 50.0;

  /// Check every field, failing on the first invalid one.
  pub fn validate(&self) -> Result<()> {
    if !self.leaf_node_size.is_power_of_two() {
      return Err(CdlodError::InvalidLeafNodeSize(self.leaf_node_size));
    }
    if self.level_count == 0 || self.level_count > MAX_LEVEL_COUNT {
      return Err(CdlodError::InvalidLevelCount {
        got: self.level_count,
        max: MAX_LEVEL_COUNT,
      });
    }
    if self.checked_top_node_size().is_none() {
      return Err(CdlodError::TopNodeSizeOverflow {
        leaf_node_size: self.leaf_node_size,
        level_count: self.level_count,
      });
    }
    if !(self.patch_scale.is_finite() && self.patch_scale > 0.0) {
      return Err(CdlodError::InvalidPatchScale(self.patch_scale));
    }
    if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
      return Err(CdlodError::InvalidHeightScale(self.height_scale));
    }
    Ok(())
  }

  fn checked_top_node_size(&self) -> Option<u32> {
    let shift = self.level_count.checked_sub(1)?;
    let size = self.leaf_node_size.checked_shl(shift)?;
    // checked_shl only rejects oversized shifts, not lost bits
    (size >> shift == self.leaf_node_size).then_some(size)
  }

  /// Side length of a top-level node.
  /// top_node_size = leaf_node_size * 2^(level_count - 1)
  #[inline]
  pub fn top_node_size(&self) -> u32 {
    self.node_size(self.level_count - 1)
  }

  /// Side length of a node at the given level.
  #[inline]
  pub fn node_size(&self, level: u32) -> u32 {
    self.leaf_node_size << level
  }

  /// World-space position of a grid point at the given normalized height.
  #[inline]
  pub fn grid_to_world(&self, terrain_offset: Vec3, x: u32, y: u32, height: f32) -> Vec3 {
    terrain_offset
      + Vec3::new(
        x as f32 * self.patch_scale,
        height * self.height_scale,
        y as f32 * self.patch_scale,
      )
  }
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      leaf_node_size: Self::DEFAULT_LEAF_NODE_SIZE,
      level_count: Self::DEFAULT_LEVEL_COUNT,
      patch_scale: Self::DEFAULT_PATCH_SCALE,
      height_scale: Self::DEFAULT_HEIGHT_SCALE,
    }
  }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
