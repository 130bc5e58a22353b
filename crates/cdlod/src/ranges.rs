//! Per-level visibility distances and the morph constants derived from them.
//!
//! # LOD Convention
//!
//! Level 0 = finest detail (leaf nodes), higher level = coarser. A node of
//! level `L` may only be selected while it intersects the sphere of radius
//! `ranges[L]` around the eye.
//!
//! ```text
//! section  = finest_node_size * leaf_node_size * patch_scale
//! range[0] = section
//! range[i] = range[i-1] + section * detail_balance^i
//! ```

use std::ops::Index;

use glam::Vec2;

use crate::error::{CdlodError, Result};
use crate::settings::Settings;

/// Ascending per-level visibility distances in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleRanges {
  /// LOD granularity multiplier at level 0.
  pub finest_node_size: f32,

  /// Ratio between the growth of consecutive levels.
  pub detail_balance: f32,

  ranges: Vec<f32>,
}

impl VisibleRanges {
  pub const DEFAULT_FINEST_NODE_SIZE: f32 = 5.0;
  pub const DEFAULT_DETAIL_BALANCE: f32 = 2.0;

  /// Ranges for `settings` using the default parameters.
  pub fn new(settings: &Settings) -> Result<Self> {
    Self::with_params(
      settings,
      Self::DEFAULT_FINEST_NODE_SIZE,
      Self::DEFAULT_DETAIL_BALANCE,
    )
  }

  /// Ranges for `settings` with explicit parameters.
  pub fn with_params(settings: &Settings, finest_node_size: f32, detail_balance: f32) -> Result<Self> {
    let mut ranges = Self {
      finest_node_size,
      detail_balance,
      ranges: Vec::new(),
    };
    ranges.initialize(settings)?;
    Ok(ranges)
  }

  /// Use explicit distances, one per level, strictly ascending.
  ///
  /// `finest_node_size` and `detail_balance` are left at NaN because the
  /// table no longer derives from them.
  pub fn from_ranges(ranges: Vec<f32>) -> Result<Self> {
    if ranges.is_empty() {
      return Err(CdlodError::InvalidVisibleRanges(
        "at least one range is required".into(),
      ));
    }
    if ranges.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
      return Err(CdlodError::InvalidVisibleRanges(
        "ranges must be finite and > 0".into(),
      ));
    }
    if ranges.windows(2).any(|pair| pair[0] >= pair[1]) {
      return Err(CdlodError::InvalidVisibleRanges(format!(
        "ranges must be strictly ascending, got {:?}",
        ranges
      )));
    }
    Ok(Self {
      finest_node_size: f32::NAN,
      detail_balance: f32::NAN,
      ranges,
    })
  }

  /// Recompute the table from `finest_node_size` and `detail_balance`.
  pub fn initialize(&mut self, settings: &Settings) -> Result<()> {
    settings.validate()?;
    if !(self.finest_node_size.is_finite() && self.finest_node_size > 0.0) {
      return Err(CdlodError::InvalidVisibleRanges(format!(
        "finest node size must be finite and > 0, got {}",
        self.finest_node_size
      )));
    }
    if !(self.detail_balance.is_finite() && self.detail_balance > 0.0) {
      return Err(CdlodError::InvalidVisibleRanges(format!(
        "detail balance must be finite and > 0, got {}",
        self.detail_balance
      )));
    }

    let section = self.finest_node_size * settings.leaf_node_size as f32 * settings.patch_scale;
    let mut ranges = Vec::with_capacity(settings.level_count as usize);
    let mut visibility_distance = section;
    let mut balance = 1.0;
    for _ in 0..settings.level_count {
      ranges.push(visibility_distance);
      balance *= self.detail_balance;
      visibility_distance += section * balance;
    }

    if ranges.windows(2).any(|pair| pair[0] >= pair[1]) || !visibility_distance.is_finite() {
      return Err(CdlodError::InvalidVisibleRanges(format!(
        "parameters do not produce strictly ascending finite ranges: {:?}",
        ranges
      )));
    }
    self.ranges = ranges;
    Ok(())
  }

  /// Number of levels covered.
  #[inline]
  pub fn len(&self) -> usize {
    self.ranges.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  #[inline]
  pub fn get(&self, level: usize) -> Option<f32> {
    self.ranges.get(level).copied()
  }

  /// Farthest distance at which anything is selected.
  #[inline]
  pub fn max_range(&self) -> f32 {
    self.ranges.last().copied().unwrap_or(0.0)
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.ranges
  }
}

impl Index<usize> for VisibleRanges {
  type Output = f32;

  fn index(&self, level: usize) -> &f32 {
    &self.ranges[level]
  }
}

/// Per-level coefficients for shader-side morphing between LOD levels.
///
/// Each level morphs toward the next coarser level over the last
/// `1 - start_ratio` fraction of its range:
///
/// ```text
/// prev  = ranges[level - 1]        (0 at level 0)
/// end   = ranges[level]
/// start = prev + (end - prev) * start_ratio
/// const = (end / (end - start), 1 / (end - start))
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MorphConsts {
  start_ratio: f32,
  bands: Vec<(f32, f32)>,
  consts: Vec<Vec2>,
}

impl MorphConsts {
  pub const DEFAULT_START_RATIO: f32 = 0.66;

  pub fn new(ranges: &VisibleRanges) -> Result<Self> {
    Self::with_start_ratio(ranges, Self::DEFAULT_START_RATIO)
  }

  pub fn with_start_ratio(ranges: &VisibleRanges, start_ratio: f32) -> Result<Self> {
    if !(0.0..1.0).contains(&start_ratio) {
      return Err(CdlodError::InvalidMorphStartRatio(start_ratio));
    }

    let mut bands = Vec::with_capacity(ranges.len());
    let mut consts = Vec::with_capacity(ranges.len());
    let mut prev = 0.0;
    for &end in ranges.as_slice() {
      let start = prev + (end - prev) * start_ratio;
      bands.push((start, end));
      consts.push(Vec2::new(end / (end - start), 1.0 / (end - start)));
      prev = end;
    }

    Ok(Self {
      start_ratio,
      bands,
      consts,
    })
  }

  pub fn start_ratio(&self) -> f32 {
    self.start_ratio
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.consts.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.consts.is_empty()
  }

  /// Shader constants for a level.
  #[inline]
  pub fn get(&self, level: usize) -> Option<Vec2> {
    self.consts.get(level).copied()
  }

  /// `(start, end)` distances of a level's morph band.
  #[inline]
  pub fn morph_range(&self, level: usize) -> Option<(f32, f32)> {
    self.bands.get(level).copied()
  }

  /// Morph factor the vertex shader derives at `distance` from the eye:
  /// 0 before the band, 1 at its end.
  pub fn morph_lerp(&self, level: usize, distance: f32) -> Option<f32> {
    self
      .get(level)
      .map(|c| 1.0 - (c.x - distance * c.y).clamp(0.0, 1.0))
  }

  pub fn as_slice(&self) -> &[Vec2] {
    &self.consts
  }
}

#[cfg(test)]
#[path = "ranges_test.rs"]
mod ranges_test;
