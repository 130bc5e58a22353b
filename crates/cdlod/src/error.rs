//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Errors raised while configuring, building or selecting terrain.
///
/// All variants describe configuration problems the caller has to fix.
/// Selection overflow is not an error, see [`crate::Selection::dropped_node_count`].
#[derive(Debug, Error)]
pub enum CdlodError {
  #[error("leaf node size must be a power of two >= 1, got {0}")]
  InvalidLeafNodeSize(u32),

  #[error("level count must be within 1..={max}, got {got}")]
  InvalidLevelCount { got: u32, max: u32 },

  #[error("top node size overflows for leaf node size {leaf_node_size} and {level_count} levels")]
  TopNodeSizeOverflow { leaf_node_size: u32, level_count: u32 },

  #[error("patch scale must be finite and > 0, got {0}")]
  InvalidPatchScale(f32),

  #[error("height scale must be finite and > 0, got {0}")]
  InvalidHeightScale(f32),

  #[error("invalid visible ranges: {0}")]
  InvalidVisibleRanges(String),

  #[error("morph start ratio must be within [0, 1), got {0}")]
  InvalidMorphStartRatio(f32),

  #[error("height field must have at least 2x2 samples, got {width}x{height}")]
  HeightFieldTooSmall { width: u32, height: u32 },

  #[error("quadtree covers a {expected_width}x{expected_height} field, height source is {width}x{height}")]
  HeightSourceSizeMismatch {
    expected_width: u32,
    expected_height: u32,
    width: u32,
    height: u32,
  },

  #[error("height map expects {expected} samples, got {got}")]
  HeightMapSizeMismatch { expected: usize, got: usize },

  #[error("leaf node at ({x}, {y}) received an empty height interval")]
  EmptyHeightInterval { x: u32, y: u32 },

  #[error("no height source assigned before build")]
  MissingHeightSource,

  #[error("terrain must be built before selection")]
  NotBuilt,

  #[error("selection was created for different terrain settings")]
  SettingsMismatch,

  #[cfg(feature = "image")]
  #[error("failed to load height image")]
  Image(#[from] image::ImageError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CdlodError>;
