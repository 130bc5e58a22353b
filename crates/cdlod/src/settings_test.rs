use super::*;

// =========================================================================
// Node sizing
// =========================================================================

/// Default settings: 8 * 2^6 = 512.
#[test]
fn test_default_top_node_size() {
  let settings = Settings::default();
  assert_eq!(settings.top_node_size(), 512);
  assert!(settings.validate().is_ok());
}

/// Node size doubles with each level.
#[test]
fn test_node_size_doubles_per_level() {
  let settings = Settings {
    leaf_node_size: 4,
    level_count: 5,
    ..Default::default()
  };

  assert_eq!(settings.node_size(0), 4, "Level 0 is the leaf size");
  assert_eq!(settings.node_size(1), 8);
  assert_eq!(settings.node_size(4), 64);
  assert_eq!(settings.top_node_size(), settings.node_size(4));
}

/// A single level means the top node is a leaf.
#[test]
fn test_single_level_top_node_is_leaf_sized() {
  let settings = Settings {
    leaf_node_size: 16,
    level_count: 1,
    ..Default::default()
  };
  assert_eq!(settings.top_node_size(), 16);
}

/// Grid x maps to world X, grid y to world Z, height to world Y.
#[test]
fn test_grid_to_world_axes() {
  let settings = Settings {
    patch_scale: 2.0,
    height_scale: 10.0,
    ..Default::default()
  };
  let offset = Vec3::new(100.0, -5.0, 50.0);

  let p = settings.grid_to_world(offset, 3, 7, 0.5);
  assert_eq!(p, Vec3::new(106.0, 0.0, 64.0));
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn test_rejects_zero_leaf_node_size() {
  let settings = Settings {
    leaf_node_size: 0,
    ..Default::default()
  };
  assert!(matches!(
    settings.validate(),
    Err(CdlodError::InvalidLeafNodeSize(0))
  ));
}

#[test]
fn test_rejects_non_power_of_two_leaf_node_size() {
  let settings = Settings {
    leaf_node_size: 12,
    ..Default::default()
  };
  assert!(matches!(
    settings.validate(),
    Err(CdlodError::InvalidLeafNodeSize(12))
  ));
}

#[test]
fn test_accepts_leaf_node_size_one() {
  let settings = Settings {
    leaf_node_size: 1,
    level_count: 15,
    ..Default::default()
  };
  assert!(settings.validate().is_ok());
  assert_eq!(settings.top_node_size(), 1 << 14);
}

#[test]
fn test_rejects_level_count_out_of_range() {
  for level_count in [0, 16, 100] {
    let settings = Settings {
      level_count,
      ..Default::default()
    };
    assert!(
      matches!(
        settings.validate(),
        Err(CdlodError::InvalidLevelCount { .. })
      ),
      "level_count {} should be rejected",
      level_count
    );
  }
}

/// 2^31 * 2^14 does not fit in u32.
#[test]
fn test_rejects_top_node_size_overflow() {
  let settings = Settings {
    leaf_node_size: 1 << 31,
    level_count: 15,
    ..Default::default()
  };
  assert!(matches!(
    settings.validate(),
    Err(CdlodError::TopNodeSizeOverflow { .. })
  ));
}

#[test]
fn test_rejects_bad_scales() {
  for patch_scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
    let settings = Settings {
      patch_scale,
      ..Default::default()
    };
    assert!(matches!(
      settings.validate(),
      Err(CdlodError::InvalidPatchScale(_))
    ));
  }

  let settings = Settings {
    height_scale: 0.0,
    ..Default::default()
  };
  assert!(matches!(
    settings.validate(),
    Err(CdlodError::InvalidHeightScale(_))
  ));
}
