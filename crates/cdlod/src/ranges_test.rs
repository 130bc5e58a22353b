use super::*;

fn settings(leaf_node_size: u32, level_count: u32, patch_scale: f32) -> Settings {
  Settings {
    leaf_node_size,
    level_count,
    patch_scale,
    ..Default::default()
  }
}

fn approx_eq(a: f32, b: f32) -> bool {
  (a - b).abs() <= 1e-4 * a.abs().max(b.abs()).max(1.0)
}

// =========================================================================
// VisibleRanges
// =========================================================================

/// section = 5 * 8 * 2 = 80; balance 2 gives 80, 240, 560, 1200.
#[test]
fn test_default_progression() {
  let ranges = VisibleRanges::new(&settings(8, 4, 2.0)).unwrap();

  assert_eq!(ranges.len(), 4);
  assert_eq!(ranges.as_slice(), &[80.0, 240.0, 560.0, 1200.0]);
  assert_eq!(ranges.max_range(), 1200.0);
}

/// Balance 1 degenerates into an arithmetic progression.
#[test]
fn test_unit_balance_is_linear() {
  let ranges = VisibleRanges::with_params(&settings(4, 5, 1.0), 2.0, 1.0).unwrap();
  assert_eq!(ranges.as_slice(), &[8.0, 16.0, 24.0, 32.0, 40.0]);
}

#[test]
fn test_ranges_strictly_ascending() {
  for balance in [0.5, 1.0, 1.5, 2.0, 3.0] {
    let ranges = VisibleRanges::with_params(&settings(8, 15, 1.0), 3.0, balance).unwrap();
    assert_eq!(ranges.len(), 15);
    for level in 0..ranges.len() - 1 {
      assert!(
        ranges[level] < ranges[level + 1],
        "balance {}: range {} ({}) must be below range {} ({})",
        balance,
        level,
        ranges[level],
        level + 1,
        ranges[level + 1]
      );
    }
  }
}

#[test]
fn test_index_and_get_agree() {
  let ranges = VisibleRanges::new(&Settings::default()).unwrap();
  for level in 0..ranges.len() {
    assert_eq!(ranges.get(level), Some(ranges[level]));
  }
  assert_eq!(ranges.get(ranges.len()), None);
}

#[test]
fn test_initialize_recomputes_after_parameter_change() {
  let s = settings(8, 3, 1.0);
  let mut ranges = VisibleRanges::new(&s).unwrap();
  assert_eq!(ranges.as_slice(), &[40.0, 120.0, 280.0]);

  ranges.finest_node_size = 1.0;
  ranges.detail_balance = 1.0;
  ranges.initialize(&s).unwrap();
  assert_eq!(ranges.as_slice(), &[8.0, 16.0, 24.0]);
}

#[test]
fn test_rejects_bad_parameters() {
  let s = settings(8, 3, 1.0);
  assert!(VisibleRanges::with_params(&s, 0.0, 2.0).is_err());
  assert!(VisibleRanges::with_params(&s, -1.0, 2.0).is_err());
  assert!(VisibleRanges::with_params(&s, 5.0, 0.0).is_err());
  assert!(VisibleRanges::with_params(&s, 5.0, f32::NAN).is_err());
}

#[test]
fn test_rejects_invalid_settings() {
  let s = settings(6, 3, 1.0);
  assert!(matches!(
    VisibleRanges::new(&s),
    Err(CdlodError::InvalidLeafNodeSize(6))
  ));
}

#[test]
fn test_from_ranges_validation() {
  assert!(VisibleRanges::from_ranges(vec![10.0, 20.0, 100.0]).is_ok());
  assert!(VisibleRanges::from_ranges(vec![]).is_err());
  assert!(VisibleRanges::from_ranges(vec![10.0, 10.0]).is_err());
  assert!(VisibleRanges::from_ranges(vec![20.0, 10.0]).is_err());
  assert!(VisibleRanges::from_ranges(vec![0.0, 10.0]).is_err());
  assert!(VisibleRanges::from_ranges(vec![10.0, f32::INFINITY]).is_err());
}

// =========================================================================
// MorphConsts
// =========================================================================

#[test]
fn test_morph_bands_follow_ratio() {
  let ranges = VisibleRanges::from_ranges(vec![100.0, 300.0]).unwrap();
  let morph = MorphConsts::with_start_ratio(&ranges, 0.5).unwrap();

  assert_eq!(morph.morph_range(0), Some((50.0, 100.0)));
  assert_eq!(morph.morph_range(1), Some((200.0, 300.0)));
  assert_eq!(morph.morph_range(2), None);
}

#[test]
fn test_morph_consts_values() {
  let ranges = VisibleRanges::from_ranges(vec![100.0, 300.0]).unwrap();
  let morph = MorphConsts::with_start_ratio(&ranges, 0.5).unwrap();

  // Level 0: start 50, end 100
  assert_eq!(morph.get(0), Some(Vec2::new(2.0, 0.02)));
  // Level 1: start 200, end 300
  assert_eq!(morph.get(1), Some(Vec2::new(3.0, 0.01)));
}

/// The morph factor is 0 up to the band start, 1 from its end.
#[test]
fn test_morph_lerp_across_band() {
  let ranges = VisibleRanges::new(&Settings::default()).unwrap();
  let morph = MorphConsts::new(&ranges).unwrap();
  assert_eq!(morph.len(), ranges.len());

  for level in 0..morph.len() {
    let (start, end) = morph.morph_range(level).unwrap();
    let k = |d: f32| morph.morph_lerp(level, d).unwrap();

    assert_eq!(k(0.0), 0.0, "level {} near eye", level);
    assert!(approx_eq(k(start), 0.0), "level {} band start", level);
    assert!(approx_eq(k((start + end) * 0.5), 0.5), "level {} mid band", level);
    assert!(approx_eq(k(end), 1.0), "level {} band end", level);
    assert_eq!(k(end * 2.0), 1.0, "level {} beyond range", level);
  }
}

#[test]
fn test_zero_ratio_morphs_whole_range() {
  let ranges = VisibleRanges::from_ranges(vec![10.0, 30.0]).unwrap();
  let morph = MorphConsts::with_start_ratio(&ranges, 0.0).unwrap();
  assert_eq!(morph.morph_range(0), Some((0.0, 10.0)));
  assert_eq!(morph.morph_range(1), Some((10.0, 30.0)));
}

#[test]
fn test_rejects_bad_start_ratio() {
  let ranges = VisibleRanges::from_ranges(vec![10.0, 30.0]).unwrap();
  for ratio in [1.0, 1.5, -0.1, f32::NAN] {
    assert!(
      matches!(
        MorphConsts::with_start_ratio(&ranges, ratio),
        Err(CdlodError::InvalidMorphStartRatio(_))
      ),
      "ratio {} should be rejected",
      ratio
    );
  }
}
