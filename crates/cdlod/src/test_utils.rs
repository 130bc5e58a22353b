//! Test utilities shared by the unit tests.
//!
//! Provides height map fixtures, camera setups and invariant checks over a
//! finished selection.

use std::collections::HashSet;

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::height::HeightMap;
use crate::quadtree::QuadTree;
use crate::ranges::VisibleRanges;
use crate::selection::Selection;
use crate::settings::Settings;
use crate::terrain::Terrain;

// =============================================================================
// Height map fixtures
// =============================================================================

/// Smooth random terrain: a few random sine octaves plus per-sample jitter.
pub fn random_height_map(width: u32, height: u32, seed: u64) -> HeightMap {
  let mut rng = StdRng::seed_from_u64(seed);
  let octaves: Vec<(f32, f32, f32, f32)> = (0..4)
    .map(|i| {
      let frequency = 0.02 * (1 << i) as f32;
      (
        frequency * rng.random_range(0.5..1.5),
        frequency * rng.random_range(0.5..1.5),
        rng.random_range(0.0..std::f32::consts::TAU),
        0.5 / (1 << i) as f32,
      )
    })
    .collect();

  HeightMap::from_fn(width, height, |x, y| {
    let smooth: f32 = octaves
      .iter()
      .map(|&(fx, fy, phase, amplitude)| (x as f32 * fx + y as f32 * fy + phase).sin() * amplitude)
      .sum();
    smooth + rng.random_range(-0.02..0.02)
  })
}

/// Built terrain over `height_map`.
pub fn terrain_with(settings: Settings, height_map: HeightMap) -> Terrain<HeightMap> {
  let mut terrain = Terrain::with_height_map(settings, height_map).unwrap();
  terrain.build().unwrap();
  terrain
}

// =============================================================================
// Cameras
// =============================================================================

/// Camera at `eye` looking straight down with a 120 degree field of view.
///
/// Contains any terrain whose extent from the point below the eye stays
/// under `eye.y * tan(60°)`.
pub fn looking_down(
  settings: Settings,
  ranges: VisibleRanges,
  capacity: usize,
  eye: Vec3,
) -> Selection {
  let target = Vec3::new(eye.x, eye.y - 1.0, eye.z);
  looking_at(settings, ranges, capacity, eye, target)
}

/// Camera at `eye` looking at `target` with a 120 degree field of view.
pub fn looking_at(
  settings: Settings,
  ranges: VisibleRanges,
  capacity: usize,
  eye: Vec3,
  target: Vec3,
) -> Selection {
  let mut selection = Selection::with_capacity(settings, ranges, capacity).unwrap();
  let forward = (target - eye).normalize();
  let up = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
  selection.view = Mat4::look_at_rh(eye, target, up);
  selection.projection = Mat4::perspective_rh(120.0_f32.to_radians(), 1.0, 0.1, 1.0e5);
  selection.prepare();
  selection
}

/// Camera at `eye` with an orthographic box frustum large enough to contain
/// any test terrain, so only visibility ranges decide the selection.
pub fn seeing_everything(
  settings: Settings,
  ranges: VisibleRanges,
  capacity: usize,
  eye: Vec3,
) -> Selection {
  const EXTENT: f32 = 1.0e5;
  let mut selection = Selection::with_capacity(settings, ranges, capacity).unwrap();
  selection.view = Mat4::from_translation(-eye);
  selection.projection = Mat4::orthographic_rh(-EXTENT, EXTENT, -EXTENT, EXTENT, -EXTENT, EXTENT);
  selection.prepare();
  selection
}

// =============================================================================
// Invariant checks
// =============================================================================

/// `(x, y, level)` of every selected node.
pub fn selected_keys(selection: &Selection) -> HashSet<(u32, u32, u32)> {
  selection
    .selected_nodes()
    .iter()
    .map(|node| (node.x, node.y, node.level))
    .collect()
}

/// Per-cell count of selected nodes covering it, row-major over the
/// field's cells. Nodes overhanging the field edge are clipped.
pub fn coverage_counts(tree: &QuadTree, selection: &Selection) -> Vec<u32> {
  let (width, height) = tree.dimensions();
  let (cells_x, cells_y) = (width - 1, height - 1);
  let mut counts = vec![0u32; (cells_x * cells_y) as usize];
  for node in selection.selected_nodes() {
    for y in node.y..(node.y + node.size).min(cells_y) {
      for x in node.x..(node.x + node.size).min(cells_x) {
        counts[(y * cells_x + x) as usize] += 1;
      }
    }
  }
  counts
}

/// Panics unless every node has either all of its present children selected
/// (directly or through their own descendants) or none of them.
pub fn assert_crack_free(tree: &QuadTree, selection: &Selection) {
  let selected = selected_keys(selection);
  let covered = |node: &crate::Node| subtree_has_selection(tree, node, &selected);

  for node in tree.nodes().iter().filter(|n| !n.is_leaf()) {
    let children: Vec<_> = tree.children(node).collect();
    let covered_count = children.iter().filter(|child| covered(child)).count();
    assert!(
      covered_count == 0 || covered_count == children.len(),
      "node ({}, {}) level {}: {} of {} children covered",
      node.x(),
      node.y(),
      node.level(),
      covered_count,
      children.len()
    );
  }
}

fn subtree_has_selection(
  tree: &QuadTree,
  node: &crate::Node,
  selected: &HashSet<(u32, u32, u32)>,
) -> bool {
  selected.contains(&(node.x(), node.y(), node.level()))
    || tree
      .children(node)
      .any(|child| subtree_has_selection(tree, child, selected))
}
