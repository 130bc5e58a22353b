//! Selection - the per-frame output buffer of terrain selection.
//!
//! A `Selection` is created once and reused every frame. The caller updates
//! `view`, `projection` and `terrain_offset`, calls [`Selection::prepare`]
//! and then [`crate::Terrain::select`]. The selected node buffer has a fixed
//! capacity; nodes selected past it are dropped and counted.

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;
use crate::error::{CdlodError, Result};
use crate::frustum::Frustum;
use crate::node::Node;
use crate::ranges::VisibleRanges;
use crate::settings::Settings;

/// Default capacity of the selected node buffer.
pub const DEFAULT_MAX_SELECTED_NODE_COUNT: usize = 500;

/// Flat snapshot of a selected node, decoupled from the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedNode {
  pub x: u32,
  pub y: u32,
  pub min_height: f32,
  pub max_height: f32,
  pub size: u32,
  pub level: u32,
}

impl SelectedNode {
  /// World-space bounds of the patch.
  pub fn bounding_box(&self, settings: &Settings, terrain_offset: Vec3) -> Aabb {
    Aabb::new(
      settings.grid_to_world(terrain_offset, self.x, self.y, self.min_height),
      settings.grid_to_world(
        terrain_offset,
        self.x + self.size,
        self.y + self.size,
        self.max_height,
      ),
    )
  }
}

impl From<&Node> for SelectedNode {
  fn from(node: &Node) -> Self {
    Self {
      x: node.x(),
      y: node.y(),
      min_height: node.min_height(),
      max_height: node.max_height(),
      size: node.size(),
      level: node.level(),
    }
  }
}

/// Per-instance vertex data for drawing one patch.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PatchInstanceVertex {
  /// World-space XZ origin of the patch.
  pub offset: [f32; 2],

  /// World-space side length of the patch.
  pub scale: f32,

  /// LOD level, as float for the vertex stream.
  pub level: f32,
}

/// Per-frame selection state and output buffer.
#[derive(Clone, Debug)]
pub struct Selection {
  /// World-space origin of grid point (0, 0) at height 0.
  pub terrain_offset: Vec3,

  pub view: Mat4,

  pub projection: Mat4,

  eye_position: Vec3,
  frustum: Frustum,
  settings: Settings,
  visible_ranges: VisibleRanges,
  selected_nodes: Vec<SelectedNode>,
  max_selected_node_count: usize,
  dropped_node_count: usize,
}

impl Selection {
  pub fn new(settings: Settings, visible_ranges: VisibleRanges) -> Result<Self> {
    Self::with_capacity(settings, visible_ranges, DEFAULT_MAX_SELECTED_NODE_COUNT)
  }

  /// Selection holding at most `max_selected_node_count` nodes per frame.
  pub fn with_capacity(
    settings: Settings,
    visible_ranges: VisibleRanges,
    max_selected_node_count: usize,
  ) -> Result<Self> {
    settings.validate()?;
    check_range_count(&settings, &visible_ranges)?;

    let mut selection = Self {
      terrain_offset: Vec3::ZERO,
      view: Mat4::IDENTITY,
      projection: Mat4::IDENTITY,
      eye_position: Vec3::ZERO,
      frustum: Frustum::default(),
      settings,
      visible_ranges,
      selected_nodes: Vec::with_capacity(max_selected_node_count),
      max_selected_node_count,
      dropped_node_count: 0,
    };
    selection.prepare();
    Ok(selection)
  }

  /// Derive eye position and frustum from `view` and `projection`.
  pub fn prepare(&mut self) {
    self.eye_position = self.view.inverse().w_axis.truncate();
    self.frustum = Frustum::from_view_projection(self.projection * self.view);
  }

  /// Drop the previous frame's output. Keeps the allocation.
  pub fn clear(&mut self) {
    self.selected_nodes.clear();
    self.dropped_node_count = 0;
  }

  /// Replace the visibility table, e.g. to shorten ranges after overflow.
  pub fn set_visible_ranges(&mut self, visible_ranges: VisibleRanges) -> Result<()> {
    check_range_count(&self.settings, &visible_ranges)?;
    self.visible_ranges = visible_ranges;
    Ok(())
  }

  pub(crate) fn add_selected_node(&mut self, node: &Node) {
    if self.selected_nodes.len() < self.max_selected_node_count {
      self.selected_nodes.push(SelectedNode::from(node));
    } else {
      self.dropped_node_count += 1;
    }
  }

  #[inline]
  pub fn selected_node_count(&self) -> usize {
    self.selected_nodes.len()
  }

  #[inline]
  pub fn selected_node(&self, index: usize) -> Option<&SelectedNode> {
    self.selected_nodes.get(index)
  }

  pub fn selected_nodes(&self) -> &[SelectedNode] {
    &self.selected_nodes
  }

  /// Instance data for the selected node at `index`.
  pub fn patch_instance_vertex(&self, index: usize) -> Option<PatchInstanceVertex> {
    self
      .selected_nodes
      .get(index)
      .map(|node| self.instance_vertex(node))
  }

  pub fn patch_instance_vertices(&self) -> impl ExactSizeIterator<Item = PatchInstanceVertex> + '_ {
    self
      .selected_nodes
      .iter()
      .map(move |node| self.instance_vertex(node))
  }

  fn instance_vertex(&self, node: &SelectedNode) -> PatchInstanceVertex {
    let patch_scale = self.settings.patch_scale;
    PatchInstanceVertex {
      offset: [
        node.x as f32 * patch_scale + self.terrain_offset.x,
        node.y as f32 * patch_scale + self.terrain_offset.z,
      ],
      scale: node.size as f32 * patch_scale,
      level: node.level as f32,
    }
  }

  #[inline]
  pub fn max_selected_node_count(&self) -> usize {
    self.max_selected_node_count
  }

  /// Nodes the last selection wanted to add past capacity.
  #[inline]
  pub fn dropped_node_count(&self) -> usize {
    self.dropped_node_count
  }

  #[inline]
  pub fn is_overflowed(&self) -> bool {
    self.dropped_node_count > 0
  }

  #[inline]
  pub fn eye_position(&self) -> Vec3 {
    self.eye_position
  }

  #[inline]
  pub fn frustum(&self) -> &Frustum {
    &self.frustum
  }

  #[inline]
  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  #[inline]
  pub fn visible_ranges(&self) -> &VisibleRanges {
    &self.visible_ranges
  }
}

fn check_range_count(settings: &Settings, visible_ranges: &VisibleRanges) -> Result<()> {
  if visible_ranges.len() != settings.level_count as usize {
    return Err(CdlodError::InvalidVisibleRanges(format!(
      "{} ranges for {} levels",
      visible_ranges.len(),
      settings.level_count
    )));
  }
  Ok(())
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;
