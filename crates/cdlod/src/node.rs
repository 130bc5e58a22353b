//! Node - a square region of the height field at one subdivision level.
//!
//! Nodes live in a flat arena owned by [`crate::QuadTree`]. Children are
//! stored as arena indices, with [`NO_CHILD`] marking quadrants that fall
//! outside the height field. Construction pushes children before their
//! parent, so every subtree occupies a contiguous arena range and children
//! always precede their parent.

use glam::Vec3;

use crate::bounds::{Aabb, BoundingSphere, Containment};
use crate::error::{CdlodError, Result};
use crate::height::HeightSource;
use crate::ranges::VisibleRanges;
use crate::selection::{SelectedNode, Selection};
use crate::settings::Settings;

/// Sentinel child index for quadrants outside the height field.
pub(crate) const NO_CHILD: u32 = u32::MAX;

const TOP_LEFT: usize = 0;
const TOP_RIGHT: usize = 1;
const BOTTOM_LEFT: usize = 2;
const BOTTOM_RIGHT: usize = 3;

/// Quadtree node.
///
/// `(x, y)` is the grid-space origin, `size` the side length in grid units.
/// Level 0 nodes are leaves.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
  x: u32,
  y: u32,
  size: u32,
  level: u32,
  min_height: f32,
  max_height: f32,
  children: [u32; 4],
}

impl Node {
  /// Construct the subtree rooted at `(x, y, size)` into `nodes`.
  ///
  /// `cells_x`/`cells_y` are the field's cell counts (samples - 1). Returns
  /// the index of the subtree root.
  pub(crate) fn construct(
    nodes: &mut Vec<Node>,
    x: u32,
    y: u32,
    size: u32,
    settings: &Settings,
    cells_x: u32,
    cells_y: u32,
  ) -> u32 {
    let mut children = [NO_CHILD; 4];

    let level = if size <= settings.leaf_node_size {
      0
    } else {
      let child_size = size / 2;
      let right = x.saturating_add(child_size);
      let bottom = y.saturating_add(child_size);
      let has_right = right < cells_x;
      let has_bottom = bottom < cells_y;

      children[TOP_LEFT] = Self::construct(nodes, x, y, child_size, settings, cells_x, cells_y);
      if has_right {
        children[TOP_RIGHT] =
          Self::construct(nodes, right, y, child_size, settings, cells_x, cells_y);
      }
      if has_bottom {
        children[BOTTOM_LEFT] =
          Self::construct(nodes, x, bottom, child_size, settings, cells_x, cells_y);
      }
      if has_right && has_bottom {
        children[BOTTOM_RIGHT] =
          Self::construct(nodes, right, bottom, child_size, settings, cells_x, cells_y);
      }

      nodes[children[TOP_LEFT] as usize].level + 1
    };

    let index = nodes.len() as u32;
    nodes.push(Node {
      x,
      y,
      size,
      level,
      min_height: f32::INFINITY,
      max_height: f32::NEG_INFINITY,
      children,
    });
    index
  }

  /// Populate min/max heights of an arena slice whose first node sits at
  /// arena index `base`. Children precede parents, so one forward pass
  /// aggregates bottom-up.
  pub(crate) fn build_range<H: HeightSource + ?Sized>(
    nodes: &mut [Node],
    base: usize,
    source: &H,
  ) -> Result<()> {
    for local in 0..nodes.len() {
      let (built, rest) = nodes.split_at_mut(local);
      let node = &mut rest[0];

      if node.is_leaf() {
        node.build_leaf(source)?;
        continue;
      }

      let mut min_height = f32::INFINITY;
      let mut max_height = f32::NEG_INFINITY;
      for child in node.child_indices() {
        let child = &built[child - base];
        min_height = min_height.min(child.min_height);
        max_height = max_height.max(child.max_height);
      }
      node.min_height = min_height;
      node.max_height = max_height;
    }
    Ok(())
  }

  /// Leaves sample one past their nominal edge so neighbours share the
  /// boundary vertex.
  fn build_leaf<H: HeightSource + ?Sized>(&mut self, source: &H) -> Result<()> {
    let size_x = (self.size + 1).min(source.width().saturating_sub(self.x));
    let size_y = (self.size + 1).min(source.height().saturating_sub(self.y));
    let (min_height, max_height) = source.area_min_max(self.x, self.y, size_x, size_y);

    // Also rejects NaN intervals
    if !(min_height <= max_height) {
      return Err(CdlodError::EmptyHeightInterval {
        x: self.x,
        y: self.y,
      });
    }
    self.min_height = min_height;
    self.max_height = max_height;
    Ok(())
  }

  /// Select this node or its descendants into `selection`.
  ///
  /// Returns false when the node lies beyond its own visibility range and
  /// nothing was added for it.
  pub(crate) fn select(
    &self,
    nodes: &[Node],
    selection: &mut Selection,
    parent_completely_in_frustum: bool,
    ignore_visibility_check: bool,
  ) -> bool {
    let settings = *selection.settings();
    let bounds = self.bounding_box(&settings, selection.terrain_offset);
    let eye = selection.eye_position();

    let containment = if parent_completely_in_frustum {
      Containment::Contains
    } else {
      selection.frustum().contains_aabb(&bounds)
    };

    if !ignore_visibility_check {
      let sphere = BoundingSphere::new(eye, selection.visible_ranges()[self.level as usize]);
      if !bounds.intersects_sphere(&sphere) {
        return false;
      }
    }

    if self.is_leaf() {
      if containment != Containment::Disjoint {
        selection.add_selected_node(self);
      }
      return true;
    }

    // Descendant boxes are nested inside this one, so none can be visible.
    if containment == Containment::Disjoint {
      return true;
    }

    let finer_sphere = BoundingSphere::new(eye, selection.visible_ranges()[self.level as usize - 1]);
    if !bounds.intersects_sphere(&finer_sphere) {
      selection.add_selected_node(self);
      return true;
    }

    let any_child_visible = {
      let ranges = selection.visible_ranges();
      self.child_indices().any(|child| {
        nodes[child].pre_select(eye, ranges, &settings, selection.terrain_offset)
      })
    };

    if any_child_visible {
      // All present children or none: partial coverage would leave T-junctions
      let completely_in_frustum = containment == Containment::Contains;
      for child in self.child_indices() {
        nodes[child].select(nodes, selection, completely_in_frustum, true);
      }
    } else {
      selection.add_selected_node(self);
    }
    true
  }

  /// Whether this node would be visible at its own level. No frustum test.
  fn pre_select(
    &self,
    eye: Vec3,
    ranges: &VisibleRanges,
    settings: &Settings,
    terrain_offset: Vec3,
  ) -> bool {
    let sphere = BoundingSphere::new(eye, ranges[self.level as usize]);
    self
      .bounding_box(settings, terrain_offset)
      .intersects_sphere(&sphere)
  }

  /// World-space bounds of this node.
  pub fn bounding_box(&self, settings: &Settings, terrain_offset: Vec3) -> Aabb {
    SelectedNode::from(self).bounding_box(settings, terrain_offset)
  }

  /// Arena indices of the present children, in top-left, top-right,
  /// bottom-left, bottom-right order.
  pub(crate) fn child_indices(&self) -> impl Iterator<Item = usize> + '_ {
    self
      .children
      .iter()
      .filter(|&&child| child != NO_CHILD)
      .map(|&child| child as usize)
  }

  #[inline]
  pub fn x(&self) -> u32 {
    self.x
  }

  #[inline]
  pub fn y(&self) -> u32 {
    self.y
  }

  #[inline]
  pub fn size(&self) -> u32 {
    self.size
  }

  /// 0 = leaf, increasing toward the root.
  #[inline]
  pub fn level(&self) -> u32 {
    self.level
  }

  #[inline]
  pub fn min_height(&self) -> f32 {
    self.min_height
  }

  #[inline]
  pub fn max_height(&self) -> f32 {
    self.max_height
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.level == 0
  }

  /// Number of present children (0 for leaves).
  pub fn child_count(&self) -> usize {
    self.child_indices().count()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
