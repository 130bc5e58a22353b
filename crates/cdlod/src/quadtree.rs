//! QuadTree - grid of top-level nodes covering a height field.
//!
//! A single quadtree rarely covers an arbitrary field, so the field's cells
//! are ceiling-divided into `top_node_size`-sided tiles, each the root of its
//! own subtree. All nodes share one arena.
//!
//! ```text
//! 33x33 samples, top node size 32:  1x1 top nodes
//! 50x20 samples, top node size 16:  4x2 top nodes (49x19 cells)
//! ```

use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{CdlodError, Result};
use crate::height::HeightSource;
use crate::node::Node;
use crate::selection::Selection;
use crate::settings::Settings;

/// Arena-backed CDLOD quadtree.
#[derive(Clone, Debug)]
pub struct QuadTree {
  settings: Settings,
  width: u32,
  height: u32,
  nodes: Vec<Node>,
  /// Arena index of each top-level node, row-major.
  top_nodes: Vec<u32>,
  /// Arena range of each top-level subtree, parallel to `top_nodes`.
  subtrees: Vec<Range<usize>>,
  top_node_count_x: u32,
  top_node_count_y: u32,
  built: bool,
}

impl QuadTree {
  /// Lay out the node hierarchy for a `width` x `height` sample field.
  ///
  /// Heights are unset until [`QuadTree::build`].
  pub fn new(settings: Settings, width: u32, height: u32) -> Result<Self> {
    settings.validate()?;
    if width < 2 || height < 2 {
      return Err(CdlodError::HeightFieldTooSmall { width, height });
    }

    let top_node_size = settings.top_node_size();
    let cells_x = width - 1;
    let cells_y = height - 1;
    let top_node_count_x = cells_x.div_ceil(top_node_size);
    let top_node_count_y = cells_y.div_ceil(top_node_size);

    let top_node_count = (top_node_count_x * top_node_count_y) as usize;
    let mut nodes = Vec::new();
    let mut top_nodes = Vec::with_capacity(top_node_count);
    let mut subtrees = Vec::with_capacity(top_node_count);
    for ty in 0..top_node_count_y {
      for tx in 0..top_node_count_x {
        let start = nodes.len();
        let root = Node::construct(
          &mut nodes,
          tx * top_node_size,
          ty * top_node_size,
          top_node_size,
          &settings,
          cells_x,
          cells_y,
        );
        top_nodes.push(root);
        subtrees.push(start..nodes.len());
      }
    }

    debug!(
      width,
      height,
      top_node_count_x,
      top_node_count_y,
      node_count = nodes.len(),
      "quadtree laid out"
    );

    Ok(Self {
      settings,
      width,
      height,
      nodes,
      top_nodes,
      subtrees,
      top_node_count_x,
      top_node_count_y,
      built: false,
    })
  }

  /// Lay out a tree sized for `source`.
  pub fn for_source<H: HeightSource + ?Sized>(settings: Settings, source: &H) -> Result<Self> {
    Self::new(settings, source.width(), source.height())
  }

  /// Populate every node's min/max height bottom-up.
  ///
  /// Rebuilding replaces all previous heights.
  #[tracing::instrument(skip_all, name = "quadtree::build")]
  pub fn build<H: HeightSource + ?Sized>(&mut self, source: &H) -> Result<()> {
    self.check_source(source)?;
    self.built = false;
    Node::build_range(&mut self.nodes, 0, source)?;
    self.finish_build();
    Ok(())
  }

  /// [`QuadTree::build`] with top-level subtrees built in parallel.
  #[tracing::instrument(skip_all, name = "quadtree::build_par")]
  pub fn build_par<H: HeightSource + Sync + ?Sized>(&mut self, source: &H) -> Result<()> {
    self.check_source(source)?;
    self.built = false;

    let mut slices = Vec::with_capacity(self.subtrees.len());
    let mut rest: &mut [Node] = &mut self.nodes;
    for range in &self.subtrees {
      let (subtree, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
      slices.push((range.start, subtree));
      rest = tail;
    }

    slices
      .into_par_iter()
      .try_for_each(|(base, subtree)| Node::build_range(subtree, base, source))?;
    self.finish_build();
    Ok(())
  }

  fn check_source<H: HeightSource + ?Sized>(&self, source: &H) -> Result<()> {
    if source.width() != self.width || source.height() != self.height {
      return Err(CdlodError::HeightSourceSizeMismatch {
        expected_width: self.width,
        expected_height: self.height,
        width: source.width(),
        height: source.height(),
      });
    }
    Ok(())
  }

  fn finish_build(&mut self) {
    self.built = true;
    if let Some((min_height, max_height)) = self.height_range() {
      debug!(node_count = self.nodes.len(), min_height, max_height, "quadtree built");
    }
  }

  /// Append this frame's patches to `selection`.
  ///
  /// Does not clear `selection`; [`crate::Terrain::select`] does.
  pub fn select(&self, selection: &mut Selection) -> Result<()> {
    if !self.built {
      return Err(CdlodError::NotBuilt);
    }
    if selection.settings() != &self.settings {
      return Err(CdlodError::SettingsMismatch);
    }
    for &root in &self.top_nodes {
      self.nodes[root as usize].select(&self.nodes, selection, false, false);
    }
    Ok(())
  }

  #[inline]
  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  /// Sample counts of the covered field.
  #[inline]
  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  #[inline]
  pub fn is_built(&self) -> bool {
    self.built
  }

  #[inline]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// Every node in arena order (children before parents).
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// Number of top-level nodes along grid x and y.
  #[inline]
  pub fn top_node_count(&self) -> (u32, u32) {
    (self.top_node_count_x, self.top_node_count_y)
  }

  pub fn top_node(&self, tx: u32, ty: u32) -> Option<&Node> {
    if tx >= self.top_node_count_x || ty >= self.top_node_count_y {
      return None;
    }
    let index = self.top_nodes[(ty * self.top_node_count_x + tx) as usize];
    Some(&self.nodes[index as usize])
  }

  /// Top-level nodes, row-major.
  pub fn top_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
    self.top_nodes.iter().map(|&index| &self.nodes[index as usize])
  }

  /// Present children of a node of this tree.
  pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
    node.child_indices().map(|index| &self.nodes[index])
  }

  /// Min and max normalized height over the whole field, once built.
  pub fn height_range(&self) -> Option<(f32, f32)> {
    if !self.built {
      return None;
    }
    self.top_nodes().fold(None, |acc, node| {
      let (min, max) = acc.unwrap_or((f32::INFINITY, f32::NEG_INFINITY));
      Some((min.min(node.min_height()), max.max(node.max_height())))
    })
  }
}

#[cfg(test)]
#[path = "quadtree_test.rs"]
mod quadtree_test;
