//! Terrain - binds a height source to a quadtree.
//!
//! ```text
//! Terrain::with_height_map ──► build() ──► select(&mut Selection) per frame
//!                              (once)       clears, then walks top nodes
//! ```

use tracing::{debug, trace};

use crate::error::{CdlodError, Result};
use crate::height::HeightSource;
use crate::quadtree::QuadTree;
use crate::selection::Selection;
use crate::settings::Settings;

/// Terrain facade, generic over its height source.
///
/// Type parameter `H` allows compile-time specialization; use
/// `Box<dyn HeightSource>` for runtime flexibility.
pub struct Terrain<H: HeightSource> {
  settings: Settings,
  height_map: Option<H>,
  quad_tree: Option<QuadTree>,
}

impl<H: HeightSource> Terrain<H> {
  /// Terrain without a height source. Assign one before [`Terrain::build`].
  pub fn new(settings: Settings) -> Result<Self> {
    settings.validate()?;
    Ok(Self {
      settings,
      height_map: None,
      quad_tree: None,
    })
  }

  pub fn with_height_map(settings: Settings, height_map: H) -> Result<Self> {
    let mut terrain = Self::new(settings)?;
    terrain.set_height_map(height_map);
    Ok(terrain)
  }

  /// Replace the height source. The terrain must be rebuilt afterwards.
  pub fn set_height_map(&mut self, height_map: H) -> Option<H> {
    self.quad_tree = None;
    self.height_map.replace(height_map)
  }

  /// Lay out and populate the quadtree from the current height source.
  pub fn build(&mut self) -> Result<()> {
    let height_map = self
      .height_map
      .as_ref()
      .ok_or(CdlodError::MissingHeightSource)?;
    let mut quad_tree = QuadTree::for_source(self.settings, height_map)?;
    quad_tree.build(height_map)?;
    self.quad_tree = Some(quad_tree);
    Ok(())
  }

  /// Select this frame's patches into `selection`, replacing its contents.
  ///
  /// The caller updates the selection's matrices and offset and calls
  /// [`Selection::prepare`] beforehand.
  #[tracing::instrument(skip_all, name = "terrain::select")]
  pub fn select(&self, selection: &mut Selection) -> Result<()> {
    let quad_tree = self.quad_tree.as_ref().ok_or(CdlodError::NotBuilt)?;
    selection.clear();
    quad_tree.select(selection)?;

    trace!(
      selected = selection.selected_node_count(),
      dropped = selection.dropped_node_count(),
      "terrain selected"
    );
    if selection.is_overflowed() {
      debug!(
        capacity = selection.max_selected_node_count(),
        dropped = selection.dropped_node_count(),
        "selection overflowed, raise the capacity or shorten visible ranges"
      );
    }
    Ok(())
  }

  #[inline]
  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn height_map(&self) -> Option<&H> {
    self.height_map.as_ref()
  }

  /// The built quadtree, if any.
  pub fn quad_tree(&self) -> Option<&QuadTree> {
    self.quad_tree.as_ref()
  }

  #[inline]
  pub fn is_built(&self) -> bool {
    self.quad_tree.is_some()
  }
}

impl<H: HeightSource + Sync> Terrain<H> {
  /// [`Terrain::build`] with top-level subtrees built in parallel.
  pub fn build_par(&mut self) -> Result<()> {
    let height_map = self
      .height_map
      .as_ref()
      .ok_or(CdlodError::MissingHeightSource)?;
    let mut quad_tree = QuadTree::for_source(self.settings, height_map)?;
    quad_tree.build_par(height_map)?;
    self.quad_tree = Some(quad_tree);
    Ok(())
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
