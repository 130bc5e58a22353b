//! cdlod - Framework/engine independent CDLOD terrain selection
//!
//! This crate implements the quadtree half of Continuous Distance-Dependent
//! Level of Detail terrain rendering. A height field is covered by a grid of
//! quadtrees whose nodes carry min/max height bounds. Every frame the trees
//! are walked against the camera frustum and a set of per-level visibility
//! spheres, producing a flat list of patches ready for instanced drawing.
//!
//! # Features
//!
//! - **Arena quadtree**: nodes live in a flat array, children are indices
//! - **Crack-free selection**: once any child of a node is needed, all of its
//!   children are selected, so neighbouring patches never leave T-junctions
//! - **Morph constants**: per-level coefficients for shader-side vertex
//!   morphing across LOD transitions
//! - **Fixed-capacity selection**: no per-frame allocation, overflow counted
//!
//! # Example
//!
//! ```ignore
//! use cdlod::{HeightMap, Selection, Settings, Terrain, VisibleRanges};
//! use glam::{Mat4, Vec3};
//!
//! let settings = Settings::default();
//! let height_map = HeightMap::from_fn(257, 257, |x, y| ((x + y) as f32 * 0.01).sin());
//!
//! let mut terrain = Terrain::with_height_map(settings, height_map)?;
//! terrain.build()?;
//!
//! let ranges = VisibleRanges::new(&settings)?;
//! let mut selection = Selection::new(settings, ranges)?;
//! selection.view = Mat4::look_at_rh(Vec3::new(0.0, 100.0, 0.0), Vec3::new(256.0, 0.0, 256.0), Vec3::Y);
//! selection.projection = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 5000.0);
//! selection.prepare();
//!
//! terrain.select(&mut selection)?;
//! for instance in selection.patch_instance_vertices() {
//!   // upload instance data...
//! }
//! ```

pub mod bounds;
pub mod error;
pub mod frustum;
pub mod height;
pub mod metrics;
pub mod node;
pub mod quadtree;
pub mod ranges;
pub mod selection;
pub mod settings;
pub mod terrain;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used items
pub use bounds::{Aabb, BoundingSphere, Containment};
pub use error::{CdlodError, Result};
pub use frustum::{Frustum, Plane};
pub use height::{HeightMap, HeightSource};
pub use node::Node;
pub use quadtree::QuadTree;
pub use ranges::{MorphConsts, VisibleRanges};
pub use selection::{PatchInstanceVertex, SelectedNode, Selection};
pub use settings::Settings;
pub use terrain::Terrain;
