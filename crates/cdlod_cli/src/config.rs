//! Configuration parsing for the terrain selection tool.

use anyhow::{Context, Result};
use cdlod::{MorphConsts, Settings, VisibleRanges};
use glam::Vec3;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub terrain: TerrainConfig,
	pub lod: LodConfig,
	pub heightmap: HeightMapConfig,
	pub camera: CameraConfig,
}

/// Quadtree layout and world mapping.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
	/// Side of a leaf node in samples (power of two).
	pub leaf_node_size: u32,
	/// Number of LOD levels.
	pub level_count: u32,
	/// World units per sample spacing.
	pub patch_scale: f32,
	/// World units per normalized height unit.
	pub height_scale: f32,
	/// World position of sample (0, 0) at height 0.
	pub offset: [f32; 3],
}

impl Default for TerrainConfig {
	fn default() -> Self {
		Self {
			leaf_node_size: Settings::DEFAULT_LEAF_NODE_SIZE,
			level_count: Settings::DEFAULT_LEVEL_COUNT,
			patch_scale: Settings::DEFAULT_PATCH_SCALE,
			height_scale: Settings::DEFAULT_HEIGHT_SCALE,
			offset: [0.0; 3],
		}
	}
}

/// Visibility ranges, morphing and selection capacity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LodConfig {
	pub finest_node_size: f32,
	pub detail_balance: f32,
	/// Explicit per-level ranges, overriding the two parameters above.
	pub ranges: Option<Vec<f32>>,
	pub morph_start_ratio: f32,
	pub max_selected_nodes: usize,
}

impl Default for LodConfig {
	fn default() -> Self {
		Self {
			finest_node_size: VisibleRanges::DEFAULT_FINEST_NODE_SIZE,
			detail_balance: VisibleRanges::DEFAULT_DETAIL_BALANCE,
			ranges: None,
			morph_start_ratio: MorphConsts::DEFAULT_START_RATIO,
			max_selected_nodes: cdlod::selection::DEFAULT_MAX_SELECTED_NODE_COUNT,
		}
	}
}

/// Where height samples come from.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum HeightMapConfig {
	/// Fractal Perlin noise.
	Noise(NoiseConfig),
	/// Grayscale image, relative paths resolve against the config file.
	Image { path: PathBuf },
}

impl Default for HeightMapConfig {
	fn default() -> Self {
		HeightMapConfig::Noise(NoiseConfig::default())
	}
}

/// Fractal noise height field.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
	pub width: u32,
	pub height: u32,
	pub seed: u32,
	pub octaves: usize,
	/// Feature frequency in cycles per sample.
	pub frequency: f64,
}

impl Default for NoiseConfig {
	fn default() -> Self {
		Self {
			width: 1025,
			height: 1025,
			seed: 42,
			octaves: 6,
			frequency: 0.004,
		}
	}
}

/// Perspective camera for the reported frame.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
	pub position: [f32; 3],
	pub target: [f32; 3],
	pub fov_degrees: f32,
	pub aspect: f32,
	pub near: f32,
	pub far: f32,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			position: [256.0, 150.0, 256.0],
			target: [1024.0, 0.0, 1024.0],
			fov_degrees: 60.0,
			aspect: 16.0 / 9.0,
			near: 0.5,
			far: 20_000.0,
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		let mut config: Config =
			toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;

		if let HeightMapConfig::Image { path: image_path } = &mut config.heightmap {
			if image_path.is_relative() {
				let base = path.parent().unwrap_or(Path::new("."));
				*image_path = base.join(&*image_path);
			}
		}

		config.validate()?;
		Ok(config)
	}

	/// Reject values the library would refuse, with config-level messages.
	pub fn validate(&self) -> Result<()> {
		self.settings()
			.validate()
			.context("Invalid [terrain] section")?;

		if self.lod.max_selected_nodes == 0 {
			anyhow::bail!("lod.max_selected_nodes must be > 0");
		}
		if let HeightMapConfig::Noise(noise) = &self.heightmap {
			if noise.width < 2 || noise.height < 2 {
				anyhow::bail!(
					"heightmap must be at least 2x2 samples, got {}x{}",
					noise.width,
					noise.height
				);
			}
			if noise.octaves == 0 {
				anyhow::bail!("heightmap.octaves must be > 0");
			}
		}

		let camera = &self.camera;
		if Vec3::from(camera.position) == Vec3::from(camera.target) {
			anyhow::bail!("camera.position and camera.target must differ");
		}
		if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
			anyhow::bail!("camera.fov_degrees must be within (0, 180), got {}", camera.fov_degrees);
		}
		if !(camera.near > 0.0 && camera.far > camera.near) {
			anyhow::bail!(
				"camera planes must satisfy 0 < near < far, got {} / {}",
				camera.near,
				camera.far
			);
		}
		if !(camera.aspect > 0.0) {
			anyhow::bail!("camera.aspect must be > 0, got {}", camera.aspect);
		}
		Ok(())
	}

	pub fn settings(&self) -> Settings {
		Settings {
			leaf_node_size: self.terrain.leaf_node_size,
			level_count: self.terrain.level_count,
			patch_scale: self.terrain.patch_scale,
			height_scale: self.terrain.height_scale,
		}
	}

	pub fn visible_ranges(&self, settings: &Settings) -> Result<VisibleRanges> {
		let ranges = match &self.lod.ranges {
			Some(ranges) => VisibleRanges::from_ranges(ranges.clone()),
			None => VisibleRanges::with_params(
				settings,
				self.lod.finest_node_size,
				self.lod.detail_balance,
			),
		};
		ranges.context("Invalid [lod] section")
	}
}
