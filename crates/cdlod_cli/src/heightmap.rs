//! Height map sources for the tool: fractal noise or a grayscale image.

use anyhow::{Context, Result};
use cdlod::{HeightMap, HeightSource};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;
use tracing::info;

use crate::config::{HeightMapConfig, NoiseConfig};

/// Produce the configured height map.
pub fn load(config: &HeightMapConfig) -> Result<HeightMap> {
	match config {
		HeightMapConfig::Noise(noise) => generate(noise),
		HeightMapConfig::Image { path } => {
			let map = HeightMap::load(path)
				.with_context(|| format!("Failed to load height image: {}", path.display()))?;
			info!(
				path = %path.display(),
				width = map.width(),
				height = map.height(),
				"loaded height image"
			);
			Ok(map)
		}
	}
}

/// Fill a map with fBm Perlin noise, one row per rayon task.
pub fn generate(config: &NoiseConfig) -> Result<HeightMap> {
	let fbm = Fbm::<Perlin>::new(config.seed)
		.set_octaves(config.octaves)
		.set_frequency(config.frequency);

	let width = config.width;
	let samples: Vec<f32> = (0..config.height)
		.into_par_iter()
		.flat_map_iter(|y| {
			let fbm = &fbm;
			(0..width).map(move |x| fbm.get([x as f64, y as f64]) as f32)
		})
		.collect();

	info!(
		width = config.width,
		height = config.height,
		seed = config.seed,
		octaves = config.octaves,
		"generated noise height map"
	);
	HeightMap::new(config.width, config.height, samples).context("Noise sample count mismatch")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_is_deterministic() {
		let config = NoiseConfig {
			width: 33,
			height: 17,
			..NoiseConfig::default()
		};
		let a = generate(&config).unwrap();
		let b = generate(&config).unwrap();

		assert_eq!((a.width(), a.height()), (33, 17));
		assert_eq!(a, b);
		assert!(a.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
	}

	#[test]
	fn test_seed_changes_terrain() {
		let config = NoiseConfig {
			width: 65,
			height: 65,
			frequency: 0.05,
			..NoiseConfig::default()
		};
		let other = NoiseConfig { seed: 7, ..config };
		assert_ne!(generate(&config).unwrap(), generate(&other).unwrap());
	}
}
