//! CDLOD terrain selection tool.
//!
//! Builds the min/max quadtree for a height map, runs one frame of selection
//! from the configured camera and reports what was selected:
//! - patch counts per LOD level with each level's range and morph band
//! - overflow of the selection buffer
//! - optionally the per-instance vertex stream (`--dump`)

mod config;
mod heightmap;

use anyhow::Result;
use cdlod::metrics::SelectionMetrics;
use cdlod::{MorphConsts, Selection, Terrain};
use clap::{ArgAction, Parser};
use glam::{Mat4, Vec3};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use web_time::Instant;

use config::{CameraConfig, Config};

/// CDLOD quadtree build and selection report.
#[derive(Parser, Debug)]
#[command(name = "cdlod")]
#[command(about = "Builds a CDLOD terrain quadtree and reports one frame's selection")]
struct Args {
	/// Path to configuration TOML file (default: built-in defaults).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Print every selected patch's instance data.
	#[arg(long)]
	dump: bool,

	/// Build top-level subtrees in parallel.
	#[arg(short, long)]
	parallel: bool,

	/// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => {
			println!("Loading config from: {}", path.display());
			Config::load(path)?
		}
		None => Config::default(),
	};
	let settings = config.settings();

	let height_map = heightmap::load(&config.heightmap)?;
	let mut terrain = Terrain::with_height_map(settings, height_map)?;

	let start = Instant::now();
	if args.parallel {
		terrain.build_par()?;
	} else {
		terrain.build()?;
	}
	let build_ms = start.elapsed().as_secs_f64() * 1000.0;

	let tree = terrain
		.quad_tree()
		.ok_or_else(|| anyhow::anyhow!("terrain reported success but holds no quadtree"))?;
	let (width, height) = tree.dimensions();
	let (top_x, top_y) = tree.top_node_count();
	info!(width, height, nodes = tree.node_count(), build_ms, "quadtree ready");

	println!(
		"Height field {}x{}: {}x{} top nodes of size {}, {} nodes, built in {:.2} ms{}",
		width,
		height,
		top_x,
		top_y,
		settings.top_node_size(),
		tree.node_count(),
		build_ms,
		if args.parallel { " (parallel)" } else { "" }
	);
	if let Some((min, max)) = tree.height_range() {
		println!(
			"Height range: {:.2} .. {:.2} world units",
			min * settings.height_scale + config.terrain.offset[1],
			max * settings.height_scale + config.terrain.offset[1]
		);
	}

	let ranges = config.visible_ranges(&settings)?;
	let morph = MorphConsts::with_start_ratio(&ranges, config.lod.morph_start_ratio)?;
	let mut selection = Selection::with_capacity(settings, ranges, config.lod.max_selected_nodes)?;
	selection.terrain_offset = Vec3::from(config.terrain.offset);
	let (view, projection) = camera_matrices(&config.camera);
	selection.view = view;
	selection.projection = projection;
	selection.prepare();

	let mut metrics = SelectionMetrics::new();
	metrics.time_select(|| terrain.select(&mut selection))?;
	metrics.update_from_selection(&selection);

	report(&selection, &morph, &metrics);

	if args.dump {
		println!("\nInstances (offset_x, offset_z, scale, level):");
		for (index, instance) in selection.patch_instance_vertices().enumerate() {
			println!(
				"  {:5}: {:10.2} {:10.2} {:8.2} {}",
				index, instance.offset[0], instance.offset[1], instance.scale, instance.level
			);
		}
	}

	Ok(())
}

fn init_tracing(verbose: u8) {
	let default_level = match verbose {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn camera_matrices(camera: &CameraConfig) -> (Mat4, Mat4) {
	let eye = Vec3::from(camera.position);
	let target = Vec3::from(camera.target);
	let forward = (target - eye).normalize();
	// look_at degenerates when looking along the up axis
	let up = if forward.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };

	let view = Mat4::look_at_rh(eye, target, up);
	let projection = Mat4::perspective_rh(
		camera.fov_degrees.to_radians(),
		camera.aspect,
		camera.near,
		camera.far,
	);
	(view, projection)
}

fn report(selection: &Selection, morph: &MorphConsts, metrics: &SelectionMetrics) {
	let eye = selection.eye_position();
	println!(
		"\nSelected {} patches from eye ({:.1}, {:.1}, {:.1}) in {} us",
		selection.selected_node_count(),
		eye.x,
		eye.y,
		eye.z,
		metrics.last_select_us
	);

	println!("\n  level    size   patches      range   morph start .. end      consts");
	let settings = selection.settings();
	for level in (0..settings.level_count as usize).rev() {
		let range = selection.visible_ranges()[level];
		let (start, end) = morph.morph_range(level).unwrap_or((range, range));
		let consts = morph.get(level).unwrap_or_default();
		println!(
			"  {:5} {:7} {:9} {:10.1} {:10.1} .. {:<10.1} ({:.3}, {:.5})",
			level,
			settings.node_size(level as u32),
			metrics.nodes_per_level[level],
			range,
			start,
			end,
			consts.x,
			consts.y
		);
	}

	if selection.is_overflowed() {
		println!(
			"\nSelection overflowed: {} patches dropped past capacity {}",
			selection.dropped_node_count(),
			selection.max_selected_node_count()
		);
	}
}
