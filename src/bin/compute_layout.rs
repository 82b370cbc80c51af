//! Offline ForceAtlas2 layout for a graph document.
//!
//! Reads the JSON document, runs the layout engine and writes the document
//! back with `x`/`y` set on every node.

// Dependencies are used by the library crate.
#![allow(unused_crate_dependencies)]

use std::{fs, path::PathBuf, process, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, error, info};

use force_atlas_canvas::{GraphData, LayoutSettings, compute_layout};

/// Compute a ForceAtlas2 layout for a graph document
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to the input graph document (JSON)
	input: PathBuf,

	/// Where to write the laid-out document; stdout when omitted
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Layout settings file (TOML)
	#[arg(short, long)]
	settings: Option<PathBuf>,

	#[arg(long)]
	iterations: Option<u32>,

	#[arg(long)]
	gravity: Option<f64>,

	#[arg(long)]
	scaling_ratio: Option<f64>,

	#[arg(long)]
	slow_down: Option<f64>,

	#[arg(long)]
	seed: Option<u64>,

	/// Log level (off, error, warn, info, debug, trace)
	#[arg(long, default_value = "info")]
	log_level: String,
}

impl Args {
	fn layout_settings(&self) -> Result<LayoutSettings> {
		let mut settings = match &self.settings {
			Some(path) => {
				let source = fs::read_to_string(path)
					.with_context(|| format!("reading settings {}", path.display()))?;
				toml::from_str(&source)
					.with_context(|| format!("parsing settings {}", path.display()))?
			}
			None => LayoutSettings::default(),
		};

		if let Some(iterations) = self.iterations {
			settings.iterations = iterations;
		}
		if let Some(gravity) = self.gravity {
			settings.gravity = gravity;
		}
		if let Some(scaling_ratio) = self.scaling_ratio {
			settings.scaling_ratio = scaling_ratio;
		}
		if let Some(slow_down) = self.slow_down {
			settings.slow_down = slow_down;
		}
		if let Some(seed) = self.seed {
			settings.seed = seed;
		}
		Ok(settings)
	}
}

fn run(args: &Args) -> Result<()> {
	let settings = args.layout_settings()?;
	debug!(settings:?; "Resolved layout settings");

	let source = fs::read_to_string(&args.input)
		.with_context(|| format!("reading {}", args.input.display()))?;
	let mut data: GraphData = serde_json::from_str(&source)
		.with_context(|| format!("parsing {}", args.input.display()))?;
	info!(nodes = data.nodes.len(), edges = data.edges.len(); "Loaded graph");

	let positions = compute_layout(&data, &settings)?;
	let placed = data.apply_positions(&positions);
	info!(placed = placed, iterations = settings.iterations; "Layout complete");

	let rendered = serde_json::to_string_pretty(&data)?;
	match &args.output {
		Some(path) => {
			fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?
		}
		None => println!("{rendered}"),
	}
	Ok(())
}

fn main() {
	let args = Args::parse();

	let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
		eprintln!(
			"Invalid log level: {}. Using 'warn' instead.",
			args.log_level
		);
		LevelFilter::Warn
	});
	env_logger::Builder::from_env(env_logger::Env::default())
		.filter_level(log_level)
		.init();

	if let Err(err) = run(&args) {
		error!("{err:#}");
		process::exit(1);
	}
}
