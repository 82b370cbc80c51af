//! Viewer configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config. The
//! app provides the resolved [`ViewerConfig`] through Leptos context.

use force_graph::SimulationParameters;
use serde::Deserialize;

use crate::layout::LayoutSettings;

/// Everything the viewer can be told by the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewerConfig {
	/// Where the graph document is fetched from at startup.
	#[serde(default = "default_data_url")]
	pub data_url: String,

	/// Background layout worker.
	#[serde(default)]
	pub worker: WorkerConfig,

	/// Settings sent with the startup layout request.
	#[serde(default)]
	pub layout: LayoutSettings,

	/// Interactive canvas forces.
	#[serde(default)]
	pub simulation: SimulationConfig,

	/// Canvas fill colour.
	#[serde(default = "default_background")]
	pub background: String,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			data_url: default_data_url(),
			worker: WorkerConfig::default(),
			layout: LayoutSettings::default(),
			simulation: SimulationConfig::default(),
			background: default_background(),
		}
	}
}

/// Id of the optional `<script type="application/json">` holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

impl ViewerConfig {
	/// Parse a JSON override document. Missing fields take their defaults.
	pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(source)
	}

	/// Read overrides embedded in the page, falling back to defaults when the
	/// element is missing or malformed.
	pub fn from_page() -> Self {
		let source = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|e| e.text_content());

		match source {
			Some(source) => Self::from_json(&source).unwrap_or_else(|err| {
				log::warn!("Ignoring malformed viewer config: {err}");
				Self::default()
			}),
			None => Self::default(),
		}
	}
}

fn default_data_url() -> String {
	"/data/graph.json".to_string()
}

fn default_background() -> String {
	"#1a1a2e".to_string()
}

/// Where the layout worker comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerConfig {
	/// Script the browser loads into the layout Web Worker.
	#[serde(default = "default_script_url")]
	pub script_url: String,
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			script_url: default_script_url(),
		}
	}
}

fn default_script_url() -> String {
	"./layout_worker_loader.js".to_string()
}

/// Parameters of the interactive canvas simulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Node repulsion.
	pub force_charge: f32,
	/// Edge spring stiffness.
	pub force_spring: f32,
	/// Cap on the force applied to one node per tick.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Fraction of velocity kept between ticks.
	pub damping_factor: f32,
	/// Mass given to every node.
	pub node_mass: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
		}
	}
}

impl SimulationConfig {
	/// The `force_graph` parameters for these settings.
	pub fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
