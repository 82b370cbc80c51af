//! Cluster colouring.
//!
//! The palette is built once, after the graph document loads, and handed to
//! the canvas. Clusters get colours in the order they are first seen.

use std::collections::HashMap;

use crate::graph::GraphData;

/// d3 `schemeCategory10`.
pub const CATEGORY10: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Colour for edges that cross clusters.
pub const CROSS_CLUSTER_EDGE: &str = "#555555";

/// Colours assigned to cluster labels.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPalette {
	scheme: Vec<String>,
	assigned: HashMap<String, usize>,
}

impl Default for ClusterPalette {
	fn default() -> Self {
		Self::new(CATEGORY10)
	}
}

impl ClusterPalette {
	/// Palette over `scheme` with nothing assigned. An empty scheme colours
	/// everything black.
	pub fn new(scheme: &[&str]) -> Self {
		Self {
			scheme: scheme.iter().map(|c| c.to_string()).collect(),
			assigned: HashMap::new(),
		}
	}

	/// Category10 palette with every cluster in `data` already assigned.
	pub fn for_graph(data: &GraphData) -> Self {
		let mut palette = Self::default();
		for node in &data.nodes {
			palette.assign(&node.cluster);
		}
		palette
	}

	/// Give `cluster` the next colour if it has none yet.
	pub fn assign(&mut self, cluster: &str) -> &str {
		let next = self.assigned.len();
		let slot = *self.assigned.entry(cluster.to_string()).or_insert(next);
		self.slot_color(slot)
	}

	/// Colour of an assigned cluster; unassigned clusters get the first colour.
	pub fn color(&self, cluster: &str) -> &str {
		self.slot_color(self.assigned.get(cluster).copied().unwrap_or(0))
	}

	/// Stroke for an edge: the shared cluster colour, or the neutral
	/// [`CROSS_CLUSTER_EDGE`] when the endpoints differ.
	pub fn edge_color(&self, source_cluster: &str, target_cluster: &str) -> &str {
		if source_cluster == target_cluster {
			self.color(source_cluster)
		} else {
			CROSS_CLUSTER_EDGE
		}
	}

	/// Number of clusters assigned so far.
	pub fn len(&self) -> usize {
		self.assigned.len()
	}

	/// Whether no cluster has been assigned.
	pub fn is_empty(&self) -> bool {
		self.assigned.is_empty()
	}

	fn slot_color(&self, slot: usize) -> &str {
		if self.scheme.is_empty() {
			return "#000000";
		}
		&self.scheme[slot % self.scheme.len()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeRecord;

	#[test]
	fn assigns_in_first_encounter_order() {
		let data = GraphData {
			nodes: vec![
				NodeRecord::new("a", "beta"),
				NodeRecord::new("b", "alpha"),
				NodeRecord::new("c", "beta"),
			],
			..GraphData::default()
		};
		let palette = ClusterPalette::for_graph(&data);

		assert_eq!(palette.len(), 2);
		assert_eq!(palette.color("beta"), "#1f77b4");
		assert_eq!(palette.color("alpha"), "#ff7f0e");
	}

	#[test]
	fn cycles_past_the_scheme() {
		let mut palette = ClusterPalette::new(&["#111111", "#222222"]);
		assert_eq!(palette.assign("x"), "#111111");
		assert_eq!(palette.assign("y"), "#222222");
		assert_eq!(palette.assign("z"), "#111111");
		assert_eq!(palette.assign("y"), "#222222");
	}

	#[test]
	fn unknown_cluster_falls_back_to_first_colour() {
		let palette = ClusterPalette::default();
		assert_eq!(palette.color("nope"), CATEGORY10[0]);
	}

	#[test]
	fn edges_take_cluster_colour_only_within_a_cluster() {
		let mut palette = ClusterPalette::default();
		palette.assign("a");
		palette.assign("b");
		assert_eq!(palette.edge_color("b", "b"), CATEGORY10[1]);
		assert_eq!(palette.edge_color("a", "b"), CROSS_CLUSTER_EDGE);
	}

	#[test]
	fn empty_scheme_is_black() {
		let mut palette = ClusterPalette::new(&[]);
		assert_eq!(palette.assign("a"), "#000000");
	}
}
