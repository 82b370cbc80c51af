//! Graph document model and its validated, index-based form.
//!
//! [`GraphData`] mirrors the JSON document served to the viewer and consumed
//! by the offline layout tool. [`Graph`] is the checked view the layout engine
//! runs on: unique node ids, every edge endpoint resolved to an index.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A node as it appears in the graph document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
	/// Unique within the document.
	#[serde(deserialize_with = "label")]
	pub id: String,
	/// Categorical label, used for colouring only.
	#[serde(default, deserialize_with = "label")]
	pub cluster: String,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Free text shown in the detail panel.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Precomputed horizontal position, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Precomputed vertical position, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	/// Attributes the viewer does not interpret, kept for round trips.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl NodeRecord {
	/// A node with no name, description or position.
	pub fn new(id: impl Into<String>, cluster: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			cluster: cluster.into(),
			..Self::default()
		}
	}

	/// Document position, if both coordinates are present and finite.
	pub fn position(&self) -> Option<Position> {
		match (self.x, self.y) {
			(Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Position { x, y }),
			_ => None,
		}
	}
}

/// An edge as it appears in the graph document. Direction is ignored by the
/// layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
	/// Id of one endpoint.
	#[serde(deserialize_with = "label")]
	pub source: String,
	/// Id of the other endpoint.
	#[serde(deserialize_with = "label")]
	pub target: String,
	/// Uninterpreted attributes.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl EdgeRecord {
	/// An edge without extra attributes.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			extra: Map::new(),
		}
	}
}

/// The graph document: `{ "nodes": [...], "edges": [...] }`.
///
/// `links` is accepted in place of `edges`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in document order.
	#[serde(default)]
	pub nodes: Vec<NodeRecord>,
	/// Edges in document order.
	#[serde(default, alias = "links")]
	pub edges: Vec<EdgeRecord>,
	/// Top-level attributes the viewer does not interpret.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphData {
	/// Writes layout coordinates onto the matching nodes. Returns how many
	/// nodes were updated.
	pub fn apply_positions(&mut self, positions: &PositionMap) -> usize {
		let mut updated = 0;
		for node in &mut self.nodes {
			if let Some(p) = positions.get(&node.id) {
				node.x = Some(p.x);
				node.y = Some(p.y);
				updated += 1;
			}
		}
		updated
	}
}

/// Ids and cluster labels may be strings or numbers in the wild.
fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Label {
		Text(String),
		Number(serde_json::Number),
		Flag(bool),
	}

	Ok(match Option::<Label>::deserialize(deserializer)? {
		Some(Label::Text(s)) => s,
		Some(Label::Number(n)) => n.to_string(),
		Some(Label::Flag(b)) => b.to_string(),
		None => String::new(),
	})
}

/// A point in layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Euclidean distance.
	pub fn distance_to(&self, other: &Position) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// Final coordinates of one layout run, keyed by node id.
pub type PositionMap = BTreeMap<String, Position>;

/// Why a graph document cannot be laid out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
	/// Two nodes share an id.
	#[error("duplicate node id '{0}'")]
	DuplicateNode(String),

	/// An edge endpoint names no node.
	#[error("edge {edge} references unknown node '{id}'")]
	UnknownNode {
		/// Index of the edge in the document.
		edge: usize,
		/// The unresolved id.
		id: String,
	},
}

/// Validated graph: node ids are unique and every edge resolves.
///
/// Duplicate undirected edges are collapsed. Self-loops are kept; they count
/// towards degree twice, like any other edge endpoint pair.
#[derive(Debug)]
pub struct Graph<'a> {
	ids: Vec<&'a str>,
	initial: Vec<Option<Position>>,
	edges: Vec<(usize, usize)>,
	degrees: Vec<usize>,
}

impl<'a> Graph<'a> {
	/// Validate `data` and resolve edge endpoints to node indices.
	pub fn new(data: &'a GraphData) -> Result<Self, GraphError> {
		let mut index: HashMap<&str, usize> = HashMap::with_capacity(data.nodes.len());
		let mut ids = Vec::with_capacity(data.nodes.len());
		let mut initial = Vec::with_capacity(data.nodes.len());

		for node in &data.nodes {
			if index.insert(node.id.as_str(), ids.len()).is_some() {
				return Err(GraphError::DuplicateNode(node.id.clone()));
			}
			ids.push(node.id.as_str());
			initial.push(node.position());
		}

		let resolve = |edge: usize, id: &str| {
			index.get(id).copied().ok_or_else(|| GraphError::UnknownNode {
				edge,
				id: id.to_string(),
			})
		};

		let mut seen = HashSet::new();
		let mut edges = Vec::with_capacity(data.edges.len());
		let mut degrees = vec![0; ids.len()];
		for (i, edge) in data.edges.iter().enumerate() {
			let (s, t) = (resolve(i, &edge.source)?, resolve(i, &edge.target)?);
			if !seen.insert((s.min(t), s.max(t))) {
				continue;
			}
			degrees[s] += 1;
			degrees[t] += 1;
			edges.push((s, t));
		}

		Ok(Self {
			ids,
			initial,
			edges,
			degrees,
		})
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.ids.len()
	}

	/// Edges after duplicates are collapsed.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Node id at `idx`. Indices follow document order.
	pub fn id(&self, idx: usize) -> &'a str {
		self.ids[idx]
	}

	/// Edge endpoints at `idx`; a self-loop counts twice.
	pub fn degree(&self, idx: usize) -> usize {
		self.degrees[idx]
	}

	/// The node's document position, when it has a finite one.
	pub fn initial_position(&self, idx: usize) -> Option<Position> {
		self.initial[idx]
	}

	/// Resolved `(source, target)` index pairs.
	pub fn edges(&self) -> &[(usize, usize)] {
		&self.edges
	}
}
