use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::scale::fit_to_viewport;
use super::types::{Click, NodeDetails};
use crate::config::ViewerConfig;
use crate::graph::{GraphData, PositionMap};
use crate::palette::ClusterPalette;

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Screen pixels a press may travel and still count as a click.
pub const CLICK_SLOP: f64 = 4.0;
/// Seconds the camera takes to centre a clicked node.
pub const FOCUS_DURATION: f64 = 0.5;
/// Radius of the initial ring, and of the circle layouts are fitted into.
const LAYOUT_RADIUS: f64 = 100.0;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub cluster: String,
	pub label: Option<String>,
	pub description: Option<String>,
	pub color: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Camera move toward a clicked node. Zoom is left alone.
#[derive(Clone, Debug)]
pub struct FocusTween {
	from: (f64, f64),
	to: (f64, f64),
	elapsed: f64,
}

pub struct ForceGraphState {
	/// Edge payload is the stroke colour.
	pub graph: ForceGraph<NodeInfo, String>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub focus: Option<FocusTween>,
	pub width: f64,
	pub height: f64,
	pub background: String,
	pub animation_running: bool,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl ForceGraphState {
	pub fn new(
		data: &GraphData,
		palette: &ClusterPalette,
		config: &ViewerConfig,
		width: f64,
		height: f64,
	) -> Self {
		let mut graph = ForceGraph::new(config.simulation.parameters());
		let mut id_to_idx = HashMap::new();
		let mut edges = Vec::new();

		// Precomputed document positions are used only when every node has one.
		let placed: PositionMap = data
			.nodes
			.iter()
			.filter_map(|n| n.position().map(|p| (n.id.clone(), p)))
			.collect();
		let placed = if !data.nodes.is_empty() && placed.len() == data.nodes.len() {
			fit_to_viewport(&placed, LAYOUT_RADIUS)
		} else {
			HashMap::new()
		};

		for (i, node) in data.nodes.iter().enumerate() {
			if id_to_idx.contains_key(&node.id) {
				continue;
			}
			let (x, y) = placed.get(&node.id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
				(
					(LAYOUT_RADIUS * angle.cos()) as f32,
					(LAYOUT_RADIUS * angle.sin()) as f32,
				)
			});

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: config.simulation.node_mass,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					cluster: node.cluster.clone(),
					label: node.name.clone(),
					description: node.description.clone(),
					color: palette.color(&node.cluster).to_string(),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		let cluster_of: HashMap<&str, &str> = data
			.nodes
			.iter()
			.map(|n| (n.id.as_str(), n.cluster.as_str()))
			.collect();
		for link in &data.edges {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				let color = palette.edge_color(
					cluster_of.get(link.source.as_str()).copied().unwrap_or_default(),
					cluster_of.get(link.target.as_str()).copied().unwrap_or_default(),
				);
				graph.add_edge(
					src,
					tgt,
					EdgeData {
						user_data: color.to_string(),
					},
				);
				edges.push((src, tgt));
			}
		}

		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			focus: None,
			width,
			height,
			background: config.background.clone(),
			animation_running: true,
		}
	}

	/// Move every node named in `positions` to its fitted layout coordinate.
	/// The interactive simulation carries on from there.
	pub fn apply_positions(&mut self, positions: &PositionMap) -> usize {
		let fitted = fit_to_viewport(positions, LAYOUT_RADIUS);
		let mut applied = 0;
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(x, y)) = fitted.get(&node.data.user_data.id) {
				node.data.x = x;
				node.data.y = y;
				applied += 1;
			}
		});
		applied
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn details(&self, idx: DefaultNodeIdx) -> Option<NodeDetails> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				let info = &node.data.user_data;
				found = Some(NodeDetails {
					id: info.id.clone(),
					cluster: info.cluster.clone(),
					name: info.label.clone(),
					description: info.description.clone(),
				});
			}
		});
		found
	}

	/// Pointer down at screen `(x, y)`: grab a node or start panning.
	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			let (nx, ny) = self.node_position(idx).unwrap_or_default();
			self.drag = DragState {
				active: true,
				moved: false,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: nx as f32,
				node_start_y: ny as f32,
			};
		} else {
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer moved to screen `(x, y)`.
	pub fn move_pointer(&mut self, x: f64, y: f64) {
		// Update hover state when not dragging
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			let travelled = (x - self.drag.start_x).hypot(y - self.drag.start_y);
			self.drag.moved |= travelled > CLICK_SLOP;
			if !self.drag.moved {
				return;
			}
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if self.pan.active {
			let travelled = (x - self.pan.start_x).hypot(y - self.pan.start_y);
			self.pan.moved |= travelled > CLICK_SLOP;
			if self.pan.moved {
				self.focus = None;
				self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
				self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
			}
		}
	}

	/// Pointer up. A press that never moved is reported as a click.
	pub fn release(&mut self) -> Option<Click> {
		let click = if self.drag.active && !self.drag.moved {
			self.drag.node_idx.map(Click::Node)
		} else if self.pan.active && !self.pan.moved {
			Some(Click::Background)
		} else {
			None
		};
		self.drag = DragState::default();
		self.pan = PanState::default();
		click
	}

	/// Pointer left the canvas: drop any gesture in progress.
	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.set_hover(None);
	}

	/// Zoom around screen `(x, y)`; positive `delta_y` zooms out.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.focus = None;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Start panning the camera so `idx` ends up centred on screen.
	pub fn focus_on(&mut self, idx: DefaultNodeIdx) {
		let Some((x, y)) = self.node_position(idx) else {
			return;
		};
		self.focus = Some(FocusTween {
			from: (self.transform.x, self.transform.y),
			to: (
				self.width / 2.0 - x * self.transform.k,
				self.height / 2.0 - y * self.transform.k,
			),
			elapsed: 0.0,
		});
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.tick_focus(dt as f64);

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	fn tick_focus(&mut self, dt: f64) {
		let Some(focus) = self.focus.as_mut() else {
			return;
		};
		focus.elapsed = (focus.elapsed + dt).min(FOCUS_DURATION);
		let t = ease_out_cubic(focus.elapsed / FOCUS_DURATION);
		self.transform.x = focus.from.0 + (focus.to.0 - focus.from.0) * t;
		self.transform.y = focus.from.1 + (focus.to.1 - focus.from.1) * t;
		if focus.elapsed >= FOCUS_DURATION {
			self.focus = None;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeRecord, NodeRecord, Position};

	fn sample() -> GraphData {
		let mut a = NodeRecord::new("a", "red");
		a.name = Some("Alpha".into());
		a.description = Some("first".into());
		GraphData {
			nodes: vec![a, NodeRecord::new("b", "blue"), NodeRecord::new("c", "red")],
			edges: vec![EdgeRecord::new("a", "b"), EdgeRecord::new("a", "ghost")],
			..GraphData::default()
		}
	}

	fn state() -> ForceGraphState {
		let data = sample();
		ForceGraphState::new(
			&data,
			&ClusterPalette::for_graph(&data),
			&ViewerConfig::default(),
			800.0,
			600.0,
		)
	}

	fn idx_of(s: &ForceGraphState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		s.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some(node.index());
			}
		});
		found.unwrap()
	}

	fn screen_of(s: &ForceGraphState, idx: DefaultNodeIdx) -> (f64, f64) {
		let (x, y) = s.node_position(idx).unwrap();
		(
			x * s.transform.k + s.transform.x,
			y * s.transform.k + s.transform.y,
		)
	}

	#[test]
	fn colours_nodes_by_cluster_and_skips_dangling_edges() {
		let s = state();
		let mut colors = HashMap::new();
		s.graph.visit_nodes(|node| {
			colors.insert(
				node.data.user_data.id.clone(),
				node.data.user_data.color.clone(),
			);
		});
		assert_eq!(colors["a"], colors["c"]);
		assert_ne!(colors["a"], colors["b"]);
		assert_eq!(s.edges.len(), 1);

		let mut strokes = Vec::new();
		s.graph.visit_edges(|_, _, edge| strokes.push(edge.user_data.clone()));
		assert_eq!(strokes, [crate::palette::CROSS_CLUSTER_EDGE]);
	}

	#[test]
	fn paints_the_configured_background() {
		let data = sample();
		let config = ViewerConfig {
			background: "#000010".into(),
			..ViewerConfig::default()
		};
		let s = ForceGraphState::new(&data, &ClusterPalette::default(), &config, 800.0, 600.0);
		assert_eq!(s.background, "#000010");
	}

	#[test]
	fn seeds_positions_from_layout() {
		let mut s = state();
		let positions = PositionMap::from([
			("a".to_string(), Position { x: -1.0, y: 0.0 }),
			("b".to_string(), Position { x: 1.0, y: 0.0 }),
		]);
		assert_eq!(s.apply_positions(&positions), 2);
		assert_eq!(s.node_position(idx_of(&s, "a")), Some((-100.0, 0.0)));
		assert_eq!(s.node_position(idx_of(&s, "b")), Some((100.0, 0.0)));
	}

	#[test]
	fn uses_document_positions_when_complete() {
		let mut data = sample();
		for (node, x) in data.nodes.iter_mut().zip([0.0, 2.0, 4.0]) {
			node.x = Some(x);
			node.y = Some(0.0);
		}
		let s = ForceGraphState::new(
			&data,
			&ClusterPalette::default(),
			&ViewerConfig::default(),
			800.0,
			600.0,
		);
		assert_eq!(s.node_position(idx_of(&s, "c")), Some((100.0, 0.0)));
	}

	#[test]
	fn still_press_on_node_is_a_click() {
		let mut s = state();
		let a = idx_of(&s, "a");
		let (x, y) = screen_of(&s, a);

		s.press(x, y);
		s.move_pointer(x + 1.0, y);
		assert_eq!(s.release(), Some(Click::Node(a)));

		let details = s.details(a).unwrap();
		assert_eq!(details.title(), "Alpha");
		assert_eq!(details.description.as_deref(), Some("first"));
	}

	#[test]
	fn dragging_a_node_is_not_a_click() {
		let mut s = state();
		let a = idx_of(&s, "a");
		let (x, y) = screen_of(&s, a);

		s.press(x, y);
		s.move_pointer(x + 30.0, y);
		assert_eq!(s.release(), None);
		let (nx, _) = s.node_position(a).unwrap();
		assert_eq!(nx, x + 30.0 - s.transform.x);
	}

	#[test]
	fn still_press_on_empty_space_is_a_background_click() {
		let mut s = state();
		s.press(1.0, 1.0);
		assert_eq!(s.release(), Some(Click::Background));

		s.press(1.0, 1.0);
		s.move_pointer(50.0, 1.0);
		assert_eq!(s.release(), None);
		assert_eq!(s.transform.x, 400.0 + 49.0);
	}

	#[test]
	fn focus_centres_node_without_zooming() {
		let mut s = state();
		s.zoom(0.0, 0.0, -1.0);
		let k = s.transform.k;
		let b = idx_of(&s, "b");
		s.animation_running = false;

		s.focus_on(b);
		for _ in 0..40 {
			s.tick(0.016);
		}

		assert!(s.focus.is_none());
		assert_eq!(s.transform.k, k);
		let (sx, sy) = screen_of(&s, b);
		assert!((sx - 400.0).abs() < 1e-6 && (sy - 300.0).abs() < 1e-6, "{sx},{sy}");
	}
}
