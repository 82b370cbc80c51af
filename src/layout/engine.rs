//! ForceAtlas2 iteration.
//!
//! Each step accumulates three forces per node (pairwise repulsion, linear
//! attraction along edges, gravity toward the centroid) and then moves every
//! node using the adaptive global speed from Jacomy et al., damped per node by
//! its own swinging and divided by `slow_down`.

use std::f64::consts::TAU;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{CancelToken, LayoutError, LayoutSettings};
use crate::graph::{Graph, GraphData, Position, PositionMap};

/// Closer than this, repulsion uses the floor instead of the real distance.
const MIN_DISTANCE: f64 = 0.01;
/// Half-width of the random start square, per `sqrt(node count)`.
const INITIAL_SPREAD: f64 = 10.0;
/// Document positions beyond this are scaled down uniformly so force sums
/// stay finite.
const MAX_START_EXTENT: f64 = 1e6;
const JITTER_TOLERANCE: f64 = 1.0;
const MAX_JITTER: f64 = 10.0;
const MIN_SPEED_EFFICIENCY: f64 = 0.05;
const MAX_SPEED: f64 = 1000.0;
const MAX_RISE: f64 = 0.5;

/// Run a full layout on `data`.
///
/// Returns one position per node. Fails with [`LayoutError::InvalidSettings`]
/// before touching the graph, then with [`LayoutError::InvalidGraph`] if an
/// edge names an unknown node.
pub fn compute_layout(
	data: &GraphData,
	settings: &LayoutSettings,
) -> Result<PositionMap, LayoutError> {
	compute_layout_with_cancel(data, settings, &CancelToken::new())
}

/// Same as [`compute_layout`], checking `cancel` before every iteration.
pub fn compute_layout_with_cancel(
	data: &GraphData,
	settings: &LayoutSettings,
	cancel: &CancelToken,
) -> Result<PositionMap, LayoutError> {
	settings.validate()?;
	let graph = Graph::new(data)?;

	debug!(
		nodes = graph.node_count(),
		edges = graph.edge_count(),
		iterations = settings.iterations;
		"Running layout"
	);

	let mut sim = Simulation::new(&graph, settings);
	for iteration in 0..settings.iterations {
		if cancel.is_cancelled() {
			debug!(iteration = iteration; "Layout cancelled");
			return Err(LayoutError::Cancelled { iteration });
		}
		sim.step();
	}

	Ok(sim.positions(&graph))
}

#[derive(Clone, Debug, Default)]
struct Body {
	x: f64,
	y: f64,
	dx: f64,
	dy: f64,
	old_dx: f64,
	old_dy: f64,
	mass: f64,
}

impl Body {
	fn swinging(&self) -> f64 {
		self.mass * (self.old_dx - self.dx).hypot(self.old_dy - self.dy)
	}

	fn traction(&self) -> f64 {
		self.mass * 0.5 * (self.old_dx + self.dx).hypot(self.old_dy + self.dy)
	}
}

struct Simulation<'g> {
	bodies: Vec<Body>,
	edges: &'g [(usize, usize)],
	gravity: f64,
	scaling_ratio: f64,
	slow_down: f64,
	speed: f64,
	speed_efficiency: f64,
	rng: SmallRng,
}

impl<'g> Simulation<'g> {
	fn new(graph: &'g Graph<'_>, settings: &LayoutSettings) -> Self {
		let mut rng = SmallRng::seed_from_u64(settings.seed);
		let n = graph.node_count();
		let spread = INITIAL_SPREAD * (n as f64).sqrt().max(1.0);

		let documented: Vec<Option<Position>> =
			(0..n).map(|i| graph.initial_position(i)).collect();
		let extent = documented
			.iter()
			.flatten()
			.fold(0.0_f64, |m, p| m.max(p.x.abs()).max(p.y.abs()));
		let shrink = if extent > MAX_START_EXTENT {
			MAX_START_EXTENT / extent
		} else {
			1.0
		};

		let bodies = documented
			.into_iter()
			.enumerate()
			.map(|(i, start)| {
				let start = match start {
					Some(p) => Position {
						x: p.x * shrink,
						y: p.y * shrink,
					},
					None => Position {
						x: rng.gen_range(-1.0..1.0) * spread,
						y: rng.gen_range(-1.0..1.0) * spread,
					},
				};
				Body {
					x: start.x,
					y: start.y,
					mass: 1.0 + graph.degree(i) as f64,
					..Body::default()
				}
			})
			.collect();

		Self {
			bodies,
			edges: graph.edges(),
			gravity: settings.gravity,
			scaling_ratio: settings.scaling_ratio,
			slow_down: settings.slow_down,
			speed: 1.0,
			speed_efficiency: 1.0,
			rng,
		}
	}

	fn step(&mut self) {
		for b in &mut self.bodies {
			b.old_dx = b.dx;
			b.old_dy = b.dy;
			b.dx = 0.0;
			b.dy = 0.0;
		}
		self.repulsion();
		self.attraction();
		self.gravity();
		self.apply_forces();
	}

	fn repulsion(&mut self) {
		let bodies = &mut self.bodies;
		for i in 0..bodies.len() {
			for j in (i + 1)..bodies.len() {
				let (mut dx, mut dy) = (bodies[i].x - bodies[j].x, bodies[i].y - bodies[j].y);
				let mut dist2 = dx * dx + dy * dy;
				if dist2 == 0.0 {
					let angle = self.rng.gen_range(0.0..TAU);
					(dx, dy) = (MIN_DISTANCE * angle.cos(), MIN_DISTANCE * angle.sin());
				}
				dist2 = dist2.max(MIN_DISTANCE * MIN_DISTANCE);

				let factor = self.scaling_ratio * bodies[i].mass * bodies[j].mass / dist2;
				bodies[i].dx += dx * factor;
				bodies[i].dy += dy * factor;
				bodies[j].dx -= dx * factor;
				bodies[j].dy -= dy * factor;
			}
		}
	}

	fn attraction(&mut self) {
		for &(s, t) in self.edges {
			if s == t {
				continue;
			}
			let (dx, dy) = (
				self.bodies[s].x - self.bodies[t].x,
				self.bodies[s].y - self.bodies[t].y,
			);
			self.bodies[s].dx -= dx;
			self.bodies[s].dy -= dy;
			self.bodies[t].dx += dx;
			self.bodies[t].dy += dy;
		}
	}

	fn gravity(&mut self) {
		if self.gravity == 0.0 || self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (cx, cy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(x, y), b| (x + b.x, y + b.y));
		let (cx, cy) = (cx / n, cy / n);

		for b in &mut self.bodies {
			let factor = self.gravity * b.mass;
			b.dx += (cx - b.x) * factor;
			b.dy += (cy - b.y) * factor;
		}
	}

	fn apply_forces(&mut self) {
		let (swinging, traction) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(s, t), b| (s + b.swinging(), t + b.traction()));
		self.adjust_speed(swinging, traction);

		for b in &mut self.bodies {
			let factor = self.speed / (1.0 + (self.speed * b.swinging()).sqrt()) / self.slow_down;
			b.x += b.dx * factor;
			b.y += b.dy * factor;
		}
	}

	fn adjust_speed(&mut self, swinging: f64, traction: f64) {
		if swinging <= 0.0 || traction <= 0.0 {
			return;
		}
		let n = self.bodies.len() as f64;
		let estimated_jitter = 0.05 * n.sqrt();
		let min_jitter = estimated_jitter.sqrt();
		let mut jitter = JITTER_TOLERANCE
			* min_jitter.max(MAX_JITTER.min(estimated_jitter * traction / (n * n)));

		if swinging / traction > 2.0 {
			if self.speed_efficiency > MIN_SPEED_EFFICIENCY {
				self.speed_efficiency *= 0.5;
			}
			jitter = jitter.max(JITTER_TOLERANCE);
		}

		let target = jitter * self.speed_efficiency * traction / swinging;

		if swinging > jitter * traction {
			if self.speed_efficiency > MIN_SPEED_EFFICIENCY {
				self.speed_efficiency *= 0.7;
			}
		} else if self.speed < MAX_SPEED {
			self.speed_efficiency *= 1.3;
		}

		self.speed += (target - self.speed).min(MAX_RISE * self.speed);
		self.speed = self.speed.min(MAX_SPEED);
	}

	fn positions(&self, graph: &Graph<'_>) -> PositionMap {
		self.bodies
			.iter()
			.enumerate()
			.map(|(i, b)| (graph.id(i).to_string(), Position { x: b.x, y: b.y }))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeRecord, GraphError, NodeRecord};

	fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes.iter().map(|id| NodeRecord::new(*id, "")).collect(),
			edges: edges
				.iter()
				.map(|(s, t)| EdgeRecord::new(*s, *t))
				.collect(),
			..GraphData::default()
		}
	}

	fn placed(mut data: GraphData, at: &[(f64, f64)]) -> GraphData {
		for (node, &(x, y)) in data.nodes.iter_mut().zip(at) {
			node.x = Some(x);
			node.y = Some(y);
		}
		data
	}

	fn mean_distance_to_centroid(positions: &PositionMap) -> f64 {
		let n = positions.len() as f64;
		let centroid = Position {
			x: positions.values().map(|p| p.x).sum::<f64>() / n,
			y: positions.values().map(|p| p.y).sum::<f64>() / n,
		};
		positions.values().map(|p| p.distance_to(&centroid)).sum::<f64>() / n
	}

	fn mean_pair_distance(positions: &PositionMap, a: &[&str], b: &[&str]) -> f64 {
		let mut total = 0.0;
		let mut count = 0;
		for (i, x) in a.iter().enumerate() {
			for (j, y) in b.iter().enumerate() {
				if a == b && j <= i {
					continue;
				}
				total += positions[*x].distance_to(&positions[*y]);
				count += 1;
			}
		}
		total / count as f64
	}

	#[test]
	fn covers_exactly_the_node_ids() {
		let data = graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "a")]);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();
		assert_eq!(
			positions.keys().map(String::as_str).collect::<Vec<_>>(),
			vec!["a", "b", "c", "d"]
		);
	}

	#[test]
	fn empty_graph_gives_empty_map() {
		let positions = compute_layout(&GraphData::default(), &LayoutSettings::default()).unwrap();
		assert!(positions.is_empty());
	}

	#[test]
	fn coincident_and_isolated_nodes_stay_finite() {
		let data = placed(
			graph(&["a", "b", "c", "lonely"], &[("a", "b")]),
			&[(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
		);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();

		for p in positions.values() {
			assert!(p.x.is_finite() && p.y.is_finite(), "{p:?}");
		}
		assert!(positions["a"].distance_to(&positions["b"]) > 0.0);
		assert!(positions["a"].distance_to(&positions["c"]) > 0.0);
	}

	#[test]
	fn extreme_document_coordinates_stay_finite() {
		let data = placed(
			graph(&["a", "b", "c"], &[("a", "b")]),
			&[(1e308, 0.0), (-1e308, 0.0), (0.0, f64::MAX)],
		);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();

		for p in positions.values() {
			assert!(p.x.is_finite() && p.y.is_finite(), "{p:?}");
		}
		assert!(positions["a"].distance_to(&positions["b"]) > 0.0);
	}

	#[test]
	fn single_node_does_not_move() {
		let data = placed(graph(&["a"], &[]), &[(3.0, -4.0)]);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();
		assert_eq!(positions["a"], Position { x: 3.0, y: -4.0 });
	}

	#[test]
	fn same_seed_same_layout() {
		let data = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
		let settings = LayoutSettings {
			seed: 7,
			..LayoutSettings::default()
		};
		assert_eq!(
			compute_layout(&data, &settings).unwrap(),
			compute_layout(&data, &settings).unwrap()
		);
	}

	#[test]
	fn zero_iterations_are_rejected() {
		let data = graph(&["a", "b"], &[("a", "b")]);
		let settings = LayoutSettings {
			iterations: 0,
			..LayoutSettings::default()
		};
		assert_eq!(
			compute_layout(&data, &settings).unwrap_err(),
			LayoutError::InvalidSettings {
				field: "iterations",
				reason: "must be at least 1",
			}
		);
	}

	#[test]
	fn unknown_endpoint_is_invalid_graph() {
		let data = graph(&["a", "b"], &[("a", "x")]);
		assert_eq!(
			compute_layout(&data, &LayoutSettings::default()).unwrap_err(),
			LayoutError::InvalidGraph(GraphError::UnknownNode {
				edge: 0,
				id: "x".into()
			})
		);
	}

	#[test]
	fn cancelled_token_stops_before_first_iteration() {
		let data = graph(&["a", "b"], &[("a", "b")]);
		let cancel = CancelToken::new();
		cancel.cancel();
		assert_eq!(
			compute_layout_with_cancel(&data, &LayoutSettings::default(), &cancel).unwrap_err(),
			LayoutError::Cancelled { iteration: 0 }
		);
	}

	#[test]
	fn path_is_stretched_not_collapsed() {
		let data = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();

		let ab = positions["A"].distance_to(&positions["B"]);
		let bc = positions["B"].distance_to(&positions["C"]);
		let ac = positions["A"].distance_to(&positions["C"]);

		assert!(ab > 0.0 && bc > 0.0);
		assert!(ab / bc < 10.0 && bc / ab < 10.0, "ab={ab} bc={bc}");
		assert!(ac > ab && ac > bc, "ab={ab} bc={bc} ac={ac}");
	}

	#[test]
	fn unconnected_pair_is_pushed_apart_and_held_by_gravity() {
		let data = placed(graph(&["A", "B"], &[]), &[(-0.01, 0.0), (0.01, 0.0)]);
		let positions = compute_layout(&data, &LayoutSettings::default()).unwrap();

		let distance = positions["A"].distance_to(&positions["B"]);
		assert!(distance > 0.2, "distance={distance}");
		assert!(distance < 50.0, "distance={distance}");
	}

	#[test]
	fn stronger_gravity_pulls_nodes_closer() {
		let ring = graph(
			&["a", "b", "c", "d", "e", "f"],
			&[
				("a", "b"),
				("b", "c"),
				("c", "d"),
				("d", "e"),
				("e", "f"),
				("f", "a"),
			],
		);

		let spread = |gravity: f64| {
			(1..=4)
				.map(|seed| {
					let settings = LayoutSettings {
						gravity,
						seed,
						iterations: 200,
						..LayoutSettings::default()
					};
					mean_distance_to_centroid(&compute_layout(&ring, &settings).unwrap())
				})
				.sum::<f64>()
				/ 4.0
		};

		let (weak, strong) = (spread(0.25), spread(4.0));
		assert!(strong < weak, "weak={weak} strong={strong}");
	}

	#[test]
	fn disconnected_components_separate() {
		let data = graph(
			&["a1", "a2", "a3", "b1", "b2", "b3"],
			&[
				("a1", "a2"),
				("a2", "a3"),
				("a3", "a1"),
				("b1", "b2"),
				("b2", "b3"),
				("b3", "b1"),
			],
		);
		let (left, right) = (["a1", "a2", "a3"], ["b1", "b2", "b3"]);

		let mut inter = 0.0;
		let mut intra = 0.0;
		for seed in 1..=3 {
			let settings = LayoutSettings {
				seed,
				iterations: 300,
				..LayoutSettings::default()
			};
			let positions = compute_layout(&data, &settings).unwrap();
			inter += mean_pair_distance(&positions, &left, &right);
			intra += (mean_pair_distance(&positions, &left, &left)
				+ mean_pair_distance(&positions, &right, &right))
				/ 2.0;
		}

		assert!(inter > intra, "inter={inter} intra={intra}");
	}
}
