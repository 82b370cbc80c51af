//! Mapping layout coordinates into canvas world space.

use std::collections::HashMap;

use crate::graph::PositionMap;

/// Centre `positions` on the origin and scale them uniformly so the farthest
/// coordinate along either axis lands at `radius`.
pub fn fit_to_viewport(positions: &PositionMap, radius: f64) -> HashMap<String, (f32, f32)> {
	let finite = || positions.values().filter(|p| p.x.is_finite() && p.y.is_finite());
	let Some(first) = finite().next() else {
		return HashMap::new();
	};

	let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
	for p in finite() {
		min_x = min_x.min(p.x);
		max_x = max_x.max(p.x);
		min_y = min_y.min(p.y);
		max_y = max_y.max(p.y);
	}

	let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
	let half_extent = ((max_x - min_x).max(max_y - min_y)) / 2.0;
	let k = if half_extent > 0.0 { radius / half_extent } else { 1.0 };

	positions
		.iter()
		.filter(|(_, p)| p.x.is_finite() && p.y.is_finite())
		.map(|(id, p)| (id.clone(), (((p.x - cx) * k) as f32, ((p.y - cy) * k) as f32)))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Position;

	fn map(points: &[(&str, f64, f64)]) -> PositionMap {
		points
			.iter()
			.map(|(id, x, y)| (id.to_string(), Position { x: *x, y: *y }))
			.collect()
	}

	#[test]
	fn centres_and_scales_uniformly() {
		let fitted = fit_to_viewport(&map(&[("a", 10.0, 10.0), ("b", 14.0, 12.0)]), 100.0);
		assert_eq!(fitted["a"], (-100.0, -50.0));
		assert_eq!(fitted["b"], (100.0, 50.0));
	}

	#[test]
	fn single_point_sits_at_origin() {
		let fitted = fit_to_viewport(&map(&[("a", 3.0, -7.0)]), 100.0);
		assert_eq!(fitted["a"], (0.0, 0.0));
	}

	#[test]
	fn skips_non_finite_points() {
		let fitted = fit_to_viewport(&map(&[("a", 0.0, 0.0), ("b", f64::NAN, 1.0)]), 50.0);
		assert_eq!(fitted.len(), 1);
		assert!(fit_to_viewport(&PositionMap::new(), 50.0).is_empty());
	}
}
