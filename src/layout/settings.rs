use serde::{Deserialize, Serialize};

use super::LayoutError;

/// Tunables for one layout run.
///
/// Field names follow the JSON worker protocol (`scalingRatio`, `slowDown`);
/// snake_case spellings are accepted for TOML settings files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
	/// Pull toward the centroid. Zero disables gravity.
	#[serde(default = "default_gravity")]
	pub gravity: f64,

	/// Multiplier on pairwise repulsion.
	#[serde(default = "default_scaling_ratio", alias = "scaling_ratio")]
	pub scaling_ratio: f64,

	/// Divides every displacement; higher is slower.
	#[serde(default = "default_slow_down", alias = "slow_down")]
	pub slow_down: f64,

	/// Number of steps to run, at least 1.
	#[serde(default = "default_iterations")]
	pub iterations: u32,

	/// Seed for initial placement and coincident-node jitter.
	#[serde(default = "default_seed")]
	pub seed: u64,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			gravity: default_gravity(),
			scaling_ratio: default_scaling_ratio(),
			slow_down: default_slow_down(),
			iterations: default_iterations(),
			seed: default_seed(),
		}
	}
}

fn default_gravity() -> f64 {
	1.0
}

fn default_scaling_ratio() -> f64 {
	2.0
}

fn default_slow_down() -> f64 {
	1.0
}

fn default_iterations() -> u32 {
	100
}

fn default_seed() -> u64 {
	42
}

impl LayoutSettings {
	/// Check every field against its allowed range.
	pub fn validate(&self) -> Result<(), LayoutError> {
		let invalid = |field, reason| Err(LayoutError::InvalidSettings { field, reason });

		if !self.gravity.is_finite() || self.gravity < 0.0 {
			return invalid("gravity", "must be a finite number >= 0");
		}
		if !self.scaling_ratio.is_finite() || self.scaling_ratio <= 0.0 {
			return invalid("scalingRatio", "must be a finite number > 0");
		}
		if !self.slow_down.is_finite() || self.slow_down <= 0.0 {
			return invalid("slowDown", "must be a finite number > 0");
		}
		if self.iterations == 0 {
			return invalid("iterations", "must be at least 1");
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let settings = LayoutSettings::default();
		assert_eq!(settings.gravity, 1.0);
		assert_eq!(settings.scaling_ratio, 2.0);
		assert_eq!(settings.slow_down, 1.0);
		assert_eq!(settings.iterations, 100);
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn missing_fields_take_defaults() {
		let settings: LayoutSettings = serde_json::from_str(r#"{"slowDown": 4}"#).unwrap();
		assert_eq!(settings.slow_down, 4.0);
		assert_eq!(settings.iterations, 100);

		let settings: LayoutSettings = serde_json::from_str(r#"{"scaling_ratio": 3}"#).unwrap();
		assert_eq!(settings.scaling_ratio, 3.0);
	}

	#[test]
	fn rejects_out_of_range_values() {
		let cases = [
			(
				LayoutSettings {
					iterations: 0,
					..LayoutSettings::default()
				},
				"iterations",
			),
			(
				LayoutSettings {
					gravity: -0.5,
					..LayoutSettings::default()
				},
				"gravity",
			),
			(
				LayoutSettings {
					scaling_ratio: 0.0,
					..LayoutSettings::default()
				},
				"scalingRatio",
			),
			(
				LayoutSettings {
					slow_down: f64::INFINITY,
					..LayoutSettings::default()
				},
				"slowDown",
			),
		];

		for (settings, expected) in cases {
			match settings.validate() {
				Err(LayoutError::InvalidSettings { field, .. }) => assert_eq!(field, expected),
				other => panic!("expected InvalidSettings for {expected}, got {other:?}"),
			}
		}
	}

	#[test]
	fn zero_gravity_is_allowed() {
		let settings = LayoutSettings {
			gravity: 0.0,
			..LayoutSettings::default()
		};
		assert!(settings.validate().is_ok());
	}
}
