use thiserror::Error;

use crate::graph::GraphError;

/// Why a layout run produced no positions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
	/// The document failed validation.
	#[error("invalid graph: {0}")]
	InvalidGraph(#[from] GraphError),

	/// A setting is out of range.
	#[error("invalid settings: {field} {reason}")]
	InvalidSettings {
		/// Protocol name of the field.
		field: &'static str,
		/// What the field must satisfy.
		reason: &'static str,
	},

	/// The cancel token was set.
	#[error("layout cancelled after {iteration} iterations")]
	Cancelled {
		/// Iterations completed before stopping.
		iteration: u32,
	},
}
