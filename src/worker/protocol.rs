use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::WorkerError;
use crate::graph::{GraphData, PositionMap};
use crate::layout::{CancelToken, LayoutError, LayoutSettings, compute_layout_with_cancel};

/// Message sent to the layout worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
	/// Echoed back in the response.
	pub request_id: u64,
	/// The document to lay out.
	pub graph_data: GraphData,
	/// Defaults apply when absent.
	#[serde(default)]
	pub settings: LayoutSettings,
}

/// Message sent back by the layout worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
	/// Id of the request this answers.
	pub request_id: u64,
	/// Carried as a `status` field alongside `requestId`.
	#[serde(flatten)]
	pub outcome: LayoutOutcome,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LayoutOutcome {
	/// One position per node.
	Completed {
		/// Final coordinates keyed by node id.
		positions: PositionMap,
	},
	/// The request was rejected.
	Failed {
		/// Which check failed.
		kind: FailureKind,
		/// Human-readable error.
		message: String,
	},
	/// Superseded before it finished.
	Cancelled,
}

/// Error class of a `failed` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
	/// See [`LayoutError::InvalidGraph`].
	InvalidGraph,
	/// See [`LayoutError::InvalidSettings`].
	InvalidSettings,
}

/// Request id bookkeeping for a client that cannot interrupt its worker.
///
/// Every submission supersedes the ones before it; responses to superseded
/// requests are dropped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestIds {
	next: u64,
	latest: u64,
}

impl Default for RequestIds {
	fn default() -> Self {
		Self { next: 1, latest: 0 }
	}
}

impl RequestIds {
	/// Allocate the id of a new request, superseding every earlier one.
	pub fn issue(&mut self) -> u64 {
		let id = self.next;
		self.next += 1;
		self.latest = id;
		id
	}

	/// Supersede every request issued so far.
	pub fn cancel(&mut self) {
		self.latest = self.next;
	}

	/// Whether a response to `request_id` should be dropped.
	pub fn is_superseded(&self, request_id: u64) -> bool {
		request_id < self.latest
	}
}

/// Run one request to completion (or cancellation).
pub fn handle_request(request: LayoutRequest, cancel: &CancelToken) -> LayoutResponse {
	let outcome = match compute_layout_with_cancel(&request.graph_data, &request.settings, cancel)
	{
		Ok(positions) => LayoutOutcome::Completed { positions },
		Err(LayoutError::Cancelled { .. }) => LayoutOutcome::Cancelled,
		Err(err) => {
			warn!(request_id = request.request_id; "Layout failed: {err}");
			let kind = match err {
				LayoutError::InvalidGraph(_) => FailureKind::InvalidGraph,
				_ => FailureKind::InvalidSettings,
			};
			LayoutOutcome::Failed {
				kind,
				message: err.to_string(),
			}
		}
	};
	LayoutResponse {
		request_id: request.request_id,
		outcome,
	}
}

/// Worker-side message handler: JSON request in, JSON response out.
pub fn respond_to_message(message: &str) -> Result<String, WorkerError> {
	let request: LayoutRequest = serde_json::from_str(message)?;
	debug!(
		request_id = request.request_id,
		nodes = request.graph_data.nodes.len();
		"Layout request received"
	);
	let response = handle_request(request, &CancelToken::new());
	Ok(serde_json::to_string(&response)?)
}
