//! Background layout worker.
//!
//! The foreground submits a [`LayoutRequest`] and keeps going; the response is
//! delivered to a callback when the background context finishes. Requests are
//! handled one at a time in submission order, and a newer submission
//! supersedes older ones.
//!
//! In the browser the background context is a dedicated Web Worker running
//! the `layout_worker` binary; elsewhere it is an OS thread.

mod protocol;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

use thiserror::Error;

pub use protocol::{
	FailureKind, LayoutOutcome, LayoutRequest, LayoutResponse, RequestIds, handle_request,
	respond_to_message,
};

#[cfg(not(target_arch = "wasm32"))]
pub use native::LayoutWorker;
#[cfg(target_arch = "wasm32")]
pub use web::{LayoutWorker, run_worker_scope};

/// Failures of the worker transport itself. Layout failures travel inside
/// [`LayoutOutcome::Failed`] instead.
#[derive(Debug, Error)]
pub enum WorkerError {
	/// The background context could not be started.
	#[error("could not start layout worker: {0}")]
	Spawn(String),

	/// The background context has stopped.
	#[error("layout worker is gone")]
	Disconnected,

	/// A message was not valid protocol JSON.
	#[error("bad layout message: {0}")]
	Protocol(#[from] serde_json::Error),

	/// The browser rejected a worker call.
	#[error("layout worker script error: {0}")]
	Script(String),
}
