use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, mpsc};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::{LayoutRequest, LayoutResponse, WorkerError, handle_request};
use crate::config::WorkerConfig;
use crate::graph::GraphData;
use crate::layout::{CancelToken, LayoutSettings};

struct Job {
	request: LayoutRequest,
	cancel: CancelToken,
}

/// Layout worker backed by a dedicated thread.
pub struct LayoutWorker {
	sender: Option<mpsc::Sender<Job>>,
	handle: Option<JoinHandle<()>>,
	next_id: AtomicU64,
	in_flight: Mutex<Option<CancelToken>>,
}

impl LayoutWorker {
	/// Start the worker thread. `on_response` runs on that thread.
	///
	/// `config` only matters to the Web Worker backend, which loads its
	/// script from it. It is accepted here so both backends share one
	/// signature.
	pub fn spawn<F>(_config: &WorkerConfig, mut on_response: F) -> Result<Self, WorkerError>
	where
		F: FnMut(LayoutResponse) + Send + 'static,
	{
		let (sender, receiver) = mpsc::channel::<Job>();
		let handle = thread::Builder::new()
			.name("layout-worker".into())
			.spawn(move || {
				for job in receiver {
					on_response(handle_request(job.request, &job.cancel));
				}
				debug!("Layout worker stopped");
			})
			.map_err(|e| WorkerError::Spawn(e.to_string()))?;

		Ok(Self {
			sender: Some(sender),
			handle: Some(handle),
			next_id: AtomicU64::new(1),
			in_flight: Mutex::new(None),
		})
	}

	/// Queue a layout and return its request id. Cancels whatever was queued
	/// before it.
	pub fn submit(
		&self,
		graph_data: GraphData,
		settings: LayoutSettings,
	) -> Result<u64, WorkerError> {
		let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let cancel = CancelToken::new();
		self.supersede(Some(cancel.clone()));

		let sender = self.sender.as_ref().ok_or(WorkerError::Disconnected)?;
		sender
			.send(Job {
				request: LayoutRequest {
					request_id,
					graph_data,
					settings,
				},
				cancel,
			})
			.map_err(|_| WorkerError::Disconnected)?;

		debug!(request_id = request_id; "Layout request submitted");
		Ok(request_id)
	}

	/// Cancel the newest request, if any.
	pub fn cancel(&self) {
		self.supersede(None);
	}

	fn supersede(&self, next: Option<CancelToken>) {
		let mut in_flight = match self.in_flight.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		};
		if let Some(previous) = std::mem::replace(&mut *in_flight, next) {
			previous.cancel();
		}
	}
}

impl Drop for LayoutWorker {
	fn drop(&mut self) {
		self.cancel();
		self.sender.take();
		if let Some(handle) = self.handle.take() {
			if handle.join().is_err() {
				error!("Layout worker thread panicked");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::graph::{EdgeRecord, NodeRecord};
	use crate::worker::LayoutOutcome;

	fn triangle() -> GraphData {
		GraphData {
			nodes: ["a", "b", "c"]
				.iter()
				.map(|id| NodeRecord::new(*id, "k"))
				.collect(),
			edges: vec![
				EdgeRecord::new("a", "b"),
				EdgeRecord::new("b", "c"),
				EdgeRecord::new("c", "a"),
			],
			..GraphData::default()
		}
	}

	fn spawn() -> (LayoutWorker, mpsc::Receiver<LayoutResponse>) {
		let (tx, rx) = mpsc::channel();
		let worker = LayoutWorker::spawn(&WorkerConfig::default(), move |response| {
			let _ = tx.send(response);
		})
		.unwrap();
		(worker, rx)
	}

	#[test]
	fn delivers_positions_through_callback() {
		let (worker, rx) = spawn();
		let id = worker.submit(triangle(), LayoutSettings::default()).unwrap();

		let response = rx.recv_timeout(Duration::from_secs(30)).unwrap();
		assert_eq!(response.request_id, id);
		match response.outcome {
			LayoutOutcome::Completed { positions } => assert_eq!(positions.len(), 3),
			other => panic!("unexpected outcome {other:?}"),
		}
	}

	#[test]
	fn responses_follow_submission_order_and_last_one_wins() {
		let (worker, rx) = spawn();
		let big = LayoutSettings {
			iterations: 5_000,
			..LayoutSettings::default()
		};
		let first = worker.submit(triangle(), big).unwrap();
		let second = worker.submit(triangle(), LayoutSettings::default()).unwrap();
		assert!(second > first);

		let a = rx.recv_timeout(Duration::from_secs(30)).unwrap();
		let b = rx.recv_timeout(Duration::from_secs(30)).unwrap();
		assert_eq!((a.request_id, b.request_id), (first, second));
		assert!(matches!(
			a.outcome,
			LayoutOutcome::Cancelled | LayoutOutcome::Completed { .. }
		));
		assert!(matches!(b.outcome, LayoutOutcome::Completed { .. }));
	}

	#[test]
	fn cancel_marks_pending_request() {
		let (worker, rx) = spawn();
		let settings = LayoutSettings {
			iterations: 1_000_000,
			..LayoutSettings::default()
		};
		worker.submit(triangle(), settings).unwrap();
		worker.cancel();

		let response = rx.recv_timeout(Duration::from_secs(30)).unwrap();
		assert_eq!(response.outcome, LayoutOutcome::Cancelled);
	}

	#[test]
	fn failures_come_back_as_responses() {
		let (worker, rx) = spawn();
		let mut broken = triangle();
		broken.edges.push(EdgeRecord::new("a", "missing"));
		worker.submit(broken, LayoutSettings::default()).unwrap();

		let response = rx.recv_timeout(Duration::from_secs(30)).unwrap();
		assert!(matches!(response.outcome, LayoutOutcome::Failed { .. }));
	}
}
