use std::cell::Cell;
use std::rc::Rc;

use log::{debug, error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent, Worker};

use super::{LayoutRequest, LayoutResponse, RequestIds, WorkerError, respond_to_message};
use crate::config::WorkerConfig;
use crate::data::js_message;
use crate::graph::GraphData;
use crate::layout::LayoutSettings;

/// Layout worker backed by a dedicated Web Worker.
///
/// A running layout cannot be interrupted inside the worker, so superseded
/// requests still finish there; their responses are dropped on arrival.
pub struct LayoutWorker {
	worker: Worker,
	ids: Rc<Cell<RequestIds>>,
	_on_message: Closure<dyn FnMut(MessageEvent)>,
}

impl LayoutWorker {
	/// Load the worker script from `config` and deliver every current
	/// response to `on_response`.
	pub fn spawn<F>(config: &WorkerConfig, mut on_response: F) -> Result<Self, WorkerError>
	where
		F: FnMut(LayoutResponse) + 'static,
	{
		let worker = Worker::new(&config.script_url)
			.map_err(|e| WorkerError::Spawn(js_message(&e)))?;
		let ids = Rc::new(Cell::new(RequestIds::default()));

		let ids_seen = ids.clone();
		let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
			let Some(text) = event.data().as_string() else {
				warn!("Ignoring non-text message from layout worker");
				return;
			};
			let response: LayoutResponse = match serde_json::from_str(&text) {
				Ok(response) => response,
				Err(err) => {
					error!("{}", WorkerError::Protocol(err));
					return;
				}
			};
			if ids_seen.get().is_superseded(response.request_id) {
				debug!(request_id = response.request_id; "Dropping superseded layout");
				return;
			}
			on_response(response);
		});
		worker.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

		Ok(Self {
			worker,
			ids,
			_on_message: on_message,
		})
	}

	/// Post a layout request and return its id. Earlier requests are
	/// superseded.
	pub fn submit(
		&self,
		graph_data: GraphData,
		settings: LayoutSettings,
	) -> Result<u64, WorkerError> {
		let mut ids = self.ids.get();
		let request_id = ids.issue();
		self.ids.set(ids);

		let message = serde_json::to_string(&LayoutRequest {
			request_id,
			graph_data,
			settings,
		})?;
		self.worker
			.post_message(&JsValue::from_str(&message))
			.map_err(|e| WorkerError::Script(js_message(&e)))?;

		debug!(request_id = request_id; "Layout request posted");
		Ok(request_id)
	}

	/// Drop the response of every request submitted so far.
	pub fn cancel(&self) {
		let mut ids = self.ids.get();
		ids.cancel();
		self.ids.set(ids);
	}
}

impl Drop for LayoutWorker {
	fn drop(&mut self) {
		self.worker.set_onmessage(None);
		self.worker.terminate();
	}
}

/// Entry point of the worker script: answer every request posted to this
/// dedicated worker scope.
pub fn run_worker_scope() {
	let scope: DedicatedWorkerGlobalScope = js_sys::global().unchecked_into();
	let reply_to = scope.clone();

	let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
		let Some(text) = event.data().as_string() else {
			warn!("Ignoring non-text layout request");
			return;
		};
		match respond_to_message(&text) {
			Ok(reply) => {
				if let Err(err) = reply_to.post_message(&JsValue::from_str(&reply)) {
					error!("Could not post layout response: {}", js_message(&err));
				}
			}
			Err(err) => error!("{err}"),
		}
	});
	scope.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
	on_message.forget();
	debug!("Layout worker ready");
}
