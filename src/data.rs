//! Startup data source: one GET of the graph document.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::graph::GraphData;

/// Why the graph document could not be loaded.
#[derive(Debug, Error)]
pub enum DataFetchError {
	/// Not running in a browser window.
	#[error("no browser window available")]
	NoWindow,

	#[error("request to {url} failed: {message}")]
	/// The request never got a response.
	Network {
		/// Requested URL.
		url: String,
		/// Browser error text.
		message: String,
	},

	#[error("fetch {url}: HTTP {status}")]
	/// The server answered with a non-2xx status.
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},

	/// The body could not be read as text.
	#[error("could not read response body: {0}")]
	Body(String),

	/// The body is not a valid graph document.
	#[error("malformed graph document: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Parse a graph document.
pub fn parse_graph_document(source: &str) -> Result<GraphData, DataFetchError> {
	Ok(serde_json::from_str(source)?)
}

/// Fetch and parse the graph document at `url`. Non-2xx responses are errors.
pub async fn fetch_graph_document(url: &str) -> Result<GraphData, DataFetchError> {
	let window = web_sys::window().ok_or(DataFetchError::NoWindow)?;
	let network = |err: JsValue| DataFetchError::Network {
		url: url.to_string(),
		message: js_message(&err),
	};

	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(network)?
		.dyn_into()
		.map_err(network)?;

	if !response.ok() {
		return Err(DataFetchError::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}

	let body = response
		.text()
		.map_err(|e| DataFetchError::Body(js_message(&e)))?;
	let text = JsFuture::from(body)
		.await
		.map_err(|e| DataFetchError::Body(js_message(&e)))?
		.as_string()
		.ok_or_else(|| DataFetchError::Body("response body is not text".into()))?;

	let data = parse_graph_document(&text)?;
	log::info!(
		nodes = data.nodes.len(),
		edges = data.edges.len();
		"Loaded graph document"
	);
	Ok(data)
}

pub(crate) fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			value
				.dyn_ref::<js_sys::Error>()
				.map(|e| String::from(e.message()))
		})
		.unwrap_or_else(|| format!("{value:?}"))
}
