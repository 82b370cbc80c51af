use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, warn};

use crate::components::force_graph::{ForceGraphCanvas, NodeDetails};
use crate::components::info_panel::InfoPanel;
use crate::config::ViewerConfig;
use crate::data::fetch_graph_document;
use crate::graph::{GraphData, PositionMap};
use crate::palette::ClusterPalette;
use crate::worker::{LayoutOutcome, LayoutResponse, LayoutWorker};

fn on_layout(response: LayoutResponse, positions: RwSignal<Option<PositionMap>>) {
	match response.outcome {
		LayoutOutcome::Completed { positions: layout } => {
			debug!(request_id = response.request_id; "Layout received");
			positions.set(Some(layout));
		}
		LayoutOutcome::Failed { kind, message } => {
			warn!(request_id = response.request_id; "Layout failed ({kind:?}): {message}");
		}
		LayoutOutcome::Cancelled => {
			debug!(request_id = response.request_id; "Layout cancelled");
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let graph_data = RwSignal::new(None::<GraphData>);
	let palette = RwSignal::new(ClusterPalette::default());
	let positions = RwSignal::new(None::<PositionMap>);
	let selected = RwSignal::new(None::<NodeDetails>);

	let worker = StoredValue::new_local(
		match LayoutWorker::spawn(&config.worker, move |response| on_layout(response, positions)) {
			Ok(worker) => Some(worker),
			Err(err) => {
				warn!("Background layout disabled: {err}");
				None
			}
		},
	);

	let (data_url, settings) = (config.data_url.clone(), config.layout.clone());
	spawn_local(async move {
		match fetch_graph_document(&data_url).await {
			Ok(data) => {
				palette.set(ClusterPalette::for_graph(&data));
				worker.with_value(|worker| {
					if let Some(worker) = worker {
						if let Err(err) = worker.submit(data.clone(), settings) {
							warn!("Could not submit layout: {err}");
						}
					}
				});
				graph_data.set(Some(data));
			}
			Err(err) => error!("Graph data unavailable: {err}"),
		}
	});

	let data = Signal::derive(move || graph_data.get().unwrap_or_default());

	view! {
		<div class="fullscreen-graph">
			<Show when=move || graph_data.with(Option::is_some)>
				<ForceGraphCanvas
					data=data
					palette=palette
					positions=positions
					fullscreen=true
					on_node_click=Callback::new(move |details: NodeDetails| {
						selected.set(Some(details))
					})
					on_background_click=Callback::new(move |_: ()| selected.set(None))
				/>
				<div class="graph-overlay">
					<h1>"Force-Directed Graph"</h1>
					<p class="subtitle">
						"Click a node for details. Drag nodes to reposition. Scroll to zoom."
					</p>
				</div>
			</Show>
			<InfoPanel selected=selected on_close=Callback::new(move |_: ()| selected.set(None)) />
		</div>
	}
}
