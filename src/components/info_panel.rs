use leptos::prelude::*;

use super::force_graph::NodeDetails;

/// Overlay describing the selected node. Hidden while nothing is selected.
#[component]
pub fn InfoPanel(
	#[prop(into)] selected: Signal<Option<NodeDetails>>,
	on_close: Callback<()>,
) -> impl IntoView {
	let title = move || {
		selected
			.get()
			.map(|d| d.title().to_string())
			.unwrap_or_default()
	};
	let description = move || {
		selected
			.get()
			.and_then(|d| d.description)
			.unwrap_or_default()
	};
	let display = move || if selected.get().is_some() { "block" } else { "none" };

	view! {
		<aside class="info-panel" style:display=display>
			<button class="info-close" title="Close" on:click=move |_| on_close.run(())>
				"×"
			</button>
			<h2 class="info-title">{title}</h2>
			<p class="info-desc">{description}</p>
		</aside>
	}
}
