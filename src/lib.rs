//! Interactive force-directed graph viewer.
//!
//! A Leptos client-side app renders the graph on a canvas and hands the
//! ForceAtlas2 layout to a background worker. The layout engine itself
//! ([`layout::compute_layout`]) is a pure function usable on its own, and is
//! what the `compute-layout` command-line tool runs.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod config;
pub mod data;
pub mod graph;
pub mod layout;
pub mod palette;
pub mod worker;

// Only the `compute-layout` binary uses these.
#[cfg(feature = "cli")]
use {anyhow as _, clap as _, env_logger as _, toml as _};

// Modules
mod components;
mod pages;

pub use config::ViewerConfig;
pub use graph::{GraphData, Position, PositionMap};
pub use layout::{LayoutError, LayoutSettings, compute_layout};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the homepage and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	provide_context(ViewerConfig::from_page());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Force-Directed Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
