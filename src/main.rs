//! Browser entry point of the graph viewer.

// Dependencies are used by the library crate.
#![allow(unused_crate_dependencies)]

use force_atlas_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
