//! Script run inside the layout Web Worker.
//!
//! Trunk builds this binary as a worker (see `index.html`); the viewer loads
//! it through the generated loader shim.

// Dependencies are used by the library crate.
#![allow(unused_crate_dependencies)]

#[cfg(target_arch = "wasm32")]
fn main() {
	force_atlas_canvas::init_logging();
	force_atlas_canvas::worker::run_worker_scope();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
	eprintln!("layout_worker only runs inside a browser Web Worker; build it for wasm32");
	std::process::exit(1);
}
