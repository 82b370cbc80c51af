//! ForceAtlas2-style layout engine.
//!
//! [`compute_layout`] is a pure function: it reads a [`GraphData`] and
//! [`LayoutSettings`] and returns a fresh [`PositionMap`]. It carries no state
//! between calls and knows nothing about workers or rendering.
//!
//! [`GraphData`]: crate::graph::GraphData
//! [`PositionMap`]: crate::graph::PositionMap

mod cancel;
mod engine;
mod error;
mod settings;

pub use cancel::CancelToken;
pub use engine::{compute_layout, compute_layout_with_cancel};
pub use error::LayoutError;
pub use settings::LayoutSettings;
