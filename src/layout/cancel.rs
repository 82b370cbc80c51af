use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by the engine between iterations.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	/// A token that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Request cancellation; every clone observes it.
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	/// Whether [`cancel`](Self::cancel) has been called on any clone.
	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_share_state() {
		let token = CancelToken::new();
		let other = token.clone();
		assert!(!other.is_cancelled());
		token.cancel();
		assert!(other.is_cancelled());
	}
}
