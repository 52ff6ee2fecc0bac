//! Deferred node-name reveal, keyed by a generation counter.
//!
//! Each request bumps the generation; a poller that captured an older
//! generation learns it has been superseded and stops.

use std::time::Duration;

/// Energy below which the layout counts as stable enough for labels.
pub const STABLE_ALPHA: f64 = 0.01;
/// Delay between two stability checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of one stability check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPoll {
	/// Labels are now shown; stop polling.
	Reveal,
	/// Still moving; check again after [`POLL_INTERVAL`].
	Wait,
	/// A newer request or a cancel replaced this one; stop polling.
	Superseded,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelReveal {
	generation: u64,
	pending: bool,
	visible: bool,
}

impl LabelReveal {
	/// Hide labels and start waiting for stability. Returns the generation
	/// the poller should carry.
	pub fn schedule(&mut self) -> u64 {
		self.generation += 1;
		self.pending = true;
		self.visible = false;
		self.generation
	}

	/// Hide labels and abandon any outstanding poller.
	pub fn cancel(&mut self) {
		self.generation += 1;
		self.pending = false;
		self.visible = false;
	}

	pub fn poll(&mut self, generation: u64, alpha: f64) -> RevealPoll {
		if generation != self.generation || !self.pending {
			return RevealPoll::Superseded;
		}
		if alpha < STABLE_ALPHA {
			self.pending = false;
			self.visible = true;
			RevealPoll::Reveal
		} else {
			RevealPoll::Wait
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_pending(&self) -> bool {
		self.pending
	}

	/// Whether node names are currently shown.
	pub fn is_visible(&self) -> bool {
		self.visible
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn waits_until_stable() {
		let mut reveal = LabelReveal::default();
		let generation = reveal.schedule();
		assert_eq!(reveal.poll(generation, 0.5), RevealPoll::Wait);
		assert!(!reveal.is_visible());
		assert_eq!(reveal.poll(generation, 0.005), RevealPoll::Reveal);
		assert!(reveal.is_visible());
		assert_eq!(reveal.poll(generation, 0.005), RevealPoll::Superseded);
	}

	#[test]
	fn newer_request_supersedes_older_poller() {
		let mut reveal = LabelReveal::default();
		let first = reveal.schedule();
		let second = reveal.schedule();
		assert_eq!(reveal.poll(first, 0.0), RevealPoll::Superseded);
		assert_eq!(reveal.poll(second, 0.0), RevealPoll::Reveal);
	}

	#[test]
	fn cancel_hides_and_stops() {
		let mut reveal = LabelReveal::default();
		let generation = reveal.schedule();
		reveal.cancel();
		assert_eq!(reveal.poll(generation, 0.0), RevealPoll::Superseded);
		assert!(!reveal.is_visible() && !reveal.is_pending());
	}
}
