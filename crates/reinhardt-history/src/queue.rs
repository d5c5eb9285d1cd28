//! Pending navigation tasks.

use crate::backend::HistoryBackend;
use crate::error::NavigationError;
use std::collections::VecDeque;
use std::fmt;

/// A deferred mutation of the navigation backend.
pub(crate) type NavigationTask =
	Box<dyn FnOnce(&dyn HistoryBackend) -> Result<(), NavigationError>>;

/// The kind of navigation a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// Adds a new entry.
	Push,
	/// Overwrites the current entry.
	Replace,
	/// Moves by a relative offset.
	Go(isize),
	/// Moves one entry back.
	Back,
	/// Moves one entry forward.
	Forward,
}

impl fmt::Display for NavigationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Push => write!(f, "push"),
			Self::Replace => write!(f, "replace"),
			Self::Go(delta) => write!(f, "go({})", delta),
			Self::Back => write!(f, "back"),
			Self::Forward => write!(f, "forward"),
		}
	}
}

/// FIFO queue of navigation tasks.
///
/// Tasks are never reordered or coalesced.
#[derive(Default)]
pub(crate) struct TaskQueue {
	tasks: VecDeque<(NavigationType, NavigationTask)>,
}

impl TaskQueue {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn enqueue(&mut self, kind: NavigationType, task: NavigationTask) {
		self.tasks.push_back((kind, task));
	}

	pub(crate) fn dequeue(&mut self) -> Option<(NavigationType, NavigationTask)> {
		self.tasks.pop_front()
	}

	pub(crate) fn len(&self) -> usize {
		self.tasks.len()
	}

	pub(crate) fn clear(&mut self) {
		self.tasks.clear();
	}
}

impl fmt::Debug for TaskQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TaskQueue")
			.field(
				"pending",
				&self.tasks.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(),
			)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryBackend;
	use rstest::rstest;

	fn noop() -> NavigationTask {
		Box::new(|_| Ok(()))
	}

	#[rstest]
	fn test_task_queue_is_fifo() {
		let mut queue = TaskQueue::new();
		queue.enqueue(NavigationType::Push, noop());
		queue.enqueue(NavigationType::Go(-2), noop());
		queue.enqueue(NavigationType::Back, noop());

		let order: Vec<_> = std::iter::from_fn(|| queue.dequeue())
			.map(|(kind, _)| kind)
			.collect();
		assert_eq!(
			order,
			vec![
				NavigationType::Push,
				NavigationType::Go(-2),
				NavigationType::Back
			]
		);
		assert_eq!(queue.len(), 0);
	}

	#[rstest]
	fn test_task_queue_runs_against_backend() {
		let backend = MemoryBackend::default();
		let mut queue = TaskQueue::new();
		queue.enqueue(
			NavigationType::Push,
			Box::new(|backend| backend.push_state("/next", &Default::default())),
		);

		let (_, task) = queue.dequeue().unwrap();
		task(&backend).unwrap();
		assert_eq!(backend.location().pathname(), "/next");
	}

	#[rstest]
	fn test_task_queue_clear_and_debug() {
		let mut queue = TaskQueue::new();
		queue.enqueue(NavigationType::Replace, noop());
		assert!(format!("{:?}", queue).contains("Replace"));
		queue.clear();
		assert_eq!(queue.len(), 0);
	}

	#[rstest]
	fn test_navigation_type_display() {
		assert_eq!(NavigationType::Go(3).to_string(), "go(3)");
		assert_eq!(NavigationType::Forward.to_string(), "forward");
	}
}
