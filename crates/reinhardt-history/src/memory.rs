//! In-memory navigation backend.
//!
//! Used for tests and server rendering where no browser is available. The
//! backend has no native change events, so the [`History`] core announces
//! every change itself once the task queue drains.

use crate::backend::HistoryBackend;
use crate::config::MemoryHistoryOptions;
use crate::error::NavigationError;
use crate::history::History;
use crate::key::create_key;
use crate::location::{HistoryState, Location, parse_location};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone)]
struct MemoryEntry {
	path: String,
	state: HistoryState,
}

impl MemoryEntry {
	fn new(path: String) -> Self {
		let mut state = HistoryState::new();
		state.set_key(create_key());
		Self { path, state }
	}
}

/// An ordered list of entries plus a current index.
#[derive(Debug)]
pub struct MemoryBackend {
	entries: RefCell<Vec<MemoryEntry>>,
	index: Cell<usize>,
	unload_guarded: Cell<bool>,
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new(MemoryHistoryOptions::default())
	}
}

impl MemoryBackend {
	/// Creates a backend from options.
	pub fn new(options: MemoryHistoryOptions) -> Self {
		let index = options.resolved_index();
		let entries = options
			.resolved_entries()
			.into_iter()
			.map(MemoryEntry::new)
			.collect();

		Self {
			entries: RefCell::new(entries),
			index: Cell::new(index),
			unload_guarded: Cell::new(false),
		}
	}

	/// Returns all entry paths in order.
	pub fn entries(&self) -> Vec<String> {
		self.entries
			.borrow()
			.iter()
			.map(|entry| entry.path.clone())
			.collect()
	}

	/// Returns the current entry index.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	/// Returns whether an unload guard is active.
	pub fn is_unload_guarded(&self) -> bool {
		self.unload_guarded.get()
	}

	fn move_by(&self, delta: isize) {
		let last = self.entries.borrow().len().saturating_sub(1);
		let target = self.index.get().saturating_add_signed(delta).min(last);
		self.index.set(target);
	}
}

impl HistoryBackend for MemoryBackend {
	fn location(&self) -> Location {
		let entries = self.entries.borrow();
		let entry = &entries[self.index.get()];
		parse_location(&entry.path, Some(entry.state.clone()))
	}

	fn push_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		let mut entries = self.entries.borrow_mut();
		let next = self.index.get() + 1;
		entries.truncate(next);
		entries.push(MemoryEntry {
			path: path.to_string(),
			state: state.clone(),
		});
		self.index.set(next);
		Ok(())
	}

	fn replace_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		let mut entries = self.entries.borrow_mut();
		entries[self.index.get()] = MemoryEntry {
			path: path.to_string(),
			state: state.clone(),
		};
		Ok(())
	}

	fn go(&self, delta: isize) -> Result<(), NavigationError> {
		self.move_by(delta);
		Ok(())
	}

	fn back(&self) -> Result<(), NavigationError> {
		self.move_by(-1);
		Ok(())
	}

	fn forward(&self) -> Result<(), NavigationError> {
		self.move_by(1);
		Ok(())
	}

	fn set_unload_guard(&self, enabled: bool) {
		self.unload_guarded.set(enabled);
	}
}

/// Creates a history backed by an in-memory entry list.
///
/// # Example
///
/// ```
/// use reinhardt_history::{MemoryHistoryOptions, create_memory_history};
///
/// let history = create_memory_history(MemoryHistoryOptions::new(["/"]));
/// history.push("/about", None).unwrap();
/// assert_eq!(history.location().pathname(), "/about");
/// ```
pub fn create_memory_history(options: MemoryHistoryOptions) -> History {
	History::new(MemoryBackend::new(options))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_memory_backend_initial_location() {
		let backend = MemoryBackend::new(
			MemoryHistoryOptions::new(["/", "/users?page=2"]).with_initial_index(1),
		);
		let location = backend.location();
		assert_eq!(location.pathname(), "/users");
		assert_eq!(location.search(), "?page=2");
		assert!(location.state().key().is_some());
	}

	#[rstest]
	fn test_memory_backend_push_appends_and_advances() {
		let backend = MemoryBackend::default();
		backend.push_state("/a", &HistoryState::new()).unwrap();
		backend.push_state("/b", &HistoryState::new()).unwrap();
		assert_eq!(backend.entries(), vec!["/", "/a", "/b"]);
		assert_eq!(backend.index(), 2);
	}

	#[rstest]
	fn test_memory_backend_push_drops_forward_entries() {
		let backend = MemoryBackend::new(MemoryHistoryOptions::new(["/", "/a", "/b"]));
		backend.back().unwrap();
		backend.back().unwrap();
		backend.push_state("/c", &HistoryState::new()).unwrap();
		assert_eq!(backend.entries(), vec!["/", "/c"]);
		assert_eq!(backend.location().pathname(), "/c");
	}

	#[rstest]
	fn test_memory_backend_replace_overwrites_current() {
		let backend = MemoryBackend::new(MemoryHistoryOptions::new(["/", "/a"]));
		let state = HistoryState::new().with_data("tab", "settings");
		backend.replace_state("/b", &state).unwrap();
		assert_eq!(backend.entries(), vec!["/", "/b"]);
		assert_eq!(backend.location().state(), &state);
	}

	#[rstest]
	#[case(-1, 0)]
	#[case(-5, 0)]
	#[case(1, 2)]
	#[case(7, 2)]
	#[case(0, 1)]
	fn test_memory_backend_go_is_clamped(#[case] delta: isize, #[case] expected: usize) {
		let backend = MemoryBackend::new(
			MemoryHistoryOptions::new(["/", "/a", "/b"]).with_initial_index(1),
		);
		backend.go(delta).unwrap();
		assert_eq!(backend.index(), expected);
	}

	#[rstest]
	fn test_memory_backend_back_forward_keep_entry_state() {
		let backend = MemoryBackend::default();
		let initial_key = backend.location().state().key().map(str::to_string);

		let mut state = HistoryState::new();
		state.set_key("pushed".to_string());
		backend.push_state("/", &state).unwrap();
		backend.back().unwrap();
		assert_eq!(
			backend.location().state().key().map(str::to_string),
			initial_key
		);

		backend.forward().unwrap();
		assert_eq!(backend.location().state().key(), Some("pushed"));
		backend.forward().unwrap();
		assert_eq!(backend.index(), 1);
	}

	#[rstest]
	fn test_memory_backend_unload_guard_flag() {
		let backend = MemoryBackend::default();
		assert!(!backend.is_unload_guarded());
		backend.set_unload_guard(true);
		assert!(backend.is_unload_guarded());
		assert!(!backend.has_native_events());
		assert_eq!(backend.create_href("/x"), "/x");
	}
}
