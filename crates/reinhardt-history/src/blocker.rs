//! Navigation blockers.
//!
//! A blocker is consulted before queued navigation runs. It receives a
//! [`Retry`] and a [`Cancel`] continuation and may call either of them at any
//! later time, for example once the user answered a confirmation dialog.
//!
//! Only the first registered blocker is consulted. [`Retry::retry`] re-runs the
//! flush, which consults the first blocker again: a blocker that approves must
//! unregister itself first, or it will be asked again.
//!
//! # Example
//!
//! ```
//! use reinhardt_history::{MemoryHistoryOptions, create_memory_history};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let history = create_memory_history(MemoryHistoryOptions::default());
//! let pending = Rc::new(RefCell::new(None));
//! let slot = pending.clone();
//! let unblock = history.block(move |retry, _cancel| {
//! 	*slot.borrow_mut() = Some(retry);
//! });
//!
//! history.push("/checkout", None).unwrap();
//! assert_eq!(history.location().pathname(), "/");
//!
//! // The user confirmed: drop the blocker, then let navigation continue.
//! unblock.unblock();
//! let retry = pending.borrow_mut().take().unwrap();
//! retry.retry().unwrap();
//! assert_eq!(history.location().pathname(), "/checkout");
//! ```

use crate::error::NavigationError;
use crate::history::HistoryInner;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;

pub(crate) type BlockerFn = Rc<dyn Fn(Retry, Cancel)>;

/// Identifier of a registered blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BlockerId(u64);

/// Ordered list of blockers.
#[derive(Default)]
pub(crate) struct BlockerChain {
	next_id: u64,
	blockers: Vec<(BlockerId, BlockerFn)>,
}

impl BlockerChain {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn push(&mut self, blocker: BlockerFn) -> BlockerId {
		let id = BlockerId(self.next_id);
		self.next_id += 1;
		self.blockers.push((id, blocker));
		id
	}

	/// Removes the blocker with `id`, returning `false` if it was not present.
	pub(crate) fn remove(&mut self, id: BlockerId) -> bool {
		let before = self.blockers.len();
		self.blockers.retain(|(blocker_id, _)| *blocker_id != id);
		self.blockers.len() != before
	}

	pub(crate) fn front(&self) -> Option<BlockerFn> {
		self.blockers.first().map(|(_, blocker)| Rc::clone(blocker))
	}

	pub(crate) fn len(&self) -> usize {
		self.blockers.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.blockers.is_empty()
	}

	pub(crate) fn clear(&mut self) {
		self.blockers.clear();
	}
}

impl fmt::Debug for BlockerChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockerChain")
			.field("len", &self.blockers.len())
			.finish()
	}
}

/// Continuation that re-attempts the blocked flush.
#[derive(Clone)]
pub struct Retry {
	history: Weak<HistoryInner>,
}

impl Retry {
	pub(crate) fn new(history: Weak<HistoryInner>) -> Self {
		Self { history }
	}

	/// Re-attempts the flush.
	///
	/// If the first blocker is still registered it is consulted again;
	/// otherwise the queued navigation runs and any task error is returned.
	/// Does nothing once the history is gone.
	pub fn retry(&self) -> Result<(), NavigationError> {
		match self.history.upgrade() {
			Some(history) => history.try_flush(),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for Retry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Retry").finish_non_exhaustive()
	}
}

/// Continuation that stops blocking.
///
/// Cancelling clears every registered blocker and removes the unload guard.
/// Navigation already queued stays queued and runs with the next flush.
#[derive(Clone)]
pub struct Cancel {
	history: Weak<HistoryInner>,
}

impl Cancel {
	pub(crate) fn new(history: Weak<HistoryInner>) -> Self {
		Self { history }
	}

	/// Clears all blockers.
	pub fn cancel(&self) {
		if let Some(history) = self.history.upgrade() {
			let cleared = {
				let mut blockers = history.blockers.borrow_mut();
				let len = blockers.len();
				blockers.clear();
				len
			};
			debug!(cleared, "navigation blockers cancelled");
			history.set_unload_guard(false);
		}
	}
}

impl fmt::Debug for Cancel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cancel").finish_non_exhaustive()
	}
}

/// Handle returned by [`History::block`](crate::History::block).
///
/// Unregistering is explicit; dropping the handle keeps the blocker active.
#[must_use = "dropping an `Unblock` keeps the blocker registered"]
#[derive(Debug, Clone)]
pub struct Unblock {
	history: Weak<HistoryInner>,
	id: Option<BlockerId>,
}

impl Unblock {
	pub(crate) fn new(history: Weak<HistoryInner>, id: Option<BlockerId>) -> Self {
		Self { history, id }
	}

	/// Removes the blocker. Calling this more than once is a no-op.
	pub fn unblock(&self) {
		let (Some(history), Some(id)) = (self.history.upgrade(), self.id) else {
			return;
		};

		let now_empty = {
			let mut blockers = history.blockers.borrow_mut();
			blockers.remove(id);
			blockers.is_empty()
		};
		if now_empty {
			history.set_unload_guard(false);
		}
	}
}
